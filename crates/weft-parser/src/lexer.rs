//! Lexical analyzer for Weft source text.
//!
//! The lexer works strictly line by line: a string literal must be closed
//! before its line ends, and every line (including blank ones and the last
//! one) is terminated by an explicit [`TokenKind::Newline`] token. The stream
//! always ends with [`TokenKind::Eoi`].
//!
//! The public entry point is [`tokenize`], which never fails: problems are
//! returned as diagnostics next to the tokens, at most one per line.

use log::{debug, trace};
use winnow::{
    Parser as _,
    combinator::{alt, eof, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, one_of, take_while},
};

use crate::{
    arrow_notation,
    error::{Diagnostic, ErrorCode},
    span::{Position, Span},
    tokens::{Token, TokenKind},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

/// What a single lexing step produced.
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Token(TokenKind, String),
    /// A string literal whose line ended before the closing quote.
    Unterminated(String),
    /// A run of arrow characters that holds no line pattern.
    Discarded(String),
    Whitespace,
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_word_char(c: char) -> bool {
    is_word_start(c) || c == '-'
}

fn is_arrow_char(c: char) -> bool {
    matches!(
        c,
        '-' | '.' | '=' | ':' | '<' | '>' | '|' | '#' | '*' | '+' | '(' | ')'
    )
}

fn whitespace(input: &mut Input<'_>) -> IResult<Lexeme> {
    take_while(1.., char::is_whitespace)
        .value(Lexeme::Whitespace)
        .parse_next(input)
}

/// String body up to (not including) the closing quote or the end of the line.
///
/// `\"`, `\\`, `\n` and `\r` are unescaped; any other backslash is kept as written.
fn string_content(input: &mut Input<'_>) -> IResult<String> {
    let plain = take_while(1.., |c: char| c != '"' && c != '\\').map(str::to_string);
    let escaped = preceded('\\', any).map(|c: char| match c {
        '"' | '\\' => c.to_string(),
        'n' => "\n".to_string(),
        'r' => "\r".to_string(),
        other => format!("\\{other}"),
    });
    let trailing_backslash = ('\\', eof).map(|_| "\\".to_string());

    repeat(0.., alt((plain, escaped, trailing_backslash)))
        .fold(String::new, |mut acc, part: String| {
            acc.push_str(&part);
            acc
        })
        .parse_next(input)
}

fn string_literal(input: &mut Input<'_>) -> IResult<Lexeme> {
    preceded('"', (string_content, opt('"')))
        .map(|(value, close): (String, Option<char>)| match close {
            Some(_) => Lexeme::Token(TokenKind::String, value),
            None => Lexeme::Unterminated(value),
        })
        .parse_next(input)
}

/// The legacy `->` connector, only when followed by whitespace or the end of the line.
fn legacy_arrow(input: &mut Input<'_>) -> IResult<Lexeme> {
    terminated(
        "->",
        peek(alt((eof.void(), one_of(char::is_whitespace).void()))),
    )
    .map(|arrow: &str| Lexeme::Token(TokenKind::ArrowNotation, arrow.to_string()))
    .parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (one_of(is_word_start), take_while(0.., is_word_char))
        .take()
        .parse_next(input)
}

fn identifier_or_keyword(input: &mut Input<'_>) -> IResult<Lexeme> {
    word.map(|word: &str| {
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        Lexeme::Token(kind, word.to_string())
    })
    .parse_next(input)
}

fn arrow_chars<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., is_arrow_char).parse_next(input)
}

/// A run of arrow characters.
///
/// Runs holding a line pattern become arrow notation; otherwise a leading
/// `:` is a colon and anything else is dropped.
fn arrow_run(input: &mut Input<'_>) -> IResult<Lexeme> {
    alt((
        arrow_chars
            .verify(|run: &str| arrow_notation::contains_line_pattern(run))
            .map(|run: &str| Lexeme::Token(TokenKind::ArrowNotation, run.to_string())),
        ':'.value(Lexeme::Token(TokenKind::Colon, ":".to_string())),
        arrow_chars.map(|run: &str| Lexeme::Discarded(run.to_string())),
    ))
    .parse_next(input)
}

fn punctuation(input: &mut Input<'_>) -> IResult<Lexeme> {
    alt((
        '{'.value(Lexeme::Token(TokenKind::BraceOpen, "{".to_string())),
        '}'.value(Lexeme::Token(TokenKind::BraceClose, "}".to_string())),
        '/'.value(Lexeme::Token(TokenKind::Slash, "/".to_string())),
    ))
    .parse_next(input)
}

fn lexeme(input: &mut Input<'_>) -> IResult<Lexeme> {
    alt((
        whitespace,
        string_literal,        // Must come before everything that could eat a quote
        legacy_arrow,          // Must come before arrow runs
        identifier_or_keyword, // Identifiers never start with `-`
        arrow_run,
        punctuation,
    ))
    .parse_next(input)
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn tokenize(&mut self) {
        let mut line_start = 0;
        let mut last = Position::default();
        for (line_no, line) in self.source.split('\n').enumerate() {
            last = self.tokenize_line(line, line_no, line_start);
            line_start += line.len() + 1;
        }
        let end = self.source.len();
        self.tokens
            .push(Token::new(TokenKind::Eoi, "", last, Span::new(end..end)));
    }

    /// Lexes one line and returns the position just past its last character.
    fn tokenize_line(&mut self, line: &str, line_no: usize, line_start: usize) -> Position {
        let column_of = |offset: usize| line[..offset].chars().count();
        let mut input = LocatingSlice::new(line);
        let mut line_has_error = false;

        while !input.is_empty() {
            let checkpoint = input.checkpoint();
            let start = input.current_token_start();
            let result = lexeme(&mut input);
            let end = input.current_token_start();
            let position = Position::new(line_no, column_of(start));
            let span = Span::new(line_start + start..line_start + end);

            match result {
                Ok(Lexeme::Token(kind, value)) => {
                    self.tokens.push(Token::new(kind, value, position, span));
                }
                Ok(Lexeme::Unterminated(value)) => {
                    self.tokens
                        .push(Token::new(TokenKind::String, value, position, span));
                    if !line_has_error {
                        line_has_error = true;
                        self.diagnostics.push(
                            Diagnostic::error("Unterminated string literal")
                                .with_code(ErrorCode::E001)
                                .at(position)
                                .marking(span, ErrorCode::E001.description())
                                .with_help("add a closing `\"` before the end of the line"),
                        );
                    }
                }
                Ok(Lexeme::Discarded(run)) => {
                    debug!(line = line_no, run = run.as_str(); "Discarding arrow run without line pattern");
                }
                Ok(Lexeme::Whitespace) => {}
                Err(_) => {
                    input.reset(&checkpoint);
                    let ch = input.next_token();
                    if !line_has_error {
                        line_has_error = true;
                        let width = ch.map_or(0, char::len_utf8);
                        let span = Span::new(line_start + start..line_start + start + width);
                        self.diagnostics.push(
                            Diagnostic::error("Unexpected character")
                                .with_code(ErrorCode::E002)
                                .at(position)
                                .marking(span, ErrorCode::E002.description()),
                        );
                    }
                }
            }
        }

        let end = Position::new(line_no, line.chars().count());
        let newline_at = line_start + line.len();
        let newline_end = (newline_at + 1).min(self.source.len());
        self.tokens.push(Token::new(
            TokenKind::Newline,
            "\n",
            end,
            Span::new(newline_at..newline_end),
        ));
        end
    }
}

/// Converts source text into tokens.
///
/// Always produces a complete token stream; lexical problems (at most one per
/// line, the first one wins) are returned alongside it.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    debug!(
        tokens = lexer.tokens.len(),
        errors = lexer.diagnostics.len();
        "Tokenized source"
    );
    trace!(tokens:? = lexer.tokens; "Token stream");
    (lexer.tokens, lexer.diagnostics)
}
