//! Token types produced by the [`lexer`](crate::lexer).

use std::fmt;

use crate::span::{Position, Span};

/// Token kinds of the Weft language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Edge,
    Props,
    Metadata,
    Stylesheet,

    // Literals
    Identifier,
    /// A quoted string; the token value holds the unescaped contents.
    String,
    /// A run of line and arrowhead characters such as `<|--` or the legacy `->`.
    ArrowNotation,

    // Punctuation
    BraceOpen,  // {
    BraceClose, // }
    Colon,      // :
    Slash,      // /

    Newline,
    /// End of input.
    Eoi,
}

impl TokenKind {
    /// Returns the keyword kind spelled `word`, if any.
    pub fn keyword(word: &str) -> Option<Self> {
        match word {
            "edge" => Some(Self::Edge),
            "props" => Some(Self::Props),
            "metadata" => Some(Self::Metadata),
            "stylesheet" => Some(Self::Stylesheet),
            _ => None,
        }
    }

    /// Returns `true` for the kinds that end a line.
    pub fn is_line_end(self) -> bool {
        matches!(self, Self::Newline | Self::Eoi)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edge => "`edge`",
            Self::Props => "`props`",
            Self::Metadata => "`metadata`",
            Self::Stylesheet => "`stylesheet`",
            Self::Identifier => "identifier",
            Self::String => "string",
            Self::ArrowNotation => "arrow notation",
            Self::BraceOpen => "`{`",
            Self::BraceClose => "`}`",
            Self::Colon => "`:`",
            Self::Slash => "`/`",
            Self::Newline => "end of line",
            Self::Eoi => "end of input",
        };
        f.write_str(name)
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// 0-based line.
    pub line: usize,
    /// 0-based column, in characters.
    pub column: usize,
    /// Byte range in the full source text.
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            line: position.line,
            column: position.column,
            span,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::ArrowNotation => write!(f, "`{}`", self.value),
            TokenKind::String => write!(f, "\"{}\"", self.value),
            kind => write!(f, "{kind}"),
        }
    }
}
