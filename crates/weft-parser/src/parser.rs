//! Parser for Weft source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the parse forest defined in [`parser_types`](super::parser_types).
//!
//! ```text
//! element        := (ID | STRING | ) ':' (edgeBody | nodeBody)
//! edgeBody       := 'edge' [endpoint [arrowNotation endpoint]] [STRING] body?
//! nodeBody       := shapeId [STRING] body?
//! body           := '{' (propsLine | metadataLine | stylesheetLine | element)* '}'
//! propsLine      := 'props' ':' STRING
//! metadataLine   := 'metadata' ':' STRING
//! stylesheetLine := 'stylesheet' ':' [name] ['/' [name]]
//! ```
//!
//! Errors never abort the parse. A line that cannot be parsed is reported
//! once and skipped up to its newline; inside a body the body loop resumes,
//! so a bad child line never loses its parent.

use std::collections::HashSet;

use log::{debug, trace};
use weft_core::{
    identifier::Id,
    props::{ElementProps, Merge, MergePolicy, Metadata},
};

use crate::{
    arrow_notation,
    error::{Diagnostic, ErrorCode, LineErrors, ParseError},
    parser_types::{ParsedCommon, ParsedEdge, ParsedElement, ParsedNode},
    span::Position,
    tokens::{Token, TokenKind},
};

/// A type alias for `Result<T, Diagnostic>`.
type Result<T> = std::result::Result<T, Diagnostic>;

/// Parse forest together with every diagnostic reported while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub elements: Vec<ParsedElement>,
    pub errors: LineErrors,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the forest, or every diagnostic in line order when there is any.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when at least one diagnostic was reported.
    pub fn into_result(self) -> std::result::Result<Vec<ParsedElement>, ParseError> {
        if self.errors.is_empty() {
            Ok(self.elements)
        } else {
            Err(self.errors.into())
        }
    }
}

/// Cursor over a token stream that always ends with [`TokenKind::Eoi`].
pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    anonymous: usize,
    /// IDs the text declares itself, never handed out to anonymous elements.
    declared: HashSet<Id>,
    last_line: usize,
    errors: LineErrors,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token], errors: LineErrors) -> Self {
        let declared = tokens
            .windows(2)
            .filter(|pair| {
                matches!(pair[0].kind, TokenKind::Identifier | TokenKind::String)
                    && pair[1].kind == TokenKind::Colon
            })
            .map(|pair| Id::new(&pair[0].value))
            .collect();
        Self {
            tokens,
            pos: 0,
            anonymous: 0,
            declared,
            last_line: 0,
            errors,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().map_or(TokenKind::Eoi, |token| token.kind)
    }

    fn peek_kind_nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eoi, |token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_line_end(&self) -> bool {
        self.peek_kind().is_line_end()
    }

    /// Consumes the current token. End of input is never consumed.
    ///
    /// Newlines are not tracked in `last_line`.
    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Eoi => {}
            TokenKind::Newline => self.pos += 1,
            _ => {
                self.pos += 1;
                self.last_line = token.line;
            }
        }
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.at(kind) { self.advance() } else { None }
    }

    fn skip_blank_lines(&mut self) {
        while self.eat(TokenKind::Newline).is_some() {}
    }

    /// Skips the rest of the current line, including its newline.
    fn skip_line(&mut self) {
        while !self.at_line_end() {
            self.advance();
        }
        self.eat(TokenKind::Newline);
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        trace!(line = diagnostic.line(), message = diagnostic.message(); "Parse error");
        self.errors.push(diagnostic);
    }

    fn error_at_current(&self, code: ErrorCode, message: impl Into<String>) -> Diagnostic {
        match self.peek() {
            Some(token) => Diagnostic::error(message)
                .with_code(code)
                .at(token.position())
                .marking(token.span, code.description()),
            None => Diagnostic::error(message).with_code(code),
        }
    }

    fn unexpected(&self) -> Diagnostic {
        let found = self
            .peek()
            .map_or_else(|| TokenKind::Eoi.to_string(), Token::to_string);
        self.error_at_current(ErrorCode::E100, format!("Unexpected token {found}"))
    }

    /// Consumes the end of an element line.
    fn end_of_line(&mut self) -> Result<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eoi => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    /// Parses top-level elements until the end of input.
    pub(crate) fn parse_forest(mut self) -> (Vec<ParsedElement>, LineErrors) {
        let mut elements = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.at(TokenKind::Eoi) {
                break;
            }
            match self.element() {
                Ok(element) => elements.push(element),
                Err(diagnostic) => {
                    self.record(diagnostic);
                    self.skip_line();
                }
            }
        }
        debug!(elements = elements.len(), errors = self.errors.len(); "Parsed forest");
        (elements, self.errors)
    }

    /// Next synthesized ID not declared anywhere in the text.
    fn next_anonymous(&mut self) -> Id {
        loop {
            let id = Id::from_anonymous(self.anonymous);
            self.anonymous += 1;
            if !self.declared.contains(&id) {
                return id;
            }
            trace!(id:% = id; "Anonymous ID already declared, skipping");
        }
    }

    fn element(&mut self) -> Result<ParsedElement> {
        let Some(head) = self.peek() else {
            return Err(self.unexpected());
        };

        let id = match head.kind {
            TokenKind::Identifier | TokenKind::String => {
                self.advance();
                if self.eat(TokenKind::Colon).is_none() {
                    return Err(self.error_at_current(
                        ErrorCode::E102,
                        "Expected ':' after element ID",
                    ));
                }
                Id::new(&head.value)
            }
            TokenKind::Colon => {
                self.advance();
                self.next_anonymous()
            }
            _ => return Err(self.unexpected()),
        };
        let common = ParsedCommon::new(id, head.line, head.span);

        match self.peek_kind() {
            TokenKind::Edge => self.edge(common),
            TokenKind::Identifier => self.node(common),
            _ => Err(self.error_at_current(
                ErrorCode::E103,
                "Expected shape or 'edge' after ':'",
            )),
        }
    }

    fn node(&mut self, common: ParsedCommon) -> Result<ParsedElement> {
        let shape = self.advance().map(|t| t.value.clone()).unwrap_or_default();
        let name = self.eat(TokenKind::String).map(|t| t.value.clone());
        let mut element = ParsedElement::Node(ParsedNode {
            common,
            shape,
            name,
            text_stylesheet: None,
        });
        self.finish_element(&mut element)?;
        Ok(element)
    }

    fn edge(&mut self, mut common: ParsedCommon) -> Result<ParsedElement> {
        self.advance();
        let mut from = None;
        let mut to = None;

        let endpoint = |kind: TokenKind| matches!(kind, TokenKind::Identifier | TokenKind::String);
        let connects = endpoint(self.peek_kind())
            && self.peek_kind_nth(1) == TokenKind::ArrowNotation;
        if connects || self.at(TokenKind::Identifier) {
            from = self.advance().map(|t| Id::new(&t.value));
        }
        if connects {
            let notation = self.advance().map(|t| t.value.as_str()).unwrap_or_default();
            if !endpoint(self.peek_kind()) {
                return Err(self.error_at_current(
                    ErrorCode::E100,
                    "Expected edge target after arrow notation",
                ));
            }
            to = self.advance().map(|t| Id::new(&t.value));
            match arrow_notation::parse(notation) {
                Some(parsed) => common.props = parsed.to_props(),
                None => trace!(notation = notation; "Connector without decoration"),
            }
        }
        let label = self.eat(TokenKind::String).map(|t| t.value.clone());

        let mut element = ParsedElement::Edge(ParsedEdge {
            common,
            from,
            to,
            label,
        });
        self.finish_element(&mut element)?;
        Ok(element)
    }

    /// Parses the optional body and the end of the header line.
    fn finish_element(&mut self, element: &mut ParsedElement) -> Result<()> {
        if self.at(TokenKind::BraceOpen) {
            self.body(element);
            Ok(())
        } else {
            self.end_of_line()
        }
    }

    fn body(&mut self, element: &mut ParsedElement) {
        self.advance();
        if let Err(diagnostic) = self.end_of_line() {
            self.record(diagnostic);
            self.skip_line();
        }

        loop {
            self.skip_blank_lines();
            let result = match self.peek_kind() {
                TokenKind::BraceClose => {
                    self.advance();
                    if let Err(diagnostic) = self.end_of_line() {
                        self.record(diagnostic);
                        self.skip_line();
                    }
                    return;
                }
                TokenKind::Eoi => {
                    let last = self.last_line;
                    let diagnostic = self
                        .error_at_current(ErrorCode::E101, "Missing closing brace '}'")
                        .at(Position::new(last, 0));
                    self.record(diagnostic);
                    return;
                }
                TokenKind::Props => self.props_line(element.common_mut()),
                TokenKind::Metadata => self.metadata_line(element.common_mut()),
                TokenKind::Stylesheet => self.stylesheet_line(element),
                _ => self
                    .element()
                    .map(|child| element.common_mut().children.push(child)),
            };
            if let Err(diagnostic) = result {
                self.record(diagnostic);
                self.skip_line();
            }
        }
    }

    /// Consumes `keyword ':' STRING` and returns the string.
    fn string_setting(&mut self, keyword: &str) -> Result<String> {
        self.advance();
        if self.eat(TokenKind::Colon).is_none() {
            return Err(self.error_at_current(
                ErrorCode::E102,
                format!("Expected ':' after '{keyword}'"),
            ));
        }
        let Some(value) = self.eat(TokenKind::String) else {
            return Err(self.error_at_current(
                ErrorCode::E104,
                format!("Expected string value after '{keyword}:'"),
            ));
        };
        self.end_of_line()?;
        Ok(value.value.clone())
    }

    fn props_line(&mut self, common: &mut ParsedCommon) -> Result<()> {
        let text = self.string_setting("props")?;
        common
            .props
            .merge(&ElementProps::parse_lenient(&text), MergePolicy::Override);
        Ok(())
    }

    fn metadata_line(&mut self, common: &mut ParsedCommon) -> Result<()> {
        let text = self.string_setting("metadata")?;
        common.metadata.overlay(&Metadata::parse_lenient(&text));
        Ok(())
    }

    fn style_name(&mut self) -> Option<String> {
        match self.peek_kind() {
            TokenKind::Identifier | TokenKind::String => self.advance().map(|t| t.value.clone()),
            _ => None,
        }
    }

    fn stylesheet_line(&mut self, element: &mut ParsedElement) -> Result<()> {
        self.advance();
        if self.eat(TokenKind::Colon).is_none() {
            return Err(self.error_at_current(
                ErrorCode::E102,
                "Expected ':' after 'stylesheet'",
            ));
        }
        let name = self.style_name();
        let slash = self.eat(TokenKind::Slash);
        let text = if slash.is_some() { self.style_name() } else { None };
        if !self.at_line_end() {
            return Err(self.unexpected());
        }

        match element {
            ParsedElement::Node(node) => {
                node.common.stylesheet = name;
                node.text_stylesheet = text;
            }
            ParsedElement::Edge(edge) => {
                edge.common.stylesheet = name;
                if let (Some(slash), Some(_)) = (slash, text) {
                    self.record(
                        Diagnostic::error("Edges do not support a text stylesheet")
                            .with_code(ErrorCode::E201)
                            .at(slash.position())
                            .marking(slash.span, ErrorCode::E201.description())
                            .with_help("remove the `/text` part of the stylesheet line"),
                    );
                }
            }
        }
        self.end_of_line()
    }
}
