//! The core diagnostic type.
//!
//! A [`Diagnostic`] is a single error or warning with an optional error
//! code, the line/column it was reported at, the span it marks, related
//! spans elsewhere in the text and help text.

use std::fmt;

use crate::{
    error::error_code::ErrorCode,
    span::{Position, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    /// Reported, but the line still parses.
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A span of the source with a short note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub span: Span,
    pub note: String,
}

impl Mark {
    fn new(span: Span, note: impl Into<String>) -> Self {
        Self {
            span,
            note: note.into(),
        }
    }
}

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E200]: Duplicate element ID: "cell_1"
///   --> table.weft:3:3
///    |
///  3 |   cell_1: text "B"
///    |   ^^^^^^ declared again here
///    |
///    = help: rename one of the elements
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    position: Position,
    mark: Option<Mark>,
    related: Vec<Mark>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use weft_parser::error::{Diagnostic, ErrorCode};
    /// # use weft_parser::span::{Position, Span};
    ///
    /// let diag = Diagnostic::error("Unexpected token")
    ///     .with_code(ErrorCode::E100)
    ///     .at(Position::new(2, 4))
    ///     .marking(Span::new(30..33), "not expected here")
    ///     .with_help("each line declares one element: `id: shape`");
    ///
    /// assert_eq!(diag.line(), 2);
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// 0-based line the diagnostic is reported on.
    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// The span the diagnostic is about, when it has one.
    pub fn mark(&self) -> Option<&Mark> {
        self.mark.as_ref()
    }

    /// Other places in the text involved in the problem.
    pub fn related(&self) -> &[Mark] {
        &self.related
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the line and column the diagnostic is reported on.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Mark the span the diagnostic is about, replacing any earlier mark.
    pub fn marking(mut self, span: Span, note: impl Into<String>) -> Self {
        self.mark = Some(Mark::new(span, note));
        self
    }

    pub fn related_to(mut self, span: Span, note: impl Into<String>) -> Self {
        self.related.push(Mark::new(span, note));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            position: Position::default(),
            mark: None,
            related: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        f.write_str(self.severity.as_str())?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
