//! Error codes for the Weft diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but the line ended before it was closed.
    E001,

    /// Unexpected character.
    E002,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Missing closing brace.
    ///
    /// The input ended inside an element body.
    E101,

    /// Missing colon after an element ID.
    E102,

    /// Missing shape or `edge` keyword after the colon.
    E103,

    /// Missing string value after `props:` or `metadata:`.
    E104,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Duplicate element ID.
    ///
    /// The same ID was declared on more than one line.
    E200,

    /// Text stylesheet on an edge.
    ///
    /// Edges only carry a style name; the `/text` part is ignored.
    E201,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "missing closing brace",
            ErrorCode::E102 => "missing colon",
            ErrorCode::E103 => "missing shape or edge",
            ErrorCode::E104 => "missing string value",
            ErrorCode::E200 => "duplicate element id",
            ErrorCode::E201 => "text stylesheet on edge",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E104.to_string(), "E104");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E200.description(), "duplicate element id");
    }
}
