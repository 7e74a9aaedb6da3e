//! Error and diagnostic system for the Weft parser.
//!
//! The error system is built around the [`Diagnostic`] type: one error or
//! warning with an error code, the line/column it refers to, the byte span
//! it marks and help text. Diagnostics are collected per source line in
//! [`LineErrors`] so a bad line never hides problems on other lines, and can
//! be turned into a [`ParseError`] by callers that want a `Result`.
//!
//! # Example
//!
//! ```
//! # use weft_parser::error::{Diagnostic, ErrorCode};
//! # use weft_parser::span::{Position, Span};
//!
//! let diag = Diagnostic::error("Duplicate element ID: \"cell_1\"")
//!     .with_code(ErrorCode::E200)
//!     .at(Position::new(2, 2))
//!     .marking(Span::new(30..36), "declared again here")
//!     .related_to(Span::new(12..18), "also declared here");
//! ```

mod diagnostic;
mod error_code;
mod line_errors;
mod parse_error;

pub use diagnostic::{Diagnostic, Mark, Severity};
pub use error_code::ErrorCode;
pub use line_errors::LineErrors;
pub use parse_error::ParseError;
