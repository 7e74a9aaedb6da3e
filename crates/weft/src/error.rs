//! Error types for Weft operations.
//!
//! This module provides the main error type [`WeftError`] which wraps
//! the error conditions that can occur while loading and applying text.

use std::io;

use thiserror::Error;

use weft_parser::error::ParseError;

/// The main error type for Weft operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics, so
/// callers can render every diagnostic with its source snippet.
#[derive(Debug, Error)]
pub enum WeftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeftError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
