//! # Weft Parser
//!
//! Lexer, parser, validation, serializer and highlighter for the Weft
//! diagram language.
//!
//! ## Usage
//!
//! ```
//! # use weft_parser::parse;
//!
//! let source = "server: rect \"API\"\ndb: cylinder\nlink: edge server --> db \"reads\"\n";
//! let output = parse(source);
//!
//! assert!(!output.has_errors());
//! assert_eq!(output.elements.len(), 3);
//! ```

pub mod arrow_notation;
pub mod error;
pub mod format;
pub mod highlight;
pub mod lexer;
mod parser;
pub mod parser_types;
pub mod serialize;
pub mod span;
pub mod tokens;
pub mod validate;

pub use parser::ParseOutput;

use log::info;

use error::LineErrors;
use parser::Parser;
use validate::RuleSet;

/// Parses source text into a forest, checked against the default rules.
///
/// Parsing never fails: the output holds every element that could be
/// recovered together with the diagnostics reported per line.
pub fn parse(source: &str) -> ParseOutput {
    parse_with_rules(source, &RuleSet::default())
}

/// Parses source text and checks the forest against `rules`.
///
/// The pipeline runs in three steps:
///
/// 1. **Tokenize** - Convert source text to tokens, one line at a time
/// 2. **Parse** - Build the forest, skipping lines that do not parse
/// 3. **Validate** - Run every rule over the whole forest
///
/// Diagnostics of all steps are collected per line in that order.
pub fn parse_with_rules(source: &str, rules: &RuleSet) -> ParseOutput {
    info!(bytes = source.len(); "Parsing source");

    // Step 1: Tokenize
    let (tokens, lexer_errors) = lexer::tokenize(source);
    let mut errors = LineErrors::new();
    errors.extend(lexer_errors);

    // Step 2: Parse
    let (elements, mut errors) = Parser::new(&tokens, errors).parse_forest();

    // Step 3: Validate
    errors.extend(rules.check(&elements));

    ParseOutput { elements, errors }
}
