//! Named text formats.
//!
//! A [`TextFormat`] bundles the parse, serialize and optional highlight
//! functions of one textual dialect. Formats are looked up by name in a
//! [`FormatRegistry`]; the Weft dialect is registered as `"weft"`.

use indexmap::IndexMap;
use thiserror::Error;
use weft_core::{document::Document, identifier::Id};

use crate::{error::LineErrors, highlight, parser::ParseOutput, serialize, validate::RuleSet};

/// Name the Weft dialect is registered under.
pub const WEFT_FORMAT: &str = "weft";

pub trait TextFormat {
    fn name(&self) -> &str;

    fn parse(&self, text: &str) -> ParseOutput;

    fn serialize(&self, document: &Document, roots: &[Id]) -> Vec<String>;

    /// Highlights source lines; `None` when the format has no highlighter.
    fn highlight(&self, _lines: &[&str], _errors: &LineErrors) -> Option<Vec<String>> {
        None
    }
}

/// Lookup of a format name that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown text format: {name} (registered: {registered})")]
pub struct UnknownFormatError {
    pub name: String,
    pub registered: String,
}

/// The Weft dialect, validated with a configurable rule set.
#[derive(Debug, Default)]
pub struct WeftFormat {
    rules: RuleSet,
}

impl WeftFormat {
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl TextFormat for WeftFormat {
    fn name(&self) -> &str {
        WEFT_FORMAT
    }

    fn parse(&self, text: &str) -> ParseOutput {
        crate::parse_with_rules(text, &self.rules)
    }

    fn serialize(&self, document: &Document, roots: &[Id]) -> Vec<String> {
        serialize::serialize(document, roots)
    }

    fn highlight(&self, lines: &[&str], errors: &LineErrors) -> Option<Vec<String>> {
        Some(highlight::highlight(lines, errors))
    }
}

/// Text formats keyed by name, in registration order.
pub struct FormatRegistry {
    formats: IndexMap<String, Box<dyn TextFormat>>,
}

impl FormatRegistry {
    /// A registry without any format.
    pub fn empty() -> Self {
        Self {
            formats: IndexMap::new(),
        }
    }

    /// Registers a format, replacing any format of the same name.
    pub fn register(&mut self, format: impl TextFormat + 'static) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Option<&dyn TextFormat> {
        self.formats.get(name).map(|format| &**format)
    }

    /// Like [`FormatRegistry::get`], for callers that treat a missing format as an error.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFormatError`] listing the registered names.
    pub fn require(&self, name: &str) -> Result<&dyn TextFormat, UnknownFormatError> {
        self.get(name).ok_or_else(|| UnknownFormatError {
            name: name.to_string(),
            registered: self.names().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(WeftFormat::default());
        registry
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
