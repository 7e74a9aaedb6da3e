//! Diagnostics grouped by source line.

use std::collections::BTreeMap;

use crate::error::{Diagnostic, ParseError};

/// Diagnostics keyed by the 0-based line they were reported on.
///
/// Several diagnostics may share a line; they keep the order in which they
/// were pushed, so lexer errors precede parser errors, which precede
/// validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineErrors {
    lines: BTreeMap<usize, Vec<Diagnostic>>,
}

impl LineErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic under its own line.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.lines
            .entry(diagnostic.line())
            .or_default()
            .push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Returns the diagnostics reported on `line`.
    pub fn get(&self, line: usize) -> &[Diagnostic] {
        self.lines.get(&line).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the first message reported on `line`.
    pub fn first_message(&self, line: usize) -> Option<&str> {
        self.get(line).first().map(Diagnostic::message)
    }

    pub fn has_line(&self, line: usize) -> bool {
        self.lines.contains_key(&line)
    }

    /// Lines that carry at least one diagnostic, ascending.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.keys().copied()
    }

    /// Total number of diagnostics.
    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over every diagnostic in line order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.lines.values().flatten()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.lines.into_values().flatten().collect()
    }
}

impl From<LineErrors> for ParseError {
    fn from(errors: LineErrors) -> Self {
        ParseError::new(errors.into_diagnostics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn diag(message: &str, line: usize) -> Diagnostic {
        Diagnostic::error(message).at(Position::new(line, 0))
    }

    #[test]
    fn test_keeps_every_diagnostic_per_line() {
        let mut errors = LineErrors::new();
        errors.push(diag("lexer", 2));
        errors.push(diag("parser", 2));
        errors.push(diag("other", 0));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.lines().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(errors.first_message(2), Some("lexer"));
        assert_eq!(errors.get(2).len(), 2);
        assert!(errors.get(1).is_empty());
    }

    #[test]
    fn test_into_diagnostics_is_line_ordered() {
        let mut errors = LineErrors::new();
        errors.extend([diag("b", 5), diag("a", 1)]);
        let messages: Vec<_> = errors
            .into_diagnostics()
            .iter()
            .map(|d| d.message().to_string())
            .collect();
        assert_eq!(messages, vec!["a", "b"]);
    }
}
