//! Post-parse validation over the whole parse forest.
//!
//! Rules run after parsing and report diagnostics without touching the
//! forest. They are held as data in a [`RuleSet`], so callers can register
//! further rules without changing the parser.

use indexmap::IndexMap;
use log::debug;
use weft_core::identifier::Id;

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types::{ParsedCommon, ParsedEdge, ParsedElement, ParsedNode},
    span::{Position, Span},
};

/// Read-only walk over a parse forest.
///
/// Every method has a default implementation that recurses into children,
/// so implementors only override the hooks they care about.
pub trait Visitor {
    /// Visit a list of sibling elements
    fn visit_elements(&mut self, elements: &[ParsedElement]) {
        for element in elements {
            self.visit_element(element);
        }
    }

    /// Visit one element and then its children
    fn visit_element(&mut self, element: &ParsedElement) {
        self.visit_common(element.common());
        match element {
            ParsedElement::Node(node) => self.visit_node(node),
            ParsedElement::Edge(edge) => self.visit_edge(edge),
        }
        self.visit_elements(element.children());
    }

    /// Visit the fields shared by nodes and edges
    fn visit_common(&mut self, _common: &ParsedCommon) {}

    fn visit_node(&mut self, _node: &ParsedNode) {}

    fn visit_edge(&mut self, _edge: &ParsedEdge) {}
}

/// A pure check over a parse forest.
pub trait ValidationRule {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn check(&self, forest: &[ParsedElement]) -> Vec<Diagnostic>;
}

/// Reports every ID that is declared on more than one line.
///
/// The forest is walked recursively, so IDs nested in different parents
/// still collide. Each offending line gets its own diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicateIdRule;

#[derive(Default)]
struct IdCollector {
    seen: IndexMap<Id, Vec<(usize, Span)>>,
}

impl Visitor for IdCollector {
    fn visit_common(&mut self, common: &ParsedCommon) {
        self.seen
            .entry(common.id)
            .or_default()
            .push((common.line, common.id_span));
    }
}

impl ValidationRule for DuplicateIdRule {
    fn name(&self) -> &'static str {
        "duplicate-id"
    }

    fn check(&self, forest: &[ParsedElement]) -> Vec<Diagnostic> {
        let mut collector = IdCollector::default();
        collector.visit_elements(forest);

        let mut diagnostics = Vec::new();
        for (id, occurrences) in collector.seen {
            if occurrences.len() < 2 {
                continue;
            }
            let (_, first_span) = occurrences[0];
            for (idx, (line, span)) in occurrences.iter().enumerate() {
                let mut diagnostic = Diagnostic::error(format!("Duplicate element ID: \"{id}\""))
                    .with_code(ErrorCode::E200)
                    .at(Position::new(*line, 0))
                    .marking(*span, "declared here");
                if idx > 0 {
                    diagnostic = diagnostic
                        .related_to(first_span, "first declared here")
                        .with_help("element IDs must be unique in the whole document");
                }
                diagnostics.push(diagnostic);
            }
        }
        diagnostics
    }
}

/// Ordered list of validation rules.
pub struct RuleSet {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleSet {
    /// A rule set without any rule.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: impl ValidationRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn with(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in registration order.
    pub fn check(&self, forest: &[ParsedElement]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let found = rule.check(forest);
            debug!(rule = rule.name(), diagnostics = found.len(); "Validation rule finished");
            diagnostics.extend(found);
        }
        diagnostics
    }
}

impl Default for RuleSet {
    /// The rules every Weft document is checked against.
    fn default() -> Self {
        Self::empty().with(DuplicateIdRule)
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, line: usize, children: Vec<ParsedElement>) -> ParsedElement {
        let mut common = ParsedCommon::new(Id::new(id), line, Span::default());
        common.children = children;
        ParsedElement::Node(ParsedNode {
            common,
            shape: "rect".to_string(),
            name: None,
            text_stylesheet: None,
        })
    }

    #[test]
    fn test_unique_ids_pass() {
        let forest = vec![node("a", 0, vec![node("b", 1, vec![])]), node("c", 3, vec![])];
        assert!(DuplicateIdRule.check(&forest).is_empty());
    }

    #[test]
    fn test_duplicates_reported_on_every_line() {
        let forest = vec![
            node("x", 0, vec![node("dup", 1, vec![])]),
            node("dup", 3, vec![]),
            node("dup", 4, vec![]),
        ];
        let diagnostics = DuplicateIdRule.check(&forest);
        let lines: Vec<_> = diagnostics.iter().map(Diagnostic::line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
        assert!(
            diagnostics
                .iter()
                .all(|d| d.message() == "Duplicate element ID: \"dup\"")
        );
        assert!(diagnostics[0].related().is_empty());
        assert_eq!(diagnostics[1].related()[0].span, diagnostics[0].mark().unwrap().span);
    }

    struct RejectAll;

    impl ValidationRule for RejectAll {
        fn name(&self) -> &'static str {
            "reject-all"
        }

        fn check(&self, forest: &[ParsedElement]) -> Vec<Diagnostic> {
            forest
                .iter()
                .map(|e| Diagnostic::error("rejected").at(Position::new(e.line(), 0)))
                .collect()
        }
    }

    #[test]
    fn test_rule_set_runs_pushed_rules() {
        let mut rules = RuleSet::default();
        assert_eq!(rules.len(), 1);
        rules.push(RejectAll);

        let forest = vec![node("a", 0, vec![]), node("a", 2, vec![])];
        let messages: Vec<_> = rules
            .check(&forest)
            .iter()
            .map(|d| d.message().to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Duplicate element ID: \"a\"",
                "Duplicate element ID: \"a\"",
                "rejected",
                "rejected",
            ]
        );
        assert_eq!(format!("{rules:?}"), "[\"duplicate-id\", \"reject-all\"]");
    }
}
