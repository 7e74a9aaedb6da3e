//! Arrow notation: the symbolic connector written between two edge endpoints.
//!
//! A notation is a line pattern with optional arrowhead symbols on either
//! side, e.g. `<|--`, `<#>==>` or `(#)::*`.
//!
//! | line | width | pattern |
//! |------|-------|---------|
//! | `--` | 1     | solid   |
//! | `..` | 1     | dotted  |
//! | `-.` | 1     | dashed  |
//! | `==` | 2     | solid   |
//! | `::` | 2     | dotted  |
//! | `=:` | 2     | dashed  |
//!
//! Arrowhead symbols are listed in [`symbols`]. Parsing and serialization are
//! exact inverses for every combination of canonical symbols.

use std::{collections::HashMap, sync::LazyLock};

use weft_core::{
    decoration::{ArrowheadKind, StrokePattern},
    props::ElementProps,
};

/// Line patterns in the order they are searched for.
const LINE_PATTERNS: [(&str, f32, StrokePattern); 6] = [
    ("::", 2.0, StrokePattern::Dotted),
    ("=:", 2.0, StrokePattern::Dashed),
    ("==", 2.0, StrokePattern::Solid),
    ("--", 1.0, StrokePattern::Solid),
    ("..", 1.0, StrokePattern::Dotted),
    ("-.", 1.0, StrokePattern::Dashed),
];

/// Returns the `(start, end)` symbols of an arrowhead kind.
pub fn symbols(kind: ArrowheadKind) -> (&'static str, &'static str) {
    match kind {
        ArrowheadKind::None => ("", ""),
        ArrowheadKind::Arrow => ("<", ">"),
        ArrowheadKind::DoubleArrow => ("<<", ">>"),
        ArrowheadKind::TriangleOutline => ("<|", "|>"),
        ArrowheadKind::TriangleFilled => ("<|#", "#|>"),
        ArrowheadKind::DiamondOutline => ("<>", "<>"),
        ArrowheadKind::DiamondFilled => ("<#>", "<#>"),
        ArrowheadKind::BallOutline => ("()", "()"),
        ArrowheadKind::BallFilled => ("(#)", "(#)"),
        ArrowheadKind::Bar => ("|", "|"),
        ArrowheadKind::Cross => ("+", "+"),
        ArrowheadKind::Many => ("*", "*"),
    }
}

static START_KINDS: LazyLock<HashMap<&'static str, ArrowheadKind>> = LazyLock::new(|| {
    ArrowheadKind::ALL
        .into_iter()
        .map(|kind| (symbols(kind).0, kind))
        .collect()
});

static END_KINDS: LazyLock<HashMap<&'static str, ArrowheadKind>> = LazyLock::new(|| {
    ArrowheadKind::ALL
        .into_iter()
        .map(|kind| (symbols(kind).1, kind))
        .collect()
});

/// Structured form of an arrow notation string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowNotation {
    pub start: ArrowheadKind,
    pub end: ArrowheadKind,
    pub stroke_width: f32,
    pub stroke_pattern: StrokePattern,
}

impl ArrowNotation {
    /// Props fragment carrying this notation.
    ///
    /// Both arrowhead kinds are always set, so applying the fragment over
    /// existing props also clears arrowheads the notation leaves out.
    pub fn to_props(&self) -> ElementProps {
        let mut props = ElementProps::default();
        props.stroke.width = Some(self.stroke_width);
        props.stroke.pattern = Some(self.stroke_pattern);
        props.arrow.start.kind = Some(self.start);
        props.arrow.end.kind = Some(self.end);
        props
    }

    /// Derives a notation from props.
    ///
    /// Missing values default to a plain solid line of width 1. Returns `None`
    /// when the stroke width and pattern have no line pattern.
    pub fn from_props(props: &ElementProps) -> Option<Self> {
        let notation = Self {
            start: props.arrow.start.kind.unwrap_or_default(),
            end: props.arrow.end.kind.unwrap_or_default(),
            stroke_width: props.stroke.width.unwrap_or(1.0),
            stroke_pattern: props.stroke.pattern.unwrap_or_default(),
        };
        line_pattern(notation.stroke_width, notation.stroke_pattern).map(|_| notation)
    }
}

fn line_pattern(width: f32, pattern: StrokePattern) -> Option<&'static str> {
    LINE_PATTERNS
        .iter()
        .find(|(_, w, p)| *w == width && *p == pattern)
        .map(|(symbol, _, _)| *symbol)
}

/// Returns `true` when `run` holds any line pattern.
pub fn contains_line_pattern(run: &str) -> bool {
    LINE_PATTERNS
        .iter()
        .any(|(pattern, _, _)| run.contains(pattern))
}

/// Parses an arrow notation string.
///
/// Returns `None` when no line pattern is found or when a side holds an
/// unknown symbol.
pub fn parse(notation: &str) -> Option<ArrowNotation> {
    let (idx, (pattern, width, stroke_pattern)) = LINE_PATTERNS
        .iter()
        .find_map(|entry| notation.find(entry.0).map(|idx| (idx, entry)))?;

    let left = &notation[..idx];
    let right = &notation[idx + pattern.len()..];

    Some(ArrowNotation {
        start: *START_KINDS.get(left)?,
        end: *END_KINDS.get(right)?,
        stroke_width: *width,
        stroke_pattern: *stroke_pattern,
    })
}

/// Writes a notation back to its symbolic form.
///
/// Returns `None` when the stroke width and pattern have no line pattern.
pub fn serialize(notation: &ArrowNotation) -> Option<String> {
    let line = line_pattern(notation.stroke_width, notation.stroke_pattern)?;
    let (start, _) = symbols(notation.start);
    let (_, end) = symbols(notation.end);
    Some(format!("{start}{line}{end}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triangle() {
        let notation = parse("<|#--#|>").unwrap();
        assert_eq!(notation.start, ArrowheadKind::TriangleFilled);
        assert_eq!(notation.end, ArrowheadKind::TriangleFilled);
        assert_eq!(notation.stroke_width, 1.0);
        assert_eq!(notation.stroke_pattern, StrokePattern::Solid);
    }

    #[test]
    fn test_parse_one_sided() {
        let notation = parse("=:>").unwrap();
        assert_eq!(notation.start, ArrowheadKind::None);
        assert_eq!(notation.end, ArrowheadKind::Arrow);
        assert_eq!(notation.stroke_width, 2.0);
        assert_eq!(notation.stroke_pattern, StrokePattern::Dashed);
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse("->"), None);
        assert_eq!(parse("<>"), None);
        assert_eq!(parse("<?--"), None);
        assert_eq!(parse("--|||"), None);
    }

    #[test]
    fn test_every_kind_round_trips_on_both_sides() {
        for kind in ArrowheadKind::ALL {
            for (line, width, pattern) in LINE_PATTERNS {
                let at_start = ArrowNotation {
                    start: kind,
                    end: ArrowheadKind::None,
                    stroke_width: width,
                    stroke_pattern: pattern,
                };
                let at_end = ArrowNotation {
                    start: ArrowheadKind::None,
                    end: kind,
                    ..at_start
                };
                for notation in [at_start, at_end] {
                    let text = serialize(&notation).unwrap();
                    assert!(text.contains(line));
                    assert_eq!(parse(&text), Some(notation), "notation {text}");
                }
            }
        }
    }

    #[test]
    fn test_props_round_trip() {
        let notation = parse("<<..()").unwrap();
        let props = notation.to_props();
        assert_eq!(props.arrow.end.kind, Some(ArrowheadKind::BallOutline));
        assert_eq!(ArrowNotation::from_props(&props), Some(notation));
    }

    #[test]
    fn test_from_props_defaults_and_failure() {
        let plain = ArrowNotation::from_props(&ElementProps::default()).unwrap();
        assert_eq!(serialize(&plain).as_deref(), Some("--"));

        let mut thick = ElementProps::default();
        thick.stroke.width = Some(3.0);
        assert_eq!(ArrowNotation::from_props(&thick), None);
    }

    #[test]
    fn test_contains_line_pattern() {
        assert!(contains_line_pattern("<|--"));
        assert!(contains_line_pattern("::"));
        assert!(!contains_line_pattern("<>"));
        assert!(!contains_line_pattern("->"));
    }
}
