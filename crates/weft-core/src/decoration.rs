//! Enumerated values used by the property schema.
//!
//! - [`StrokePattern`]: Dash pattern of an edge or outline
//! - [`ArrowheadKind`]: Glyph drawn at either end of an edge
//! - [`TextAlign`]: Horizontal alignment of a text run
//!
//! Each type round-trips through [`FromStr`] and [`fmt::Display`] using the
//! spelling accepted in `props:` lines.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Error returned when a decoration value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value `{value}`")]
pub struct UnknownValue {
    kind: &'static str,
    value: String,
}

impl UnknownValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Dash pattern of a stroke.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

impl FromStr for StrokePattern {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(UnknownValue::new("stroke pattern", s)),
        }
    }
}

impl fmt::Display for StrokePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glyph drawn at one end of an edge.
///
/// `None` is a real value rather than an absent one: it records that an end
/// was explicitly left bare, so it overrides an arrowhead during a merge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowheadKind {
    #[default]
    None,
    Arrow,
    DoubleArrow,
    TriangleOutline,
    TriangleFilled,
    DiamondOutline,
    DiamondFilled,
    BallOutline,
    BallFilled,
    Bar,
    Cross,
    Many,
}

impl ArrowheadKind {
    /// All kinds, in declaration order.
    pub const ALL: [ArrowheadKind; 12] = [
        Self::None,
        Self::Arrow,
        Self::DoubleArrow,
        Self::TriangleOutline,
        Self::TriangleFilled,
        Self::DiamondOutline,
        Self::DiamondFilled,
        Self::BallOutline,
        Self::BallFilled,
        Self::Bar,
        Self::Cross,
        Self::Many,
    ];

    /// Returns the spelling used in the `arrow.start.type` and `arrow.end.type` props.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Arrow => "ARROW",
            Self::DoubleArrow => "DOUBLE_ARROW",
            Self::TriangleOutline => "TRIANGLE_OUTLINE",
            Self::TriangleFilled => "TRIANGLE_FILLED",
            Self::DiamondOutline => "DIAMOND_OUTLINE",
            Self::DiamondFilled => "DIAMOND_FILLED",
            Self::BallOutline => "BALL_OUTLINE",
            Self::BallFilled => "BALL_FILLED",
            Self::Bar => "BAR",
            Self::Cross => "CROSS",
            Self::Many => "MANY",
        }
    }
}

impl FromStr for ArrowheadKind {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownValue::new("arrowhead", s))
    }
}

impl fmt::Display for ArrowheadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal text alignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for TextAlign {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(UnknownValue::new("text alignment", s)),
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_pattern_from_str() {
        assert_eq!("solid".parse(), Ok(StrokePattern::Solid));
        assert_eq!("dashed".parse(), Ok(StrokePattern::Dashed));
        assert_eq!("dotted".parse(), Ok(StrokePattern::Dotted));
        assert!("dash-dot".parse::<StrokePattern>().is_err());
    }

    #[test]
    fn test_arrowhead_kind_display_matches_from_str() {
        for kind in ArrowheadKind::ALL {
            assert_eq!(kind.to_string().parse::<ArrowheadKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_arrowhead_kind_unknown() {
        let err = "arrow".parse::<ArrowheadKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown arrowhead value `arrow`");
    }

    #[test]
    fn test_text_align() {
        assert_eq!("right".parse(), Ok(TextAlign::Right));
        assert_eq!(TextAlign::default().to_string(), "center");
        assert!("justify".parse::<TextAlign>().is_err());
    }
}
