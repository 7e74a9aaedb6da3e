//! Typed element properties and free-form metadata.
//!
//! [`ElementProps`] is a fixed schema of optional values grouped by concern
//! (fill, stroke, arrowheads, text) plus an open `custom` map. Every field is
//! optional so that a props value can describe a partial overlay, which is
//! applied with [`Merge::merge`].
//!
//! Both props and [`Metadata`] have a one-line textual form used by the
//! diagram language:
//!
//! ```text
//! props: "fill.color=#ff0000;stroke.width=2;arrow.end.type=ARROW"
//! metadata: "owner=infra;tier=gold"
//! ```

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::decoration::{ArrowheadKind, StrokePattern, TextAlign};

/// How [`Merge::merge`] resolves a field set on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Values from the incoming side replace existing ones.
    Override,
    /// Existing values are kept; the incoming side only fills gaps.
    KeepExisting,
}

/// Field-by-field deep merge of a partial value into another.
pub trait Merge {
    fn merge(&mut self, other: &Self, policy: MergePolicy);
}

fn merge_field<T: Clone>(target: &mut Option<T>, incoming: &Option<T>, policy: MergePolicy) {
    let Some(value) = incoming else {
        return;
    };
    if policy == MergePolicy::Override || target.is_none() {
        *target = Some(value.clone());
    }
}

/// Errors raised while assigning a single `key=value` pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropsError {
    #[error("unknown property `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for property `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("malformed pair `{0}`, expected `key=value`")]
    MalformedPair(String),
}

impl PropsError {
    fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillProps {
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeProps {
    pub color: Option<String>,
    pub width: Option<f32>,
    pub pattern: Option<StrokePattern>,
}

/// Arrowhead settings for one end of an edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrowEndProps {
    /// Written as `type` in the textual form.
    pub kind: Option<ArrowheadKind>,
    pub size: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrowProps {
    pub start: ArrowEndProps,
    pub end: ArrowEndProps,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProps {
    pub color: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub align: Option<TextAlign>,
}

/// Visual properties of a node or edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementProps {
    pub fill: FillProps,
    pub stroke: StrokeProps,
    pub arrow: ArrowProps,
    pub text: TextProps,
    pub custom: IndexMap<String, String>,
}

impl Merge for FillProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        merge_field(&mut self.color, &other.color, policy);
    }
}

impl Merge for StrokeProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        merge_field(&mut self.color, &other.color, policy);
        merge_field(&mut self.width, &other.width, policy);
        merge_field(&mut self.pattern, &other.pattern, policy);
    }
}

impl Merge for ArrowEndProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        merge_field(&mut self.kind, &other.kind, policy);
        merge_field(&mut self.size, &other.size, policy);
    }
}

impl Merge for ArrowProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        self.start.merge(&other.start, policy);
        self.end.merge(&other.end, policy);
    }
}

impl Merge for TextProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        merge_field(&mut self.color, &other.color, policy);
        merge_field(&mut self.font, &other.font, policy);
        merge_field(&mut self.font_size, &other.font_size, policy);
        merge_field(&mut self.bold, &other.bold, policy);
        merge_field(&mut self.italic, &other.italic, policy);
        merge_field(&mut self.align, &other.align, policy);
    }
}

impl Merge for ElementProps {
    fn merge(&mut self, other: &Self, policy: MergePolicy) {
        self.fill.merge(&other.fill, policy);
        self.stroke.merge(&other.stroke, policy);
        self.arrow.merge(&other.arrow, policy);
        self.text.merge(&other.text, policy);
        for (key, value) in &other.custom {
            match policy {
                MergePolicy::Override => {
                    self.custom.insert(key.clone(), value.clone());
                }
                MergePolicy::KeepExisting => {
                    self.custom
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, PropsError> {
    value.parse().map_err(|_| PropsError::invalid(key, value))
}

impl ElementProps {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Assigns a single value addressed by its dotted key path.
    ///
    /// # Errors
    ///
    /// Returns [`PropsError::UnknownKey`] for a path outside the schema and
    /// [`PropsError::InvalidValue`] when the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PropsError> {
        if let Some(name) = key.strip_prefix("custom.") {
            if name.is_empty() {
                return Err(PropsError::UnknownKey(key.to_string()));
            }
            self.custom.insert(name.to_string(), value.to_string());
            return Ok(());
        }

        match key {
            "fill.color" => self.fill.color = Some(value.to_string()),
            "stroke.color" => self.stroke.color = Some(value.to_string()),
            "stroke.width" => self.stroke.width = Some(parse_value(key, value)?),
            "stroke.pattern" => self.stroke.pattern = Some(parse_value(key, value)?),
            "arrow.start.type" => self.arrow.start.kind = Some(parse_value(key, value)?),
            "arrow.start.size" => self.arrow.start.size = Some(parse_value(key, value)?),
            "arrow.end.type" => self.arrow.end.kind = Some(parse_value(key, value)?),
            "arrow.end.size" => self.arrow.end.size = Some(parse_value(key, value)?),
            "text.color" => self.text.color = Some(value.to_string()),
            "text.font" => self.text.font = Some(value.to_string()),
            "text.font_size" => self.text.font_size = Some(parse_value(key, value)?),
            "text.bold" => self.text.bold = Some(parse_value(key, value)?),
            "text.italic" => self.text.italic = Some(parse_value(key, value)?),
            "text.align" => self.text.align = Some(parse_value(key, value)?),
            _ => return Err(PropsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Parses the `key=value;key=value` form, skipping pairs that fail.
    pub fn parse_lenient(text: &str) -> Self {
        let mut props = Self::default();
        for (key, value) in split_pairs(text) {
            let result = match value {
                Some(value) => props.set(key, value),
                None => Err(PropsError::MalformedPair(key.to_string())),
            };
            if let Err(err) = result {
                debug!(pair = key, err:% = err; "Skipping props pair");
            }
        }
        props
    }

    /// Flattens the set fields into `(key, value)` pairs in schema order.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn push<T: fmt::Display>(out: &mut Vec<(String, String)>, key: &str, value: &Option<T>) {
            if let Some(value) = value {
                out.push((key.to_string(), value.to_string()));
            }
        }

        let mut out = Vec::new();
        push(&mut out, "fill.color", &self.fill.color);
        push(&mut out, "stroke.color", &self.stroke.color);
        push(&mut out, "stroke.width", &self.stroke.width);
        push(&mut out, "stroke.pattern", &self.stroke.pattern);
        push(&mut out, "arrow.start.type", &self.arrow.start.kind);
        push(&mut out, "arrow.start.size", &self.arrow.start.size);
        push(&mut out, "arrow.end.type", &self.arrow.end.kind);
        push(&mut out, "arrow.end.size", &self.arrow.end.size);
        push(&mut out, "text.color", &self.text.color);
        push(&mut out, "text.font", &self.text.font);
        push(&mut out, "text.font_size", &self.text.font_size);
        push(&mut out, "text.bold", &self.text.bold);
        push(&mut out, "text.italic", &self.text.italic);
        push(&mut out, "text.align", &self.text.align);
        for (name, value) in &self.custom {
            out.push((format!("custom.{name}"), value.clone()));
        }
        out
    }
}

impl fmt::Display for ElementProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.entries().iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Ordered free-form string attributes attached to an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(IndexMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `key=value;key=value` form, skipping malformed pairs.
    pub fn parse_lenient(text: &str) -> Self {
        let mut metadata = Self::new();
        for (key, value) in split_pairs(text) {
            match value {
                Some(value) if !key.is_empty() => metadata.insert(key, value),
                _ => debug!(pair = key; "Skipping metadata pair"),
            }
        }
        metadata
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Assigns every key of `other`, keeping keys only present here.
    pub fn overlay(&mut self, other: &Metadata) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.iter())
    }
}

fn split_pairs(text: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    text.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (pair, None),
        })
}

fn write_pairs<'a>(
    f: &mut fmt::Formatter<'_>,
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> fmt::Result {
    for (idx, (key, value)) in pairs.enumerate() {
        if idx > 0 {
            f.write_str(";")?;
        }
        write!(f, "{key}={value}")?;
    }
    Ok(())
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn props_strategy() -> impl Strategy<Value = ElementProps> {
        (
            proptest::option::of("[a-z]{1,6}"),
            proptest::option::of(1u8..8),
            proptest::option::of(proptest::sample::select(ArrowheadKind::ALL.to_vec())),
            proptest::option::of(any::<bool>()),
            proptest::collection::vec(("[a-z]{1,4}", "[a-z0-9]{1,4}"), 0..3),
        )
            .prop_map(|(color, width, kind, bold, custom)| {
                let mut props = ElementProps::default();
                props.fill.color = color;
                props.stroke.width = width.map(f32::from);
                props.arrow.end.kind = kind;
                props.text.bold = bold;
                props.custom = custom.into_iter().collect();
                props
            })
    }

    proptest! {
        #[test]
        fn merging_empty_is_identity(props in props_strategy()) {
            let mut merged = props.clone();
            merged.merge(&ElementProps::default(), MergePolicy::Override);
            prop_assert_eq!(&merged, &props);
        }

        #[test]
        fn merge_is_idempotent(base in props_strategy(), overlay in props_strategy()) {
            let mut once = base.clone();
            once.merge(&overlay, MergePolicy::Override);
            let mut twice = once.clone();
            twice.merge(&overlay, MergePolicy::Override);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn keep_existing_never_changes_set_fields(base in props_strategy(), overlay in props_strategy()) {
            let mut merged = base.clone();
            merged.merge(&overlay, MergePolicy::KeepExisting);
            let mut check = merged.clone();
            check.merge(&base, MergePolicy::Override);
            prop_assert_eq!(check, merged);
        }

        #[test]
        fn text_form_reparses(props in props_strategy()) {
            let reparsed = ElementProps::parse_lenient(&props.to_string());
            prop_assert_eq!(reparsed, props);
        }
    }
}
