//! Configuration types for Weft documents and reconciliation.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources such as a TOML file. Every field is optional in the
//! serialized form and falls back to the defaults documented on it.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`DocumentConfig`] - Settings of a freshly created document.
//! - [`ReconcileConfig`] - Sizes and fallbacks used when text creates elements.
//!
//! # Example
//!
//! ```
//! # use weft::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.reconcile().label_time_offset(), 0.5);
//! ```

use serde::Deserialize;

use weft_core::geometry::{Bounds, Point, Size};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Document configuration section.
    #[serde(default)]
    document: DocumentConfig,

    /// Reconciliation configuration section.
    #[serde(default)]
    reconcile: ReconcileConfig,
}

impl AppConfig {
    pub fn new(document: DocumentConfig, reconcile: ReconcileConfig) -> Self {
        Self {
            document,
            reconcile,
        }
    }

    /// Returns the document configuration.
    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }

    /// Returns the reconciliation configuration.
    pub fn reconcile(&self) -> &ReconcileConfig {
        &self.reconcile
    }
}

/// Settings of a freshly created document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Size of the visible area, anchored at the origin. Defaults to 1000x800.
    #[serde(default = "default_viewport")]
    viewport: Size,
}

fn default_viewport() -> Size {
    Size::new(1000.0, 800.0)
}

impl DocumentConfig {
    pub fn new(viewport: Size) -> Self {
        Self { viewport }
    }

    /// Returns the visible area as bounds.
    pub fn viewport(&self) -> Bounds {
        Bounds::new_from_top_left(Point::default(), self.viewport)
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
        }
    }
}

/// Sizes and fallbacks used when reconciliation creates elements.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Size of a node created from text. Defaults to 120x60.
    #[serde(default = "default_node_size")]
    node_size: Size,

    /// Space kept between a new node and its placement reference. Defaults to 40.
    #[serde(default = "default_placement_gap")]
    placement_gap: f32,

    /// Position of an unresolved edge start.
    #[serde(default)]
    free_start: Point,

    /// Position of an unresolved edge end. Defaults to (100, 100).
    #[serde(default = "default_free_end")]
    free_end: Point,

    /// Position of new edge labels along their edge. Defaults to 0.5.
    #[serde(default = "default_label_time_offset")]
    label_time_offset: f32,
}

fn default_node_size() -> Size {
    Size::new(120.0, 60.0)
}

fn default_placement_gap() -> f32 {
    40.0
}

fn default_free_end() -> Point {
    Point::new(100.0, 100.0)
}

fn default_label_time_offset() -> f32 {
    0.5
}

impl ReconcileConfig {
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn placement_gap(&self) -> f32 {
        self.placement_gap
    }

    pub fn free_start(&self) -> Point {
        self.free_start
    }

    pub fn free_end(&self) -> Point {
        self.free_end
    }

    pub fn label_time_offset(&self) -> f32 {
        self.label_time_offset
    }

    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    pub fn with_placement_gap(mut self, gap: f32) -> Self {
        self.placement_gap = gap;
        self
    }

    pub fn with_free_points(mut self, start: Point, end: Point) -> Self {
        self.free_start = start;
        self.free_end = end;
        self
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            node_size: default_node_size(),
            placement_gap: default_placement_gap(),
            free_start: Point::default(),
            free_end: default_free_end(),
            label_time_offset: default_label_time_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.document().viewport().width(), 1000.0);
        assert_eq!(config.reconcile().node_size(), Size::new(120.0, 60.0));
        assert_eq!(config.reconcile().free_end(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [document]
            viewport = { width = 640.0, height = 480.0 }

            [reconcile]
            placement_gap = 10.0
            free_start = { x = -5.0, y = 5.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.document().viewport().height(), 480.0);
        assert_eq!(config.reconcile().placement_gap(), 10.0);
        assert_eq!(config.reconcile().free_start(), Point::new(-5.0, 5.0));
        assert_eq!(config.reconcile().label_time_offset(), 0.5);
    }
}
