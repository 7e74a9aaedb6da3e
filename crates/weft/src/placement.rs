//! Placement of nodes that text creates without a position.
//!
//! The [`Placement`] trait picks bounds for a new node next to a reference
//! node. [`AdjacentPlacement`] tries the four sides of the reference and then
//! steps to the right until the new node overlaps no top-level node.

use log::trace;

use weft_core::{
    document::{Document, Element},
    geometry::{Bounds, Point},
    identifier::Id,
};

/// Tuning values for a placement call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOptions {
    /// Space kept between the reference and the placed node.
    pub gap: f32,
    /// Maximum number of steps taken to the right once every side is taken.
    pub max_steps: usize,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            gap: 40.0,
            max_steps: 64,
        }
    }
}

pub trait Placement {
    /// Returns the bounds for a node of `desired` size.
    ///
    /// Without a usable `reference` the desired bounds are returned as is.
    fn place(
        &self,
        desired: Bounds,
        reference: Option<Id>,
        document: &Document,
        options: &PlacementOptions,
    ) -> Bounds;
}

/// Places nodes beside the reference: right, below, left, then above.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdjacentPlacement;

impl AdjacentPlacement {
    fn overlaps_top_level(document: &Document, candidate: &Bounds) -> bool {
        document
            .roots()
            .iter()
            .filter_map(|id| document.get(*id).and_then(Element::as_node))
            .any(|node| node.bounds.intersects(candidate))
    }
}

impl Placement for AdjacentPlacement {
    fn place(
        &self,
        desired: Bounds,
        reference: Option<Id>,
        document: &Document,
        options: &PlacementOptions,
    ) -> Bounds {
        let Some(anchor) = reference.and_then(|id| document.node(id)).map(|n| n.bounds) else {
            return desired;
        };

        let size = desired.to_size();
        let gap = options.gap;
        let center = anchor.center();
        let half_w = (anchor.width() + size.width()) / 2.0 + gap;
        let half_h = (anchor.height() + size.height()) / 2.0 + gap;

        let sides = [
            Point::new(center.x() + half_w, center.y()),
            Point::new(center.x(), center.y() + half_h),
            Point::new(center.x() - half_w, center.y()),
            Point::new(center.x(), center.y() - half_h),
        ];
        for side in sides {
            let candidate = Bounds::new_from_center(side, size);
            if !Self::overlaps_top_level(document, &candidate) {
                trace!(x = side.x(), y = side.y(); "Placed beside reference");
                return candidate;
            }
        }

        let step = Point::new(size.width() + gap, 0.0);
        let mut candidate = Bounds::new_from_center(sides[0], size);
        for _ in 0..options.max_steps {
            candidate = candidate.translate(step);
            if !Self::overlaps_top_level(document, &candidate) {
                break;
            }
        }
        trace!(x = candidate.min_x(), y = candidate.min_y(); "Placed right of occupied sides");
        candidate
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use weft_core::{document::Node, geometry::Size, unit_of_work::UnitOfWork};

    use super::*;

    fn size() -> Size {
        Size::new(100.0, 50.0)
    }

    fn doc_with(nodes: &[(&str, Point)]) -> Document {
        let mut document = Document::default();
        let mut uow = UnitOfWork::new(&mut document);
        for (id, center) in nodes {
            uow.insert(
                Node::new(Id::new(id), "rect", Bounds::new_from_center(*center, size())),
                None,
            );
        }
        uow.commit();
        document
    }

    fn place(document: &Document, reference: Option<&str>) -> Bounds {
        AdjacentPlacement.place(
            Bounds::new_from_center(Point::default(), size()),
            reference.map(Id::new),
            document,
            &PlacementOptions {
                gap: 10.0,
                max_steps: 8,
            },
        )
    }

    #[test]
    fn test_without_reference_keeps_desired() {
        let document = doc_with(&[]);
        let bounds = place(&document, None);
        assert!(approx_eq!(f32, bounds.center().x(), 0.0));
        let bounds = place(&document, Some("missing"));
        assert!(approx_eq!(f32, bounds.center().y(), 0.0));
    }

    #[test]
    fn test_prefers_right_side() {
        let document = doc_with(&[("a", Point::new(200.0, 200.0))]);
        let bounds = place(&document, Some("a"));
        assert!(approx_eq!(f32, bounds.center().x(), 310.0));
        assert!(approx_eq!(f32, bounds.center().y(), 200.0));
    }

    #[test]
    fn test_falls_back_to_below() {
        let document = doc_with(&[
            ("a", Point::new(200.0, 200.0)),
            ("right", Point::new(310.0, 200.0)),
        ]);
        let bounds = place(&document, Some("a"));
        assert!(approx_eq!(f32, bounds.center().x(), 200.0));
        assert!(approx_eq!(f32, bounds.center().y(), 260.0));
    }

    #[test]
    fn test_steps_right_when_surrounded() {
        let document = doc_with(&[
            ("a", Point::new(200.0, 200.0)),
            ("r", Point::new(310.0, 200.0)),
            ("b", Point::new(200.0, 260.0)),
            ("l", Point::new(90.0, 200.0)),
            ("t", Point::new(200.0, 140.0)),
        ]);
        let bounds = place(&document, Some("a"));
        assert!(approx_eq!(f32, bounds.center().x(), 420.0));
        assert!(approx_eq!(f32, bounds.center().y(), 200.0));
        assert!(!AdjacentPlacement::overlaps_top_level(&document, &bounds));
    }
}
