//! Reconciliation of a parse forest with a live document.
//!
//! [`Reconciler::reconcile`] maps the stateless parse forest onto the
//! identity-bearing elements of a [`Document`]: elements missing from the
//! text are removed, elements present in both are updated in place and new
//! elements are created. Everything runs in one [`UnitOfWork`], so a single
//! reconciliation is a single undo step.
//!
//! Edge endpoints and labels are resolved after the whole forest has been
//! walked. An edge may therefore refer to a node written further down.

use indexmap::IndexSet;
use log::{debug, info, trace};

use weft_core::{
    document::{
        DEFAULT_EDGE_STYLE, DEFAULT_STYLE, DEFAULT_TEXT_STYLE, Document, Edge, Element, Endpoint,
        LabelAttachment, LabelKind, Node,
    },
    geometry::Bounds,
    identifier::Id,
    props::{Merge, MergePolicy},
    unit_of_work::UnitOfWork,
};
use weft_parser::parser_types::{ParsedEdge, ParsedElement, ParsedNode, collect_ids};

use crate::{
    config::ReconcileConfig,
    placement::{AdjacentPlacement, Placement, PlacementOptions},
    session::Session,
};

/// What a reconciliation changed.
///
/// The added, updated and removed lists are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<Id>,
    pub updated: Vec<Id>,
    pub removed: Vec<Id>,
    /// Previously selected elements that no longer exist.
    pub deselected: Vec<Id>,
    /// Edges whose written endpoints name no node. Their endpoints were
    /// left as they were.
    pub unresolved: Vec<Id>,
}

impl ReconcileReport {
    /// Returns `true` when the document did not change.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Applies parse forests to documents.
pub struct Reconciler {
    config: ReconcileConfig,
    placement: Box<dyn Placement>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            placement: Box::new(AdjacentPlacement),
        }
    }

    /// Replaces the placement used for new top-level nodes.
    pub fn with_placement(mut self, placement: impl Placement + 'static) -> Self {
        self.placement = Box::new(placement);
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Brings `document` in line with `forest`.
    ///
    /// Never fails: endpoints that do not resolve to a node are left as they
    /// are, or free for new edges. When anything changed, one compound action
    /// is pushed to the session history.
    pub fn reconcile(
        &self,
        forest: &[ParsedElement],
        document: &mut Document,
        session: &mut Session,
    ) -> ReconcileReport {
        info!(elements = forest.len(), existing = document.len(); "Reconciling document");
        let parsed: IndexSet<Id> = collect_ids(forest).into_iter().collect();
        let selected_before: Vec<Id> = document.selection().iter().copied().collect();

        let mut uow = UnitOfWork::new(document);

        let stale: Vec<Id> = uow
            .document()
            .elements()
            .filter(|element| !element.is_label_node())
            .map(Element::id)
            .filter(|id| !parsed.contains(id))
            .collect();
        for id in stale {
            if uow.document().contains(id) {
                uow.remove(id);
            }
        }

        let mut pass = Pass {
            reconciler: self,
            uow,
            reference: session.last_placed(),
            pending: Vec::new(),
            unresolved: Vec::new(),
        };
        pass.walk(forest, None);
        pass.finish_edges();
        let Pass {
            uow,
            reference,
            unresolved,
            ..
        } = pass;
        session.set_last_placed(reference);

        let (changes, action) = uow.commit();

        let deselected: Vec<Id> = selected_before
            .into_iter()
            .filter(|id| !document.contains(*id))
            .collect();
        for id in &deselected {
            document.deselect(*id);
        }

        if changes.is_empty() {
            debug!("Document already matches the text");
        } else {
            session.history_mut().push(Box::new(action));
        }

        let report = ReconcileReport {
            added: changes.added,
            updated: changes.updated,
            removed: changes.removed,
            deselected,
            unresolved,
        };
        info!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            deselected = report.deselected.len();
            "Reconciled document"
        );
        report
    }

    /// Makes `text` the single label of an edge.
    ///
    /// With `Some(text)` the first existing label node is reused and any
    /// further label nodes are removed; without labels a new one is created
    /// over the edge with a perpendicular attachment. With `None` every label
    /// node is removed. Label nodes listed in `keep` are never removed.
    ///
    /// # Panics
    ///
    /// Panics when `edge_id` is not an edge of the document.
    pub fn upsert_label(
        &self,
        uow: &mut UnitOfWork<'_>,
        edge_id: Id,
        text: Option<&str>,
        keep: &[Id],
    ) {
        let Some(edge) = uow.document().edge(edge_id) else {
            panic!("label upsert on `{edge_id}`, which is not an edge");
        };
        let bounds = uow.document().edge_bounds(edge);
        let labels = uow.document().label_nodes(edge_id);

        let Some(text) = text else {
            for label in labels.into_iter().filter(|id| !keep.contains(id)) {
                uow.remove(label);
            }
            return;
        };

        let mut labels = labels.into_iter();
        match labels.next() {
            Some(first) => {
                if let Some(node) = uow.node_mut(first) {
                    if node.text != text {
                        node.text = text.to_string();
                    }
                }
                for extra in labels.filter(|id| !keep.contains(id)) {
                    uow.remove(extra);
                }
            }
            None => {
                let id = free_label_id(uow.document(), edge_id);
                let attachment =
                    LabelAttachment::new(LabelKind::Perpendicular, self.config.label_time_offset());
                trace!(edge:% = edge_id, label:% = id; "Creating edge label");
                uow.insert(Node::new_label(id, text, bounds, attachment), Some(edge_id));
            }
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// First `<edge>-label[-n]` ID not yet used in the document.
fn free_label_id(document: &Document, edge_id: Id) -> Id {
    let mut id = edge_id.derive("label");
    let mut n = 1;
    while document.contains(id) {
        id = edge_id.derive(&format!("label-{n}"));
        n += 1;
    }
    id
}

fn style_or(style: &Option<String>, default: &str) -> String {
    style.clone().unwrap_or_else(|| default.to_string())
}

/// Endpoint and label data applied once every node exists.
struct PendingEdge {
    id: Id,
    from: Option<Id>,
    to: Option<Id>,
    label: Option<String>,
    children: Vec<Id>,
}

/// State of one walk over the forest.
struct Pass<'r, 'd> {
    reconciler: &'r Reconciler,
    uow: UnitOfWork<'d>,
    reference: Option<Id>,
    pending: Vec<PendingEdge>,
    unresolved: Vec<Id>,
}

impl Pass<'_, '_> {
    /// Processes elements depth-first, parents before their children.
    fn walk(&mut self, elements: &[ParsedElement], parent: Option<Id>) {
        for element in elements {
            match element {
                ParsedElement::Node(node) => self.node(node, parent),
                ParsedElement::Edge(edge) => self.edge(edge, parent),
            }
            self.walk(element.children(), Some(element.id()));
        }
    }

    fn node(&mut self, parsed: &ParsedNode, parent: Option<Id>) {
        let id = parsed.common.id;
        // A generated label whose ID the text now uses elsewhere gives way.
        // Its edge gets a fresh label when edges are finished.
        let displaced = self
            .uow
            .document()
            .get(id)
            .is_some_and(|existing| existing.is_label_node() && existing.parent() != parent);
        if displaced {
            debug!(id:% = id; "Text reuses a label ID, replacing the label");
            self.uow.remove(id);
        }

        if self.uow.document().node(id).is_none() {
            let bounds = self.new_node_bounds(parent);
            trace!(id:% = id, x = bounds.min_x(), y = bounds.min_y(); "Creating node");
            self.uow.insert(Node::new(id, &parsed.shape, bounds), parent);
        }

        if let Some(node) = self.uow.node_mut(id) {
            node.shape.clone_from(&parsed.shape);
            node.text = parsed.name.clone().unwrap_or_default();
            node.props
                .merge(&parsed.common.props, MergePolicy::Override);
            node.metadata.overlay(&parsed.common.metadata);
            node.stylesheet = style_or(&parsed.common.stylesheet, DEFAULT_STYLE);
            node.text_stylesheet = style_or(&parsed.text_stylesheet, DEFAULT_TEXT_STYLE);
        }

        if parent.is_none() {
            self.reference = Some(id);
        }
    }

    fn edge(&mut self, parsed: &ParsedEdge, parent: Option<Id>) {
        let id = parsed.common.id;
        if self.uow.document().edge(id).is_none() {
            let config = &self.reconciler.config;
            trace!(id:% = id; "Creating edge");
            let edge = Edge::new(
                id,
                Endpoint::Free(config.free_start()),
                Endpoint::Free(config.free_end()),
            );
            self.uow.insert(edge, parent);
        }

        if let Some(edge) = self.uow.edge_mut(id) {
            edge.props
                .merge(&parsed.common.props, MergePolicy::Override);
            edge.metadata.overlay(&parsed.common.metadata);
            edge.stylesheet = style_or(&parsed.common.stylesheet, DEFAULT_EDGE_STYLE);
        }

        self.pending.push(PendingEdge {
            id,
            from: parsed.from,
            to: parsed.to,
            label: parsed.label.clone(),
            children: parsed.common.children.iter().map(ParsedElement::id).collect(),
        });
    }

    /// Bounds of a node the text creates.
    ///
    /// Nested nodes are centred in their parent. Top-level nodes go next to
    /// the placement reference, or to the centre of the viewport.
    fn new_node_bounds(&self, parent: Option<Id>) -> Bounds {
        let document = self.uow.document();
        let config = &self.reconciler.config;
        let size = config.node_size();

        if let Some(parent_bounds) = parent.and_then(|id| document.element_bounds(id)) {
            return Bounds::new_from_center(parent_bounds.center(), size);
        }

        let desired = Bounds::new_from_center(document.viewport().center(), size);
        let options = PlacementOptions {
            gap: config.placement_gap(),
            ..PlacementOptions::default()
        };
        self.reconciler
            .placement
            .place(desired, self.reference, document, &options)
    }

    fn finish_edges(&mut self) {
        for pending in std::mem::take(&mut self.pending) {
            if self.uow.document().edge(pending.id).is_none() {
                debug!(edge:% = pending.id; "Edge replaced while reconciling");
                continue;
            }

            let document = self.uow.document();
            let resolve = |id: Option<Id>| id.filter(|id| document.node(*id).is_some());
            let from = resolve(pending.from);
            let to = resolve(pending.to);
            if (pending.from.is_some() && from.is_none()) || (pending.to.is_some() && to.is_none()) {
                trace!(edge:% = pending.id; "Endpoint does not resolve to a node");
                self.unresolved.push(pending.id);
            }

            if let Some(edge) = self.uow.edge_mut(pending.id) {
                if let Some(from) = from {
                    edge.start = Endpoint::Connected(from);
                }
                if let Some(to) = to {
                    edge.end = Endpoint::Connected(to);
                }
            }

            self.reconciler.upsert_label(
                &mut self.uow,
                pending.id,
                pending.label.as_deref(),
                &pending.children,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use weft_parser::parse;

    use super::*;

    fn apply(source: &str, document: &mut Document, session: &mut Session) -> ReconcileReport {
        let output = parse(source);
        assert!(!output.has_errors(), "{:?}", output.errors);
        Reconciler::default().reconcile(&output.elements, document, session)
    }

    #[test]
    fn test_creates_nodes_and_edges() {
        let mut document = Document::default();
        let mut session = Session::new();
        let report = apply("a: rect \"A\"\nb: ellipse\ne: edge a --> b\n", &mut document, &mut session);

        assert_eq!(report.added.len(), 3);
        assert!(report.updated.is_empty());
        assert_eq!(document.node(Id::new("a")).unwrap().text, "A");
        let edge = document.edge(Id::new("e")).unwrap();
        assert_eq!(edge.start, Endpoint::Connected(Id::new("a")));
        assert_eq!(edge.end, Endpoint::Connected(Id::new("b")));
        assert_eq!(session.last_placed(), Some(Id::new("b")));
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn test_forward_reference_resolves() {
        let mut document = Document::default();
        let mut session = Session::new();
        let report = apply("e: edge a --> b\na: rect\nb: rect\n", &mut document, &mut session);
        assert!(report.unresolved.is_empty());
        let edge = document.edge(Id::new("e")).unwrap();
        assert_eq!(edge.end, Endpoint::Connected(Id::new("b")));
    }

    #[test]
    fn test_unresolved_endpoint_keeps_previous() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply("a: rect\nb: rect\ne: edge a --> b\n", &mut document, &mut session);
        let report = apply("a: rect\nb: rect\ne: edge a --> ghost\n", &mut document, &mut session);
        assert_eq!(report.unresolved, vec![Id::new("e")]);
        let edge = document.edge(Id::new("e")).unwrap();
        assert_eq!(edge.end, Endpoint::Connected(Id::new("b")));
    }

    #[test]
    fn test_new_edge_without_targets_uses_free_points() {
        let config = ReconcileConfig::default().with_free_points(
            weft_core::geometry::Point::new(1.0, 2.0),
            weft_core::geometry::Point::new(3.0, 4.0),
        );
        let output = parse("e: edge x --> y\n");
        let mut document = Document::default();
        Reconciler::new(config).reconcile(&output.elements, &mut document, &mut Session::new());

        let edge = document.edge(Id::new("e")).unwrap();
        assert_eq!(edge.start, Endpoint::Free(weft_core::geometry::Point::new(1.0, 2.0)));
        assert_eq!(edge.end, Endpoint::Free(weft_core::geometry::Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_nested_node_centred_in_parent() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply("outer: group {\n  inner: rect\n}\n", &mut document, &mut session);
        let outer = document.node(Id::new("outer")).unwrap();
        let inner = document.node(Id::new("inner")).unwrap();
        assert_eq!(outer.bounds.center(), inner.bounds.center());
        assert_eq!(document.get(Id::new("inner")).unwrap().parent(), Some(Id::new("outer")));
        assert_eq!(session.last_placed(), Some(Id::new("outer")));
    }

    #[test]
    fn test_first_node_centred_in_viewport() {
        let mut document = Document::default();
        apply("a: rect\n", &mut document, &mut Session::new());
        assert_eq!(
            document.node(Id::new("a")).unwrap().bounds.center(),
            document.viewport().center()
        );
    }

    #[test]
    fn test_update_merges_props_and_resets_style() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply(
            "a: rect {\n  stylesheet: warm\n  props: \"fill.color=red\"\n}\n",
            &mut document,
            &mut session,
        );
        let report = apply(
            "a: ellipse \"Hi\" {\n  props: \"stroke.color=blue\"\n}\n",
            &mut document,
            &mut session,
        );

        assert_eq!(report.updated, vec![Id::new("a")]);
        let node = document.node(Id::new("a")).unwrap();
        assert_eq!(node.shape, "ellipse");
        assert_eq!(node.text, "Hi");
        assert_eq!(node.props.fill.color.as_deref(), Some("red"));
        assert_eq!(node.props.stroke.color.as_deref(), Some("blue"));
        assert_eq!(node.stylesheet, DEFAULT_STYLE);
    }

    #[test]
    fn test_edge_label_lifecycle() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply("e: edge \"first\"\n", &mut document, &mut session);

        let labels = document.label_nodes(Id::new("e"));
        assert_eq!(labels, vec![Id::new("e-label")]);
        let label = document.node(labels[0]).unwrap();
        assert_eq!(label.text, "first");
        let attachment = label.label.unwrap();
        assert_eq!(attachment.kind, LabelKind::Perpendicular);
        assert_eq!(attachment.time_offset, 0.5);

        let report = apply("e: edge \"second\"\n", &mut document, &mut session);
        assert_eq!(report.updated, vec![Id::new("e-label")]);
        assert_eq!(document.node(Id::new("e-label")).unwrap().text, "second");

        let report = apply("e: edge\n", &mut document, &mut session);
        assert_eq!(report.removed, vec![Id::new("e-label")]);
        assert!(document.label_nodes(Id::new("e")).is_empty());
    }

    #[test]
    fn test_label_upsert_collapses_extra_labels() {
        let mut document = Document::default();
        let reconciler = Reconciler::default();
        let mut uow = UnitOfWork::new(&mut document);
        let edge = uow.insert(
            Edge::new(
                Id::new("e"),
                Endpoint::Free(Default::default()),
                Endpoint::Free(Default::default()),
            ),
            None,
        );
        for suffix in ["one", "two", "three"] {
            let attachment = LabelAttachment::new(LabelKind::Parallel, 0.2);
            uow.insert(
                Node::new_label(edge.derive(suffix), suffix, Bounds::default(), attachment),
                Some(edge),
            );
        }

        reconciler.upsert_label(&mut uow, edge, Some("only"), &[edge.derive("three")]);
        let labels = uow.document().label_nodes(edge);
        assert_eq!(labels, vec![edge.derive("one"), edge.derive("three")]);
        assert_eq!(uow.document().node(edge.derive("one")).unwrap().text, "only");
    }

    #[test]
    #[should_panic(expected = "not an edge")]
    fn test_label_upsert_on_node_panics() {
        let mut document = Document::default();
        let mut uow = UnitOfWork::new(&mut document);
        let node = uow.insert(Node::new(Id::new("n"), "rect", Bounds::default()), None);
        Reconciler::default().upsert_label(&mut uow, node, Some("x"), &[]);
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        fn source(nodes: &[(usize, usize)], edges: &[(usize, usize)]) -> String {
            let shapes = ["rect", "ellipse", "text"];
            let mut text = String::new();
            for (idx, shape) in nodes {
                text.push_str(&format!("n{idx}: {}\n", shapes[*shape]));
            }
            for (i, (from, to)) in edges.iter().enumerate() {
                text.push_str(&format!("e{i}: edge n{from} --> n{to} \"e{i}\"\n"));
            }
            text
        }

        proptest! {
            #[test]
            fn reconcile_twice_changes_nothing(
                nodes in prop::collection::btree_map(0usize..20, 0usize..3, 1..8),
                edges in prop::collection::vec((0usize..20, 0usize..20), 0..6),
            ) {
                let nodes: Vec<(usize, usize)> = nodes.into_iter().collect();
                let text = source(&nodes, &edges);
                let mut document = Document::default();
                let mut session = Session::new();

                apply(&text, &mut document, &mut session);
                let report = apply(&text, &mut document, &mut session);

                prop_assert!(report.is_empty(), "{:?}", report);
                prop_assert_eq!(session.history().undo_len(), 1);
            }

            #[test]
            fn undo_restores_previous_text(
                first in prop::collection::btree_map(0usize..10, 0usize..3, 1..6),
                second in prop::collection::btree_map(0usize..10, 0usize..3, 1..6),
            ) {
                let first: Vec<(usize, usize)> = first.into_iter().collect();
                let second: Vec<(usize, usize)> = second.into_iter().collect();
                prop_assume!(first != second);
                let mut document = Document::default();
                let mut session = Session::new();

                apply(&source(&first, &[]), &mut document, &mut session);
                let before = weft_parser::serialize::serialize(&document, document.roots());
                apply(&source(&second, &[]), &mut document, &mut session);

                session.undo(&mut document);
                let restored = weft_parser::serialize::serialize(&document, document.roots());
                prop_assert_eq!(restored, before);
            }
        }
    }

    #[test]
    fn test_node_takes_over_label_id() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply("e: edge \"caption\"\n", &mut document, &mut session);
        assert_eq!(document.label_nodes(Id::new("e")), vec![Id::new("e-label")]);

        apply(
            "e: edge \"caption\"\n\ne-label: rect \"Mine\"\n",
            &mut document,
            &mut session,
        );

        let mine = document.node(Id::new("e-label")).unwrap();
        assert_eq!(mine.text, "Mine");
        assert_eq!(mine.shape, "rect");
        assert!(mine.label.is_none());
        assert_eq!(document.roots(), &[Id::new("e"), Id::new("e-label")]);

        let labels = document.label_nodes(Id::new("e"));
        assert_eq!(labels, vec![Id::new("e-label-1")]);
        assert_eq!(document.node(labels[0]).unwrap().text, "caption");

        let text = weft_parser::serialize::serialize(&document, document.roots());
        assert_eq!(
            text,
            vec!["e: edge \"caption\"", "", "e-label: rect \"Mine\"", ""]
        );

        session.undo(&mut document);
        assert_eq!(document.roots(), &[Id::new("e")]);
        assert_eq!(document.label_nodes(Id::new("e")), vec![Id::new("e-label")]);
    }

    #[test]
    fn test_label_id_avoids_existing_elements() {
        let mut document = Document::default();
        let mut session = Session::new();
        apply("e-label: rect\ne: edge \"caption\"\n", &mut document, &mut session);
        assert_eq!(
            document.label_nodes(Id::new("e")),
            vec![Id::new("e-label-1")]
        );
        assert!(document.node(Id::new("e-label")).unwrap().label.is_none());
    }
}
