//! In-memory document graph.
//!
//! A [`Document`] owns every [`Element`] keyed by its [`Id`], the ordered list
//! of top-level elements, the visible area and the current selection.
//!
//! Reads go through the document directly. Mutations go through a
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork), which records the state of
//! every element it touches so the transaction can be undone as one step.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    props::{ElementProps, Metadata},
    unit_of_work::ChangeSet,
};

/// Style name assigned to nodes without an explicit stylesheet.
pub const DEFAULT_STYLE: &str = "default";
/// Text style name assigned to nodes without an explicit text stylesheet.
pub const DEFAULT_TEXT_STYLE: &str = "default-text";
/// Style name assigned to edges without an explicit stylesheet.
pub const DEFAULT_EDGE_STYLE: &str = "default-edge";

/// Shape tag given to label nodes created for edge captions.
pub const LABEL_SHAPE: &str = "text";

/// Returns `true` for the style names that are implied when none is written.
pub fn is_default_style(name: &str) -> bool {
    matches!(name, DEFAULT_STYLE | DEFAULT_TEXT_STYLE | DEFAULT_EDGE_STYLE)
}

/// Orientation of a label relative to the edge it captions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelKind {
    #[default]
    Perpendicular,
    Parallel,
}

/// Attaches a node to its parent edge as a caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAttachment {
    pub kind: LabelKind,
    /// Position along the edge, `0.0` at the start and `1.0` at the end.
    pub time_offset: f32,
    pub offset: Point,
}

impl LabelAttachment {
    pub fn new(kind: LabelKind, time_offset: f32) -> Self {
        Self {
            kind,
            time_offset,
            offset: Point::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    pub bounds: Bounds,
    pub shape: String,
    pub text: String,
    pub props: ElementProps,
    pub metadata: Metadata,
    pub stylesheet: String,
    pub text_stylesheet: String,
    pub label: Option<LabelAttachment>,
    children: Vec<Id>,
    parent: Option<Id>,
}

impl Node {
    pub fn new(id: Id, shape: &str, bounds: Bounds) -> Self {
        Self {
            id,
            bounds,
            shape: shape.to_string(),
            text: String::new(),
            props: ElementProps::default(),
            metadata: Metadata::default(),
            stylesheet: DEFAULT_STYLE.to_string(),
            text_stylesheet: DEFAULT_TEXT_STYLE.to_string(),
            label: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Creates a caption node for an edge.
    pub fn new_label(id: Id, text: &str, bounds: Bounds, attachment: LabelAttachment) -> Self {
        let mut node = Self::new(id, LABEL_SHAPE, bounds);
        node.text = text.to_string();
        node.label = Some(attachment);
        node
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn is_label(&self) -> bool {
        self.label.is_some()
    }
}

/// One end of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Connected(Id),
    Free(Point),
}

impl Endpoint {
    pub fn connected_id(&self) -> Option<Id> {
        match self {
            Self::Connected(id) => Some(*id),
            Self::Free(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: Id,
    pub start: Endpoint,
    pub end: Endpoint,
    pub props: ElementProps,
    pub metadata: Metadata,
    pub stylesheet: String,
    children: Vec<Id>,
    parent: Option<Id>,
}

impl Edge {
    pub fn new(id: Id, start: Endpoint, end: Endpoint) -> Self {
        Self {
            id,
            start,
            end,
            props: ElementProps::default(),
            metadata: Metadata::default(),
            stylesheet: DEFAULT_EDGE_STYLE.to_string(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(Node),
    Edge(Edge),
}

impl Element {
    pub fn id(&self) -> Id {
        match self {
            Self::Node(node) => node.id,
            Self::Edge(edge) => edge.id,
        }
    }

    pub fn children(&self) -> &[Id] {
        match self {
            Self::Node(node) => &node.children,
            Self::Edge(edge) => &edge.children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Id> {
        match self {
            Self::Node(node) => &mut node.children,
            Self::Edge(edge) => &mut edge.children,
        }
    }

    pub fn parent(&self) -> Option<Id> {
        match self {
            Self::Node(node) => node.parent,
            Self::Edge(edge) => edge.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Id>) {
        match self {
            Self::Node(node) => node.parent = parent,
            Self::Edge(edge) => edge.parent = parent,
        }
    }

    pub fn props(&self) -> &ElementProps {
        match self {
            Self::Node(node) => &node.props,
            Self::Edge(edge) => &edge.props,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Node(node) => &node.metadata,
            Self::Edge(edge) => &edge.metadata,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Self::Node(_) => None,
            Self::Edge(edge) => Some(edge),
        }
    }

    pub fn is_label_node(&self) -> bool {
        self.as_node().is_some_and(Node::is_label)
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Edge> for Element {
    fn from(edge: Edge) -> Self {
        Self::Edge(edge)
    }
}

/// Callback invoked with the classified changes of each committed transaction.
pub type ChangeListener = Box<dyn Fn(&ChangeSet)>;

/// Owner of all diagram elements.
pub struct Document {
    elements: IndexMap<Id, Element>,
    roots: Vec<Id>,
    viewport: Bounds,
    selection: IndexSet<Id>,
    listeners: Vec<ChangeListener>,
}

impl Document {
    /// Creates an empty document showing `viewport`.
    pub fn new(viewport: Bounds) -> Self {
        Self {
            elements: IndexMap::new(),
            roots: Vec::new(),
            viewport,
            selection: IndexSet::new(),
            listeners: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = viewport;
    }

    pub fn get(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.get(id).and_then(Element::as_node)
    }

    pub fn edge(&self, id: Id) -> Option<&Edge> {
        self.get(id).and_then(Element::as_edge)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over every element in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Returns the top-level elements in document order.
    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    /// Returns the label nodes attached to `edge_id`, in child order.
    pub fn label_nodes(&self, edge_id: Id) -> Vec<Id> {
        self.get(edge_id)
            .map(|element| {
                element
                    .children()
                    .iter()
                    .copied()
                    .filter(|child| self.get(*child).is_some_and(Element::is_label_node))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `id` followed by all of its descendants, depth-first.
    pub fn subtree(&self, id: Id) -> Vec<Id> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(element) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(element.children().iter().rev().copied());
        }
        out
    }

    /// Resolves an endpoint to a point, using the centre of a connected node.
    pub fn endpoint_position(&self, endpoint: &Endpoint) -> Option<Point> {
        match endpoint {
            Endpoint::Connected(id) => self.node(*id).map(|node| node.bounds.center()),
            Endpoint::Free(point) => Some(*point),
        }
    }

    /// Returns the rectangle spanned by the two ends of an edge.
    pub fn edge_bounds(&self, edge: &Edge) -> Bounds {
        match (
            self.endpoint_position(&edge.start),
            self.endpoint_position(&edge.end),
        ) {
            (Some(start), Some(end)) => Bounds::from_points(start, end),
            (Some(point), None) | (None, Some(point)) => point.to_bounds(Size::default()),
            (None, None) => Bounds::default(),
        }
    }

    /// Returns the bounds of any element.
    pub fn element_bounds(&self, id: Id) -> Option<Bounds> {
        match self.get(id)? {
            Element::Node(node) => Some(node.bounds),
            Element::Edge(edge) => Some(self.edge_bounds(edge)),
        }
    }

    pub fn selection(&self) -> &IndexSet<Id> {
        &self.selection
    }

    /// Adds an existing element to the selection.
    pub fn select(&mut self, id: Id) -> bool {
        self.contains(id) && self.selection.insert(id)
    }

    pub fn deselect(&mut self, id: Id) -> bool {
        self.selection.shift_remove(&id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Registers a callback notified after every committed change.
    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub(crate) fn notify(&self, changes: &ChangeSet) {
        for listener in &self.listeners {
            listener(changes);
        }
    }

    pub(crate) fn get_mut(&mut self, id: Id) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Writes a stored element state back, or deletes the element for `None`.
    pub(crate) fn restore(&mut self, id: Id, state: Option<Element>) {
        match state {
            Some(element) => {
                self.elements.insert(id, element);
            }
            None => {
                self.elements.shift_remove(&id);
                self.selection.shift_remove(&id);
            }
        }
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<Id> {
        &mut self.roots
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<Id>) {
        self.roots = roots;
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.elements)
            .field("roots", &self.roots)
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Bounds::new_from_top_left(
            Point::default(),
            Size::new(1000.0, 800.0),
        ))
    }
}
