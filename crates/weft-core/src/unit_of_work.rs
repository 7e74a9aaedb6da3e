//! Transactions over a [`Document`].
//!
//! A [`UnitOfWork`] borrows the document mutably for the whole transaction.
//! The first time an element is touched its previous state is recorded; at
//! [`UnitOfWork::commit`] every touched element is compared with that
//! snapshot to classify it as added, updated or removed. Elements that end up
//! identical to their snapshot are not reported, so re-applying the same edit
//! produces an empty [`ChangeSet`].

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    document::{Document, Edge, Element, Endpoint, Node},
    geometry::Point,
    history::UndoableAction,
    identifier::Id,
};

/// Element IDs affected by a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<Id>,
    pub updated: Vec<Id>,
    pub removed: Vec<Id>,
    pub roots_changed: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty() && !self.roots_changed
    }

    /// Returns the change set describing the reverse transaction.
    pub fn inverted(&self) -> Self {
        Self {
            added: self.removed.clone(),
            updated: self.updated.clone(),
            removed: self.added.clone(),
            roots_changed: self.roots_changed,
        }
    }
}

/// Mutable view of a [`Document`] that records what it changes.
pub struct UnitOfWork<'a> {
    document: &'a mut Document,
    before: IndexMap<Id, Option<Element>>,
    roots_before: Vec<Id>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        let roots_before = document.roots().to_vec();
        Self {
            document,
            before: IndexMap::new(),
            roots_before,
        }
    }

    /// Read access to the document in its current, uncommitted state.
    pub fn document(&self) -> &Document {
        self.document
    }

    fn touch(&mut self, id: Id) {
        if !self.before.contains_key(&id) {
            let state = self.document.get(id).cloned();
            self.before.insert(id, state);
        }
    }

    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.document.node(id)?;
        self.touch(id);
        match self.document.get_mut(id) {
            Some(Element::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn edge_mut(&mut self, id: Id) -> Option<&mut Edge> {
        self.document.edge(id)?;
        self.touch(id);
        match self.document.get_mut(id) {
            Some(Element::Edge(edge)) => Some(edge),
            _ => None,
        }
    }

    /// Inserts a new element as the last child of `parent`, or as the last
    /// top-level element when `parent` is `None` or does not exist.
    ///
    /// An existing element with the same ID is removed first.
    pub fn insert(&mut self, element: impl Into<Element>, parent: Option<Id>) -> Id {
        let mut element = element.into();
        let id = element.id();
        if self.document.contains(id) {
            self.remove(id);
        }

        let parent = parent.filter(|parent| self.document.contains(*parent));
        self.touch(id);
        element.set_parent(parent);
        element.children_mut().clear();

        match parent {
            Some(parent) => {
                self.touch(parent);
                if let Some(parent) = self.document.get_mut(parent) {
                    parent.children_mut().push(id);
                }
            }
            None => self.document.roots_mut().push(id),
        }
        self.document.restore(id, Some(element));
        id
    }

    /// Removes an element together with its descendants.
    ///
    /// Edges outside the removed subtree that were connected to a removed
    /// node keep their geometry: the endpoint becomes free at the node's
    /// centre. Returns the removed IDs, the element itself first.
    pub fn remove(&mut self, id: Id) -> Vec<Id> {
        let subtree = self.document.subtree(id);
        if subtree.is_empty() {
            return subtree;
        }

        let centers: HashMap<Id, Point> = subtree
            .iter()
            .filter_map(|id| self.document.node(*id).map(|node| (*id, node.bounds.center())))
            .collect();
        let detach = |endpoint: &Endpoint| match endpoint {
            Endpoint::Connected(node) => centers.get(node).map(|center| Endpoint::Free(*center)),
            Endpoint::Free(_) => None,
        };
        let dangling: Vec<(Id, Option<Endpoint>, Option<Endpoint>)> = self
            .document
            .elements()
            .filter_map(Element::as_edge)
            .filter(|edge| !subtree.contains(&edge.id()))
            .map(|edge| (edge.id(), detach(&edge.start), detach(&edge.end)))
            .filter(|(_, start, end)| start.is_some() || end.is_some())
            .collect();
        for (edge_id, start, end) in dangling {
            if let Some(edge) = self.edge_mut(edge_id) {
                if let Some(start) = start {
                    edge.start = start;
                }
                if let Some(end) = end {
                    edge.end = end;
                }
            }
        }

        match self.document.get(id).and_then(Element::parent) {
            Some(parent) if self.document.contains(parent) => {
                self.touch(parent);
                if let Some(parent) = self.document.get_mut(parent) {
                    parent.children_mut().retain(|child| *child != id);
                }
            }
            _ => self.document.roots_mut().retain(|root| *root != id),
        }

        for removed in &subtree {
            self.touch(*removed);
            self.document.restore(*removed, None);
        }
        trace!(id:% = id, count = subtree.len(); "Removed subtree");
        subtree
    }

    /// Finishes the transaction.
    ///
    /// Listeners registered on the document are notified once when anything
    /// changed. The returned action undoes and redoes the whole transaction.
    pub fn commit(self) -> (ChangeSet, CompoundAction) {
        let mut changes = ChangeSet::default();
        let mut remove = RemoveAction::default();
        let mut add = AddAction::default();
        let mut update = UpdateAction::default();

        for (id, before) in self.before {
            let after = self.document.get(id).cloned();
            match (before, after) {
                (None, Some(after)) => {
                    changes.added.push(id);
                    add.elements.push(after);
                }
                (Some(before), None) => {
                    changes.removed.push(id);
                    remove.elements.push(before);
                }
                (Some(before), Some(after)) if before != after => {
                    changes.updated.push(id);
                    update.before.push(before);
                    update.after.push(after);
                }
                _ => {}
            }
        }

        let roots_after = self.document.roots().to_vec();
        changes.roots_changed = roots_after != self.roots_before;

        debug!(
            added = changes.added.len(),
            updated = changes.updated.len(),
            removed = changes.removed.len();
            "Committed unit of work"
        );
        if !changes.is_empty() {
            self.document.notify(&changes);
        }

        let action = CompoundAction {
            description: "Edit diagram".to_string(),
            actions: vec![Box::new(remove), Box::new(add), Box::new(update)],
            roots_before: self.roots_before,
            roots_after,
            changes: changes.clone(),
        };
        (changes, action)
    }
}

/// Re-creates or deletes elements that a transaction removed.
#[derive(Debug, Default)]
pub struct RemoveAction {
    elements: Vec<Element>,
}

impl UndoableAction for RemoveAction {
    fn description(&self) -> &str {
        "Remove elements"
    }

    fn undo(&self, document: &mut Document) {
        for element in &self.elements {
            document.restore(element.id(), Some(element.clone()));
        }
    }

    fn redo(&self, document: &mut Document) {
        for element in &self.elements {
            document.restore(element.id(), None);
        }
    }
}

/// Deletes or re-creates elements that a transaction added.
#[derive(Debug, Default)]
pub struct AddAction {
    elements: Vec<Element>,
}

impl UndoableAction for AddAction {
    fn description(&self) -> &str {
        "Add elements"
    }

    fn undo(&self, document: &mut Document) {
        for element in &self.elements {
            document.restore(element.id(), None);
        }
    }

    fn redo(&self, document: &mut Document) {
        for element in &self.elements {
            document.restore(element.id(), Some(element.clone()));
        }
    }
}

/// Swaps element snapshots taken before and after a transaction.
#[derive(Debug, Default)]
pub struct UpdateAction {
    before: Vec<Element>,
    after: Vec<Element>,
}

impl UndoableAction for UpdateAction {
    fn description(&self) -> &str {
        "Update elements"
    }

    fn undo(&self, document: &mut Document) {
        for element in &self.before {
            document.restore(element.id(), Some(element.clone()));
        }
    }

    fn redo(&self, document: &mut Document) {
        for element in &self.after {
            document.restore(element.id(), Some(element.clone()));
        }
    }
}

/// A whole transaction as one undoable step.
#[derive(Debug)]
pub struct CompoundAction {
    description: String,
    actions: Vec<Box<dyn UndoableAction>>,
    roots_before: Vec<Id>,
    roots_after: Vec<Id>,
    changes: ChangeSet,
}

impl CompoundAction {
    /// Returns the changes this action applies when redone.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl UndoableAction for CompoundAction {
    fn description(&self) -> &str {
        &self.description
    }

    fn undo(&self, document: &mut Document) {
        for action in self.actions.iter().rev() {
            action.undo(document);
        }
        document.set_roots(self.roots_before.clone());
        document.notify(&self.changes.inverted());
    }

    fn redo(&self, document: &mut Document) {
        for action in &self.actions {
            action.redo(document);
        }
        document.set_roots(self.roots_after.clone());
        document.notify(&self.changes);
    }
}
