//! Undo and redo stacks.

use std::fmt;

use log::debug;

use crate::document::Document;

/// A reversible change to a [`Document`].
pub trait UndoableAction: fmt::Debug {
    /// Short human-readable name, e.g. for an "Undo ..." menu entry.
    fn description(&self) -> &str;

    fn undo(&self, document: &mut Document);

    fn redo(&self, document: &mut Document);
}

/// Linear undo history.
///
/// Pushing a new action discards everything that could have been redone.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Box<dyn UndoableAction>>,
    redo_stack: Vec<Box<dyn UndoableAction>>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history that forgets the oldest entries beyond `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Records an action that has already been applied.
    pub fn push(&mut self, action: Box<dyn UndoableAction>) {
        debug!(action = action.description(); "Recording undo entry");
        self.redo_stack.clear();
        self.undo_stack.push(action);
        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            self.undo_stack.drain(..excess);
        }
    }

    /// Reverts the most recent action. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        debug!(action = action.description(); "Undo");
        action.undo(document);
        self.redo_stack.push(action);
        true
    }

    /// Re-applies the most recently undone action. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        debug!(action = action.description(); "Redo");
        action.redo(document);
        self.undo_stack.push(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
