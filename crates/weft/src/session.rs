//! Per-session editing state.

use weft_core::{document::Document, history::History, identifier::Id};

/// State that outlives a single reconciliation of one document.
///
/// Holds the placement reference for new nodes and the undo history. Each
/// open document gets its own session, so nothing leaks between documents.
#[derive(Debug, Default)]
pub struct Session {
    last_placed: Option<Id>,
    history: History,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session whose history keeps at most `limit` undo steps.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            last_placed: None,
            history: History::with_limit(limit),
        }
    }

    /// The node new top-level nodes are placed next to.
    pub fn last_placed(&self) -> Option<Id> {
        self.last_placed
    }

    pub fn set_last_placed(&mut self, id: Option<Id>) {
        self.last_placed = id;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn undo(&mut self, document: &mut Document) -> bool {
        self.history.undo(document)
    }

    pub fn redo(&mut self, document: &mut Document) -> bool {
        self.history.redo(document)
    }
}
