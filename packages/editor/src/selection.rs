//! Single-node selection.
//!
//! Selection is transient focus, not document content: it is not recorded
//! in history, and undo/redo leave it alone unless the selected node
//! disappears.

use pagebuilder_model::{NodeId, PageDocument};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection outright
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Clear if the selected node is among `removed`. Returns true if cleared.
    pub fn on_removed(&mut self, removed: &[NodeId]) -> bool {
        match &self.selected {
            Some(id) if removed.contains(id) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    /// Clear if the selected node no longer exists in `doc`.
    pub fn retain_in(&mut self, doc: &PageDocument) -> bool {
        match &self.selected {
            Some(id) if !doc.contains_id(id.as_str()) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }
}
