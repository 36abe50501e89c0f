//! # Undo/Redo Stack
//!
//! Bounded linear history of document snapshots.
//!
//! ## Design
//!
//! - The visible snapshot is held outside the history; the history holds
//!   the snapshots undo and redo can return to
//! - Recording after an undo discards the redo branch
//! - At most `capacity` snapshots are retained (undo plus redo). When a
//!   record exceeds that, the oldest undo snapshot is evicted, so undo can
//!   go back at most `capacity` steps
//! - Snapshots are shared (`Arc`), never mutated
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new(Arc::new(doc));
//!
//! stack.record(Arc::new(edited), Some("Insert section"));
//! assert!(stack.can_undo());
//!
//! let previous = stack.undo().unwrap();
//! let edited_again = stack.redo().unwrap();
//! ```

use pagebuilder_model::PageDocument;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of undo levels retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One snapshot and the edit that produced it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: Arc<PageDocument>,

    /// Description of the edit that produced this snapshot
    pub description: Option<String>,
}

/// Undo/redo history for one page
#[derive(Debug)]
pub struct UndoStack {
    /// Visible snapshot
    current: HistoryEntry,

    /// Snapshots undo returns to, oldest first
    undo_stack: VecDeque<HistoryEntry>,

    /// Snapshots redo returns to, next one last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of retained snapshots (always >= 1)
    max_levels: usize,
}

impl UndoStack {
    /// Create a stack showing `initial` with the default capacity (50)
    pub fn new(initial: Arc<PageDocument>) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a stack with a custom capacity. A capacity of 0 is treated as 1.
    pub fn with_capacity(initial: Arc<PageDocument>, capacity: usize) -> Self {
        let max_levels = capacity.max(1);

        Self {
            current: HistoryEntry {
                snapshot: initial,
                description: None,
            },
            undo_stack: VecDeque::with_capacity(max_levels),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a new snapshot as the visible state
    pub fn record(&mut self, snapshot: Arc<PageDocument>, description: Option<&str>) {
        // New edit invalidates the redo branch
        self.redo_stack.clear();

        let previous = std::mem::replace(
            &mut self.current,
            HistoryEntry {
                snapshot,
                description: description.map(str::to_string),
            },
        );
        self.undo_stack.push_back(previous);

        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
    }

    /// Step back. Returns the now-visible snapshot, or `None` at the start.
    pub fn undo(&mut self) -> Option<Arc<PageDocument>> {
        let previous = self.undo_stack.pop_back()?;
        let undone = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(undone);
        Some(self.current())
    }

    /// Step forward. Returns the now-visible snapshot, or `None` at the tip.
    pub fn redo(&mut self) -> Option<Arc<PageDocument>> {
        let next = self.redo_stack.pop()?;
        let previous = std::mem::replace(&mut self.current, next);
        self.undo_stack.push_back(previous);
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Visible snapshot
    pub fn current(&self) -> Arc<PageDocument> {
        Arc::clone(&self.current.snapshot)
    }

    /// Number of retained snapshots, not counting the visible one
    pub fn len(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_levels
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the edit the next undo reverts
    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.current.description.as_deref()
    }

    /// Description of the edit the next redo reapplies
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last()?.description.as_deref()
    }

    /// Drop all history, keeping `current` as the visible snapshot
    pub fn clear(&mut self, current: Arc<PageDocument>) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = HistoryEntry {
            snapshot: current,
            description: None,
        };
    }
}
