//! # Page Builder Editor
//!
//! Edit-command engine for the page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ drag/render layer: gestures → Command       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Mutations produce new snapshots          │
//! │  - Bounded undo/redo of snapshots           │
//! │  - Selection and clipboard                  │
//! │  - Dirty tracking and serialized saves      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ persistence gateway: load/save by page id   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are immutable**: every edit builds a new document
//! 2. **One writer**: all commands for a page go through one session
//! 3. **Fail-open**: stale or out-of-range commands are ignored, never fatal
//! 4. **Position is order**: no separately stored order fields
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagebuilder_editor::{Command, EditSession, EditorConfig, FileGateway};
//!
//! let gateway = FileGateway::new("pages");
//! let mut session = EditSession::open(&gateway, "home".into(), &EditorConfig::default()).await?;
//!
//! session.apply(Command::move_component_up("3f2a9c1e-4"));
//! session.apply(Command::Undo);
//! ```

mod autosave;
mod clipboard;
mod command;
mod config;
mod errors;
mod mutations;
mod persistence;
mod selection;
mod session;
mod undo_stack;

pub use autosave::{SaveCoordinator, SaveResult, SharedSession};
pub use clipboard::Clipboard;
pub use command::{Command, CommandOutcome};
pub use config::{AutosaveConfig, EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use persistence::{FileGateway, MemoryGateway, PersistenceError, PersistenceGateway};
pub use selection::Selection;
pub use session::{EditSession, SaveStatus, SaveTicket};
pub use undo_stack::{HistoryEntry, UndoStack, DEFAULT_HISTORY_CAPACITY};

// Re-export model types for convenience
pub use pagebuilder_model as model;
