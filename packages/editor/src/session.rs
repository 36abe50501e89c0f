//! # Edit Session
//!
//! One open page: its current document, undo history, selection, clipboard
//! and save state. All commands for the page go through
//! [`EditSession::apply`], which is the single writer of the document.
//!
//! ```text
//! Command ─→ apply ─→ Mutation::apply ─→ new snapshot
//!                                         ├─→ UndoStack::record
//!                                         ├─→ Selection::on_removed
//!                                         └─→ dirty = true
//! ```
//!
//! Commands never fail. A command that cannot take effect (stale id, index
//! out of range, empty clipboard, nothing to undo) returns
//! [`CommandOutcome::Ignored`] and leaves the session untouched.

use pagebuilder_model::{IdGenerator, NodeId, PageDocument, PageId};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clipboard::Clipboard;
use crate::command::{Command, CommandOutcome};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationError, MutationResult};
use crate::persistence::{PersistenceError, PersistenceGateway};
use crate::selection::Selection;
use crate::undo_stack::UndoStack;

/// Persistence state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Matches the last successful save
    Saved,

    /// Has edits not yet saved
    Unsaved,

    /// A save is in flight
    Saving,

    /// The last save failed
    Error(String),
}

/// Snapshot handed to a save in flight
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub page_id: PageId,
    pub snapshot: Arc<PageDocument>,
    pub version: u64,
}

#[derive(Debug)]
struct OpenBatch {
    description: String,
    start_version: u64,
}

/// Editing state for one page
#[derive(Debug)]
pub struct EditSession {
    page_id: PageId,
    document: Arc<PageDocument>,
    history: UndoStack,
    selection: Selection,
    clipboard: Clipboard,
    ids: IdGenerator,

    /// Increments on every document change (edits, paste, undo, redo)
    version: u64,
    dirty: bool,
    status: SaveStatus,
    batch: Option<OpenBatch>,
}

impl EditSession {
    /// Create a session with the default history capacity
    pub fn new(page_id: PageId, document: PageDocument) -> Self {
        Self::with_config(page_id, document, &EditorConfig::default())
    }

    pub fn with_config(page_id: PageId, document: PageDocument, config: &EditorConfig) -> Self {
        let ids = IdGenerator::for_document(page_id.as_str(), &document);
        let document = Arc::new(document);

        Self {
            history: UndoStack::with_capacity(Arc::clone(&document), config.history_capacity),
            page_id,
            document,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            ids,
            version: 0,
            dirty: false,
            status: SaveStatus::Saved,
            batch: None,
        }
    }

    /// Load a page through the gateway and open a session on it.
    pub async fn open(
        gateway: &dyn PersistenceGateway,
        page_id: PageId,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let document = gateway.load(&page_id).await?;
        document.validate()?;

        info!(
            page = %page_id,
            sections = document.section_count(),
            components = document.component_count(),
            "Opened edit session"
        );
        Ok(Self::with_config(page_id, document, config))
    }

    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    /// Current document
    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    /// Current document as a shared snapshot
    pub fn snapshot(&self) -> Arc<PageDocument> {
        Arc::clone(&self.document)
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_move_up(&self, component_id: &str) -> bool {
        self.document.can_move_up(component_id)
    }

    pub fn can_move_down(&self, component_id: &str) -> bool {
        self.document.can_move_down(component_id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.status
    }

    /// Run one command
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let name = command.name();

        let result = match command {
            Command::Edit(mutation) => self.apply_mutation(&mutation),
            Command::CopyComponent { id } => self.copy_component(&id),
            Command::PasteComponent { section_id } => self.paste_component(&section_id),
            Command::Select { id } => {
                self.selection.select(id);
                Ok(())
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        };

        match result {
            Ok(()) => {
                debug!(command = name, version = self.version, "Command applied");
                CommandOutcome::Applied {
                    version: self.version,
                }
            }
            Err(reason) => {
                debug!(command = name, reason = %reason, "Command ignored");
                CommandOutcome::Ignored { reason }
            }
        }
    }

    /// Run commands in order, e.g. from a recorded log
    pub fn replay(&mut self, commands: impl IntoIterator<Item = Command>) -> Vec<CommandOutcome> {
        commands.into_iter().map(|c| self.apply(c)).collect()
    }

    /// Group the following edits into a single undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        if self.batch.is_some() {
            return;
        }
        self.batch = Some(OpenBatch {
            description: description.into(),
            start_version: self.version,
        });
    }

    /// Close the open batch, recording one history entry if anything changed
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.batch.take() {
            if self.version != batch.start_version {
                self.history
                    .record(Arc::clone(&self.document), Some(&batch.description));
            }
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    fn apply_mutation(&mut self, mutation: &Mutation) -> Result<(), MutationError> {
        let result = mutation.apply(&self.document, &mut self.ids)?;
        let created = result.created.clone();
        self.commit(result, mutation.label());

        if let Mutation::DuplicateComponent { .. } = mutation {
            self.selection.select(created);
        }
        Ok(())
    }

    fn copy_component(&mut self, id: &NodeId) -> Result<(), MutationError> {
        if self.clipboard.copy(&self.document, id.as_str()) {
            Ok(())
        } else {
            Err(MutationError::NodeNotFound(id.clone()))
        }
    }

    fn paste_component(&mut self, section_id: &NodeId) -> Result<(), MutationError> {
        if self.document.find_section(section_id.as_str()).is_none() {
            return Err(MutationError::SectionNotFound(section_id.clone()));
        }

        let component = self
            .clipboard
            .instantiate(&self.document, &mut self.ids)
            .ok_or(MutationError::ClipboardEmpty)?;

        let mutation = Mutation::InsertComponent {
            section_id: section_id.clone(),
            component,
            index: None,
        };
        let result = mutation.apply(&self.document, &mut self.ids)?;
        let created = result.created.clone();

        self.commit(result, "Paste component");
        self.selection.select(created);
        Ok(())
    }

    fn undo(&mut self) -> Result<(), MutationError> {
        self.end_batch();
        let snapshot = self.history.undo().ok_or(MutationError::NothingToUndo)?;
        self.restore(snapshot);
        Ok(())
    }

    fn redo(&mut self) -> Result<(), MutationError> {
        self.end_batch();
        let snapshot = self.history.redo().ok_or(MutationError::NothingToRedo)?;
        self.restore(snapshot);
        Ok(())
    }

    fn commit(&mut self, result: MutationResult, description: &str) {
        let snapshot = Arc::new(result.document);
        self.document = Arc::clone(&snapshot);

        if self.batch.is_none() {
            self.history.record(snapshot, Some(description));
        }

        self.selection.on_removed(&result.removed);
        self.mark_edited();
    }

    fn restore(&mut self, snapshot: Arc<PageDocument>) {
        self.document = snapshot;
        self.selection.retain_in(&self.document);
        self.mark_edited();
    }

    fn mark_edited(&mut self) {
        self.version += 1;
        self.dirty = true;
        if self.status != SaveStatus::Saving {
            self.status = SaveStatus::Unsaved;
        }
    }

    /// Take the snapshot to save and mark the save as in flight
    pub fn begin_save(&mut self) -> SaveTicket {
        self.status = SaveStatus::Saving;
        SaveTicket {
            page_id: self.page_id.clone(),
            snapshot: Arc::clone(&self.document),
            version: self.version,
        }
    }

    /// Record the outcome of a save started at `version`.
    ///
    /// The document is never rolled back. Dirty is only cleared if nothing
    /// changed while the save was in flight.
    pub fn finish_save(&mut self, version: u64, result: &Result<(), PersistenceError>) {
        match result {
            Ok(()) if version == self.version => {
                self.dirty = false;
                self.status = SaveStatus::Saved;
            }
            Ok(()) => {
                self.dirty = true;
                self.status = SaveStatus::Unsaved;
            }
            Err(e) => {
                self.dirty = true;
                self.status = SaveStatus::Error(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebuilder_model::{Component, ComponentContent, Section, SectionKind};

    fn session() -> EditSession {
        let doc = PageDocument::from_sections(vec![
            Section::new(SectionKind::Hero)
                .with_id("s1")
                .with_component(Component::new(ComponentContent::heading("A", 1)).with_id("a"))
                .with_component(Component::new(ComponentContent::text("B")).with_id("b")),
            Section::new(SectionKind::Content).with_id("s2"),
        ]);
        EditSession::new(PageId::from("home"), doc)
    }

    #[test]
    fn test_session_creation() {
        let session = session();

        assert_eq!(session.page_id(), &PageId::from("home"));
        assert_eq!(session.version(), 0);
        assert!(!session.is_dirty());
        assert_eq!(session.save_status(), &SaveStatus::Saved);
        assert!(!session.can_undo());
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_applied_edit_marks_dirty() {
        let mut session = session();

        let outcome = session.apply(Command::move_component_up("b"));
        assert_eq!(outcome, CommandOutcome::Applied { version: 1 });
        assert!(session.is_dirty());
        assert_eq!(session.save_status(), &SaveStatus::Unsaved);
        assert!(session.can_undo());
    }

    #[test]
    fn test_ignored_edit_changes_nothing() {
        let mut session = session();
        let before = session.snapshot();

        let outcome = session.apply(Command::delete_component("ghost"));
        assert!(outcome.is_ignored());
        assert_eq!(session.version(), 0);
        assert!(!session.is_dirty());
        assert!(Arc::ptr_eq(&before, &session.snapshot()));
    }

    #[test]
    fn test_undo_marks_dirty() {
        let mut session = session();
        session.apply(Command::move_component_up("b"));
        session.finish_save(session.version(), &Ok(()));
        assert!(!session.is_dirty());

        assert!(session.apply(Command::Undo).is_applied());
        assert!(session.is_dirty());
        assert!(session.can_redo());
    }

    #[test]
    fn test_undo_at_start_is_ignored() {
        let mut session = session();
        assert_eq!(
            session.apply(Command::Undo),
            CommandOutcome::Ignored {
                reason: MutationError::NothingToUndo
            }
        );
        assert_eq!(
            session.apply(Command::Redo),
            CommandOutcome::Ignored {
                reason: MutationError::NothingToRedo
            }
        );
    }

    #[test]
    fn test_delete_section_clears_selected_child() {
        let mut session = session();
        session.apply(Command::select(Some("b".into())));

        session.apply(Command::delete_section("s1"));
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_selection_persists_on_unrelated_delete() {
        let mut session = session();
        session.apply(Command::select(Some("a".into())));

        session.apply(Command::delete_component("b"));
        assert_eq!(session.selection(), Some(&NodeId::from("a")));
    }

    #[test]
    fn test_undo_does_not_restore_selection() {
        let mut session = session();
        session.apply(Command::select(Some("b".into())));
        session.apply(Command::delete_component("b"));
        assert!(session.selection().is_none());

        session.apply(Command::Undo);
        assert!(session.document().find_component("b").is_some());
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_redo_clears_selection_of_vanished_node() {
        let mut session = session();
        session.apply(Command::delete_component("b"));
        session.apply(Command::Undo);
        session.apply(Command::select(Some("b".into())));

        session.apply(Command::Redo);
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_paste_requires_clipboard() {
        let mut session = session();
        assert_eq!(
            session.apply(Command::paste_component("s2")),
            CommandOutcome::Ignored {
                reason: MutationError::ClipboardEmpty
            }
        );
    }

    #[test]
    fn test_paste_into_missing_section() {
        let mut session = session();
        session.apply(Command::copy_component("a"));
        assert!(session.apply(Command::paste_component("nope")).is_ignored());
    }

    #[test]
    fn test_copy_is_not_an_edit() {
        let mut session = session();
        assert!(session.apply(Command::copy_component("a")).is_applied());
        assert_eq!(session.version(), 0);
        assert!(!session.can_undo());
        assert!(session.apply(Command::copy_component("ghost")).is_ignored());
    }

    #[test]
    fn test_batch_records_single_entry() {
        let mut session = session();

        session.begin_batch("Drag");
        session.apply(Command::move_component_across_sections("a", "s1", "s2", 0));
        session.apply(Command::move_component_across_sections("b", "s1", "s2", 1));
        assert!(session.history().is_empty());
        session.end_batch();

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().undo_description(), Some("Drag"));

        session.apply(Command::Undo);
        assert_eq!(session.document().find_section("s1").unwrap().components.len(), 2);
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut session = session();
        session.begin_batch("Nothing");
        session.apply(Command::delete_component("ghost"));
        session.end_batch();
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_undo_closes_open_batch() {
        let mut session = session();
        session.begin_batch("Drag");
        session.apply(Command::move_component_up("b"));

        session.apply(Command::Undo);
        assert!(!session.in_batch());
        assert_eq!(session.document().find_section("s1").unwrap().components[0].id.as_str(), "a");
    }

    #[test]
    fn test_save_finishing_after_edit_stays_dirty() {
        let mut session = session();
        session.apply(Command::move_component_up("b"));

        let ticket = session.begin_save();
        assert_eq!(session.save_status(), &SaveStatus::Saving);

        session.apply(Command::move_component_up("b"));
        assert_eq!(session.save_status(), &SaveStatus::Saving);

        session.finish_save(ticket.version, &Ok(()));
        assert!(session.is_dirty());
        assert_eq!(session.save_status(), &SaveStatus::Unsaved);
    }

    #[test]
    fn test_failed_save_keeps_document() {
        let mut session = session();
        session.apply(Command::delete_component("a"));
        let ticket = session.begin_save();

        session.finish_save(
            ticket.version,
            &Err(PersistenceError::Retryable("offline".to_string())),
        );

        assert!(session.is_dirty());
        assert!(matches!(session.save_status(), SaveStatus::Error(_)));
        assert!(session.document().find_component("a").is_none());
    }

    #[test]
    fn test_history_capacity_from_config() {
        let config = EditorConfig {
            history_capacity: 3,
            ..EditorConfig::default()
        };
        let mut session = EditSession::with_config(PageId::from("p"), PageDocument::new(), &config);

        for _ in 0..5 {
            session.apply(Command::insert_section(Section::new(SectionKind::Content), None));
        }
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_move_availability_tracks_document() {
        let mut session = session();
        assert!(!session.can_move_up("a"));
        assert!(session.can_move_down("a"));

        session.apply(Command::move_component_down("a"));
        assert!(session.can_move_up("a"));
        assert!(!session.can_move_down("a"));
    }
}
