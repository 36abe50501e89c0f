//! # Editor Commands
//!
//! The closed set of operations the drag/render layer can issue. Every
//! command is serializable, so a session can be recorded as a JSON-lines log
//! and replayed.
//!
//! ```json
//! {"edit":{"op":"move_component_up","id":"3f2a9c1e-4"}}
//! {"copy_component":{"id":"3f2a9c1e-4"}}
//! {"paste_component":{"section_id":"3f2a9c1e-1"}}
//! "undo"
//! ```

use pagebuilder_model::{Component, ComponentPatch, NodeId, Section, SectionPatch};
use serde::{Deserialize, Serialize};

use crate::mutations::{Mutation, MutationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Structural edit of the document
    Edit(Mutation),

    /// Copy a component into the clipboard
    CopyComponent { id: NodeId },

    /// Append a copy of the clipboard to a section
    PasteComponent { section_id: NodeId },

    /// Set or clear the selection
    Select { id: Option<NodeId> },

    Undo,

    Redo,
}

impl From<Mutation> for Command {
    fn from(mutation: Mutation) -> Self {
        Command::Edit(mutation)
    }
}

impl Command {
    pub fn insert_section(section: Section, index: Option<usize>) -> Self {
        Mutation::InsertSection { section, index }.into()
    }

    pub fn update_section(id: impl Into<NodeId>, patch: SectionPatch) -> Self {
        Mutation::UpdateSection { id: id.into(), patch }.into()
    }

    pub fn delete_section(id: impl Into<NodeId>) -> Self {
        Mutation::DeleteSection { id: id.into() }.into()
    }

    pub fn move_section(from: usize, to: usize) -> Self {
        Mutation::MoveSection { from, to }.into()
    }

    pub fn insert_component(section_id: impl Into<NodeId>, component: Component, index: Option<usize>) -> Self {
        Mutation::InsertComponent {
            section_id: section_id.into(),
            component,
            index,
        }
        .into()
    }

    pub fn update_component(id: impl Into<NodeId>, patch: ComponentPatch) -> Self {
        Mutation::UpdateComponent { id: id.into(), patch }.into()
    }

    pub fn delete_component(id: impl Into<NodeId>) -> Self {
        Mutation::DeleteComponent { id: id.into() }.into()
    }

    pub fn move_component(section_id: impl Into<NodeId>, from: usize, to: usize) -> Self {
        Mutation::MoveComponent {
            section_id: section_id.into(),
            from,
            to,
        }
        .into()
    }

    pub fn move_component_across_sections(
        component_id: impl Into<NodeId>,
        from_section_id: impl Into<NodeId>,
        to_section_id: impl Into<NodeId>,
        target_index: usize,
    ) -> Self {
        Mutation::MoveComponentAcrossSections {
            component_id: component_id.into(),
            from_section_id: from_section_id.into(),
            to_section_id: to_section_id.into(),
            target_index,
        }
        .into()
    }

    pub fn duplicate_component(id: impl Into<NodeId>) -> Self {
        Mutation::DuplicateComponent { id: id.into() }.into()
    }

    pub fn move_component_up(id: impl Into<NodeId>) -> Self {
        Mutation::MoveComponentUp { id: id.into() }.into()
    }

    pub fn move_component_down(id: impl Into<NodeId>) -> Self {
        Mutation::MoveComponentDown { id: id.into() }.into()
    }

    pub fn copy_component(id: impl Into<NodeId>) -> Self {
        Command::CopyComponent { id: id.into() }
    }

    pub fn paste_component(section_id: impl Into<NodeId>) -> Self {
        Command::PasteComponent {
            section_id: section_id.into(),
        }
    }

    pub fn select(id: Option<NodeId>) -> Self {
        Command::Select { id }
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Edit(mutation) => mutation.label(),
            Command::CopyComponent { .. } => "Copy component",
            Command::PasteComponent { .. } => "Paste component",
            Command::Select { .. } => "Select",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
        }
    }
}

/// What a command did. Commands never fail; an ignored command carries the
/// reason it had no effect.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command took effect. `version` is the session version afterwards.
    Applied { version: u64 },

    /// The command was a no-op
    Ignored { reason: MutationError },
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, CommandOutcome::Ignored { .. })
    }
}
