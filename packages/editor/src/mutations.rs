//! # Page Mutations
//!
//! Structural operations on a [`PageDocument`].
//!
//! ## Design Principles
//!
//! 1. **Structural**: a mutation never touches its input. It returns a new
//!    document, so snapshots held by the undo stack stay frozen.
//! 2. **Validated**: every mutation is checked against the current document
//!    before anything is cloned.
//! 3. **Fail-open**: a stale id or an out-of-range index produces a
//!    [`MutationError`] describing why the mutation was ignored. The caller
//!    decides whether that is worth reporting; the document is unchanged.
//!
//! ## Mutation Semantics
//!
//! ### Move
//! - Same-container moves are remove-then-reinsert; both indices must be in
//!   `[0, len-1]`
//! - Cross-section moves clamp the target index to `[0, len]` and carry the
//!   same component value, so the total component count is preserved
//!
//! ### Insert / Duplicate
//! - Empty or colliding ids are replaced with freshly allocated ones
//! - Content is validated before insertion
//!
//! ### Delete
//! - Reports every removed id so selection can react

use pagebuilder_model::{
    Component, ComponentPatch, IdGenerator, ModelError, NodeId, PageDocument, Section,
    SectionPatch,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Structural edits to a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert a section at index (default: end)
    InsertSection {
        section: Section,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Merge a patch into a section
    UpdateSection { id: NodeId, patch: SectionPatch },

    /// Remove a section and all of its components
    DeleteSection { id: NodeId },

    /// Reorder sections
    MoveSection { from: usize, to: usize },

    /// Insert a component into a section at index (default: end)
    InsertComponent {
        section_id: NodeId,
        component: Component,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Merge a patch into a component
    UpdateComponent { id: NodeId, patch: ComponentPatch },

    /// Remove a component from whichever section owns it
    DeleteComponent { id: NodeId },

    /// Reorder components within one section
    MoveComponent {
        section_id: NodeId,
        from: usize,
        to: usize,
    },

    /// Move a component into another section
    MoveComponentAcrossSections {
        component_id: NodeId,
        from_section_id: NodeId,
        to_section_id: NodeId,
        target_index: usize,
    },

    /// Clone a component right after the original
    DuplicateComponent { id: NodeId },

    /// Swap with the previous sibling
    MoveComponentUp { id: NodeId },

    /// Swap with the next sibling
    MoveComponentDown { id: NodeId },
}

/// Why a mutation was ignored
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Section not found: {0}")]
    SectionNotFound(NodeId),

    #[error("Component {component} is not in section {section}")]
    NotInSection { component: NodeId, section: NodeId },

    #[error("Index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("Component {0} is already at the edge of its section")]
    AtEdge(NodeId),

    #[error("Mutation has no effect")]
    NoChange,

    #[error("Invalid content: {0}")]
    Invalid(#[from] ModelError),

    #[error("Clipboard is empty")]
    ClipboardEmpty,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result of applying a mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// The new document
    pub document: PageDocument,

    /// Id of the node this mutation created, if any
    pub created: Option<NodeId>,

    /// Ids of every node this mutation removed
    pub removed: Vec<NodeId>,
}

impl MutationResult {
    fn changed(document: PageDocument) -> Self {
        Self {
            document,
            created: None,
            removed: Vec::new(),
        }
    }
}

impl Mutation {
    /// Short human-readable name, used as the undo description
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::InsertSection { .. } => "Insert section",
            Mutation::UpdateSection { .. } => "Update section",
            Mutation::DeleteSection { .. } => "Delete section",
            Mutation::MoveSection { .. } => "Move section",
            Mutation::InsertComponent { .. } => "Insert component",
            Mutation::UpdateComponent { .. } => "Update component",
            Mutation::DeleteComponent { .. } => "Delete component",
            Mutation::MoveComponent { .. } => "Move component",
            Mutation::MoveComponentAcrossSections { .. } => "Move component to section",
            Mutation::DuplicateComponent { .. } => "Duplicate component",
            Mutation::MoveComponentUp { .. } => "Move component up",
            Mutation::MoveComponentDown { .. } => "Move component down",
        }
    }

    /// Apply the mutation, producing a new document.
    ///
    /// `doc` is never modified. On error nothing was changed.
    pub fn apply(
        &self,
        doc: &PageDocument,
        ids: &mut IdGenerator,
    ) -> Result<MutationResult, MutationError> {
        // Validate first
        self.validate(doc)?;

        match self {
            Mutation::InsertSection { section, index } => {
                Self::apply_insert_section(doc, ids, section, *index)
            }

            Mutation::UpdateSection { id, patch } => Self::apply_update_section(doc, id, patch),

            Mutation::DeleteSection { id } => Self::apply_delete_section(doc, id),

            Mutation::MoveSection { from, to } => {
                let mut next = doc.clone();
                let section = next.sections.remove(*from);
                next.sections.insert(*to, section);
                Ok(MutationResult::changed(next))
            }

            Mutation::InsertComponent {
                section_id,
                component,
                index,
            } => Self::apply_insert_component(doc, ids, section_id, component, *index),

            Mutation::UpdateComponent { id, patch } => {
                Self::apply_update_component(doc, id, patch)
            }

            Mutation::DeleteComponent { id } => {
                let mut next = doc.clone();
                let loc = next
                    .locate_component(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                next.sections[loc.section_index].components.remove(loc.position);

                Ok(MutationResult {
                    document: next,
                    created: None,
                    removed: vec![id.clone()],
                })
            }

            Mutation::MoveComponent {
                section_id,
                from,
                to,
            } => {
                let mut next = doc.clone();
                let section = next
                    .find_section_mut(section_id.as_str())
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                let component = section.components.remove(*from);
                section.components.insert(*to, component);
                Ok(MutationResult::changed(next))
            }

            Mutation::MoveComponentAcrossSections {
                component_id,
                from_section_id,
                to_section_id,
                target_index,
            } => Self::apply_move_across(doc, component_id, from_section_id, to_section_id, *target_index),

            Mutation::DuplicateComponent { id } => Self::apply_duplicate(doc, ids, id),

            Mutation::MoveComponentUp { id } => Self::apply_swap(doc, id, -1),

            Mutation::MoveComponentDown { id } => Self::apply_swap(doc, id, 1),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &PageDocument) -> Result<(), MutationError> {
        match self {
            Mutation::InsertSection { section, .. } => {
                for component in &section.components {
                    component.validate()?;
                }
                Ok(())
            }

            Mutation::UpdateSection { id, patch } => {
                doc.find_section(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if patch.is_empty() {
                    return Err(MutationError::NoChange);
                }
                Ok(())
            }

            Mutation::DeleteSection { id } => {
                doc.find_section(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                Ok(())
            }

            Mutation::MoveSection { from, to } => {
                check_reorder(*from, *to, doc.sections.len())
            }

            Mutation::InsertComponent {
                section_id,
                component,
                ..
            } => {
                doc.find_section(section_id.as_str())
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                component.validate()?;
                Ok(())
            }

            Mutation::UpdateComponent { id, patch } => {
                let component = doc
                    .find_component(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if patch.is_empty() {
                    return Err(MutationError::NoChange);
                }
                patch.validate_for(component)?;
                Ok(())
            }

            Mutation::DeleteComponent { id } | Mutation::DuplicateComponent { id } => {
                doc.find_component(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                Ok(())
            }

            Mutation::MoveComponent {
                section_id,
                from,
                to,
            } => {
                let section = doc
                    .find_section(section_id.as_str())
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                check_reorder(*from, *to, section.components.len())
            }

            Mutation::MoveComponentAcrossSections {
                component_id,
                from_section_id,
                to_section_id,
                ..
            } => {
                let source = doc
                    .find_section(from_section_id.as_str())
                    .ok_or_else(|| MutationError::SectionNotFound(from_section_id.clone()))?;
                doc.find_section(to_section_id.as_str())
                    .ok_or_else(|| MutationError::SectionNotFound(to_section_id.clone()))?;

                if source.position_of(component_id.as_str()).is_none() {
                    return Err(MutationError::NotInSection {
                        component: component_id.clone(),
                        section: from_section_id.clone(),
                    });
                }
                Ok(())
            }

            Mutation::MoveComponentUp { id } => {
                doc.find_component(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if !doc.can_move_up(id.as_str()) {
                    return Err(MutationError::AtEdge(id.clone()));
                }
                Ok(())
            }

            Mutation::MoveComponentDown { id } => {
                doc.find_component(id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                if !doc.can_move_down(id.as_str()) {
                    return Err(MutationError::AtEdge(id.clone()));
                }
                Ok(())
            }
        }
    }

    fn apply_insert_section(
        doc: &PageDocument,
        ids: &mut IdGenerator,
        section: &Section,
        index: Option<usize>,
    ) -> Result<MutationResult, MutationError> {
        let mut section = section.clone();
        let mut claimed = IdClaims::new(doc);

        section.id = claimed.claim(&section.id, ids);
        for component in &mut section.components {
            component.id = claimed.claim(&component.id, ids);
        }

        let mut next = doc.clone();
        let at = index.unwrap_or(next.sections.len()).min(next.sections.len());
        let created = section.id.clone();
        next.sections.insert(at, section);

        Ok(MutationResult {
            document: next,
            created: Some(created),
            removed: Vec::new(),
        })
    }

    fn apply_update_section(
        doc: &PageDocument,
        id: &NodeId,
        patch: &SectionPatch,
    ) -> Result<MutationResult, MutationError> {
        let mut next = doc.clone();
        let section = next
            .find_section_mut(id.as_str())
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

        let before = section.clone();
        patch.apply_to(section);
        if *section == before {
            return Err(MutationError::NoChange);
        }

        Ok(MutationResult::changed(next))
    }

    fn apply_delete_section(doc: &PageDocument, id: &NodeId) -> Result<MutationResult, MutationError> {
        let mut next = doc.clone();
        let index = next
            .section_index(id.as_str())
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

        let section = next.sections.remove(index);
        let mut removed = vec![section.id.clone()];
        removed.extend(section.component_ids().cloned());

        Ok(MutationResult {
            document: next,
            created: None,
            removed,
        })
    }

    fn apply_insert_component(
        doc: &PageDocument,
        ids: &mut IdGenerator,
        section_id: &NodeId,
        component: &Component,
        index: Option<usize>,
    ) -> Result<MutationResult, MutationError> {
        let mut component = component.clone();
        component.id = IdClaims::new(doc).claim(&component.id, ids);
        let created = component.id.clone();

        let mut next = doc.clone();
        let section = next
            .find_section_mut(section_id.as_str())
            .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;

        let at = index
            .unwrap_or(section.components.len())
            .min(section.components.len());
        section.components.insert(at, component);

        Ok(MutationResult {
            document: next,
            created: Some(created),
            removed: Vec::new(),
        })
    }

    fn apply_update_component(
        doc: &PageDocument,
        id: &NodeId,
        patch: &ComponentPatch,
    ) -> Result<MutationResult, MutationError> {
        let mut next = doc.clone();
        let component = next
            .find_component_mut(id.as_str())
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

        let before = component.clone();
        patch.apply_to(component)?;
        if *component == before {
            return Err(MutationError::NoChange);
        }

        Ok(MutationResult::changed(next))
    }

    fn apply_move_across(
        doc: &PageDocument,
        component_id: &NodeId,
        from_section_id: &NodeId,
        to_section_id: &NodeId,
        target_index: usize,
    ) -> Result<MutationResult, MutationError> {
        let mut next = doc.clone();

        let from = next
            .section_index(from_section_id.as_str())
            .ok_or_else(|| MutationError::SectionNotFound(from_section_id.clone()))?;
        let to = next
            .section_index(to_section_id.as_str())
            .ok_or_else(|| MutationError::SectionNotFound(to_section_id.clone()))?;
        let position = next.sections[from]
            .position_of(component_id.as_str())
            .ok_or_else(|| MutationError::NotInSection {
                component: component_id.clone(),
                section: from_section_id.clone(),
            })?;

        let component = next.sections[from].components.remove(position);
        let destination = &mut next.sections[to].components;
        let at = target_index.min(destination.len());

        if from == to && at == position {
            return Err(MutationError::NoChange);
        }
        destination.insert(at, component);

        Ok(MutationResult::changed(next))
    }

    fn apply_duplicate(
        doc: &PageDocument,
        ids: &mut IdGenerator,
        id: &NodeId,
    ) -> Result<MutationResult, MutationError> {
        let loc = doc
            .locate_component(id.as_str())
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

        let mut next = doc.clone();
        let mut copy = next.sections[loc.section_index].components[loc.position].clone();
        copy.id = ids.next_unused(doc);
        let created = copy.id.clone();

        next.sections[loc.section_index]
            .components
            .insert(loc.position + 1, copy);

        Ok(MutationResult {
            document: next,
            created: Some(created),
            removed: Vec::new(),
        })
    }

    fn apply_swap(doc: &PageDocument, id: &NodeId, offset: isize) -> Result<MutationResult, MutationError> {
        let loc = doc
            .locate_component(id.as_str())
            .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

        let len = doc.sections[loc.section_index].components.len();
        let other = loc
            .position
            .checked_add_signed(offset)
            .filter(|&i| i < len)
            .ok_or_else(|| MutationError::AtEdge(id.clone()))?;

        let mut next = doc.clone();
        next.sections[loc.section_index]
            .components
            .swap(loc.position, other);
        Ok(MutationResult::changed(next))
    }
}

fn check_reorder(from: usize, to: usize, len: usize) -> Result<(), MutationError> {
    if from >= len {
        return Err(MutationError::OutOfBounds { index: from, len });
    }
    if to >= len {
        return Err(MutationError::OutOfBounds { index: to, len });
    }
    if from == to {
        return Err(MutationError::NoChange);
    }
    Ok(())
}

/// Tracks ids handed out during one insertion so a batch of new nodes never
/// collides with the document or with itself.
struct IdClaims<'a> {
    doc: &'a PageDocument,
    taken: HashSet<NodeId>,
}

impl<'a> IdClaims<'a> {
    fn new(doc: &'a PageDocument) -> Self {
        Self {
            doc,
            taken: HashSet::new(),
        }
    }

    /// Keep `requested` if it is free, otherwise allocate a fresh id.
    fn claim(&mut self, requested: &NodeId, ids: &mut IdGenerator) -> NodeId {
        let free = |id: &NodeId, taken: &HashSet<NodeId>| {
            !id.is_empty() && !taken.contains(id) && !self.doc.contains_id(id.as_str())
        };

        let id = if free(requested, &self.taken) {
            requested.clone()
        } else {
            loop {
                let candidate = ids.next_unused(self.doc);
                if free(&candidate, &self.taken) {
                    break candidate;
                }
            }
        };

        self.taken.insert(id.clone());
        id
    }
}
