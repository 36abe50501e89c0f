//! Single-slot component clipboard.
//!
//! The slot holds an owned copy of a component. Editing the document after
//! a copy never changes what a paste produces, and pasting does not empty
//! the slot.

use pagebuilder_model::{Component, IdGenerator, PageDocument};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Component>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a component out of `doc`, replacing any previous content.
    /// Returns false (and leaves the slot alone) if the id is unknown.
    pub fn copy(&mut self, doc: &PageDocument, component_id: &str) -> bool {
        match doc.find_component(component_id) {
            Some(component) => {
                self.slot = Some(component.clone());
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn contents(&self) -> Option<&Component> {
        self.slot.as_ref()
    }

    /// Build a fresh component from the slot with an id unused in `doc`.
    pub fn instantiate(&self, doc: &PageDocument, ids: &mut IdGenerator) -> Option<Component> {
        self.slot.as_ref().map(|component| {
            let mut copy = component.clone();
            copy.id = ids.next_unused(doc);
            copy
        })
    }
}
