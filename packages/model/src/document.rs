//! # Page Document
//!
//! A page is an ordered list of sections, each holding an ordered list of
//! components. Order is positional: a node's order is its index in the
//! owning `Vec`, there is no separate order field that could drift.
//!
//! ```text
//! PageDocument
//!  ├─ Section (hero)
//!  │   ├─ Component (heading)
//!  │   └─ Component (button)
//!  └─ Section (footer)
//!      └─ Component (text)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::component::Component;
use crate::error::ModelError;
use crate::ids::NodeId;
use crate::style::Styles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Hero,
    Content,
    Features,
    Gallery,
    Testimonials,
    Contact,
    Footer,
    Custom,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Header => "header",
            SectionKind::Hero => "hero",
            SectionKind::Content => "content",
            SectionKind::Features => "features",
            SectionKind::Gallery => "gallery",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Contact => "contact",
            SectionKind::Footer => "footer",
            SectionKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

fn default_visible() -> bool {
    true
}

/// A visible container of components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: NodeId,
    pub kind: SectionKind,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub styles: Styles,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            id: NodeId::default(),
            kind,
            visible: true,
            styles: Styles::default(),
            components: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Index of a component within this section
    pub fn position_of(&self, component_id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id.as_str() == component_id)
    }

    pub fn component_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.components.iter().map(|c| &c.id)
    }
}

/// Where a component lives in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentLocation {
    pub section_index: usize,
    pub position: usize,
}

/// Root aggregate of one editable page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of components across all sections
    pub fn component_count(&self) -> usize {
        self.sections.iter().map(|s| s.components.len()).sum()
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id.as_str() == section_id)
    }

    pub fn find_section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id.as_str() == section_id)
    }

    pub fn find_section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id.as_str() == section_id)
    }

    /// Find the section and index holding a component
    pub fn locate_component(&self, component_id: &str) -> Option<ComponentLocation> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(section_index, section)| {
                section.position_of(component_id).map(|position| ComponentLocation {
                    section_index,
                    position,
                })
            })
    }

    pub fn find_component(&self, component_id: &str) -> Option<&Component> {
        let loc = self.locate_component(component_id)?;
        self.sections[loc.section_index].components.get(loc.position)
    }

    pub fn find_component_mut(&mut self, component_id: &str) -> Option<&mut Component> {
        let loc = self.locate_component(component_id)?;
        self.sections[loc.section_index].components.get_mut(loc.position)
    }

    /// Section owning a component
    pub fn owner_of(&self, component_id: &str) -> Option<&Section> {
        let loc = self.locate_component(component_id)?;
        self.sections.get(loc.section_index)
    }

    /// True if any section or component carries this id
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|existing| existing.as_str() == id)
    }

    /// All section and component ids, in document order
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.sections
            .iter()
            .flat_map(|s| std::iter::once(&s.id).chain(s.component_ids()))
    }

    /// Whether a component has a preceding sibling to swap with.
    pub fn can_move_up(&self, component_id: &str) -> bool {
        self.locate_component(component_id)
            .map(|loc| loc.position > 0)
            .unwrap_or(false)
    }

    /// Whether a component has a following sibling to swap with.
    pub fn can_move_down(&self, component_id: &str) -> bool {
        self.locate_component(component_id)
            .map(|loc| loc.position + 1 < self.sections[loc.section_index].components.len())
            .unwrap_or(false)
    }

    /// Verify every id is present and unique across the whole document.
    pub fn check_integrity(&self) -> Result<(), ModelError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, section) in self.sections.iter().enumerate() {
            let ids = std::iter::once(&section.id).chain(section.component_ids());
            for id in ids {
                if id.is_empty() {
                    return Err(ModelError::EmptyId(index));
                }
                if !seen.insert(id.as_str()) {
                    return Err(ModelError::DuplicateId(id.clone()));
                }
            }
        }

        Ok(())
    }

    /// Full check of a loaded document: id integrity plus every component's
    /// content rules.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.check_integrity()?;
        self.sections
            .iter()
            .flat_map(|s| s.components.iter())
            .try_for_each(Component::validate)
    }
}
