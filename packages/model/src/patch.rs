//! Partial updates for sections and components.
//!
//! A patch only carries the fields it changes. Styles are merged property by
//! property; content is replaced whole but must keep the component's type.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentContent};
use crate::document::{Section, SectionKind};
use crate::error::ModelError;
use crate::style::Styles;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
}

impl SectionPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.visible.is_none() && self.styles.is_none()
    }

    pub fn apply_to(&self, section: &mut Section) {
        if let Some(kind) = self.kind {
            section.kind = kind;
        }
        if let Some(visible) = self.visible {
            section.visible = visible;
        }
        if let Some(styles) = &self.styles {
            section.styles.merge(styles);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ComponentContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
}

impl ComponentPatch {
    pub fn content(content: ComponentContent) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn styles(styles: Styles) -> Self {
        Self {
            styles: Some(styles),
            ..Self::default()
        }
    }

    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.visible.is_none() && self.styles.is_none()
    }

    /// Check the patch against `component` without touching it.
    pub fn validate_for(&self, component: &Component) -> Result<(), ModelError> {
        if let Some(content) = &self.content {
            let expected = component.component_type();
            let found = content.content_type();
            if expected != found {
                return Err(ModelError::TypeMismatch { expected, found });
            }
            content.validate()?;
        }
        Ok(())
    }

    /// Apply the patch. Nothing is written if validation fails.
    pub fn apply_to(&self, component: &mut Component) -> Result<(), ModelError> {
        self.validate_for(component)?;

        if let Some(content) = &self.content {
            component.content = content.clone();
        }
        if let Some(visible) = self.visible {
            component.visible = visible;
        }
        if let Some(styles) = &self.styles {
            component.styles.merge(styles);
        }
        Ok(())
    }
}
