//! # Components
//!
//! Leaf content nodes of a page. The content of a component is a tagged
//! union keyed by its `type`, so a heading can never carry a video `src`
//! and an image can never carry a form field list.
//!
//! ```json
//! {
//!   "id": "3f2a9c1e-4",
//!   "content": { "type": "image", "src": "/hero.png", "alt": "Hero" },
//!   "styles": { "width": "100%" },
//!   "visible": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::ModelError;
use crate::ids::NodeId;
use crate::style::Styles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Heading,
    Text,
    Button,
    Image,
    Video,
    Icon,
    Form,
    Custom,
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::Heading => "heading",
            ComponentType::Text => "text",
            ComponentType::Button => "button",
            ComponentType::Image => "image",
            ComponentType::Video => "video",
            ComponentType::Icon => "icon",
            ComponentType::Form => "form",
            ComponentType::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Email,
    Textarea,
    Checkbox,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub input: InputKind,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, input: InputKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            input,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Type-specific payload of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentContent {
    Heading {
        text: String,
        level: u8,
    },
    Text {
        text: String,
    },
    Button {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
    },
    Image {
        src: String,
        #[serde(default)]
        alt: String,
    },
    Video {
        src: String,
        #[serde(default)]
        autoplay: bool,
        #[serde(default = "default_true")]
        controls: bool,
    },
    Icon {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u16>,
    },
    Form {
        #[serde(default)]
        fields: Vec<FormField>,
        #[serde(rename = "submitLabel", default = "default_submit_label")]
        submit_label: String,
    },
    Custom {
        html: String,
    },
}

fn default_true() -> bool {
    true
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

impl ComponentContent {
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        ComponentContent::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ComponentContent::Text { text: text.into() }
    }

    pub fn button(label: impl Into<String>) -> Self {
        ComponentContent::Button {
            label: label.into(),
            href: None,
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        ComponentContent::Image {
            src: src.into(),
            alt: alt.into(),
        }
    }

    pub fn video(src: impl Into<String>) -> Self {
        ComponentContent::Video {
            src: src.into(),
            autoplay: false,
            controls: true,
        }
    }

    pub fn icon(name: impl Into<String>) -> Self {
        ComponentContent::Icon {
            name: name.into(),
            size: None,
        }
    }

    pub fn form(fields: Vec<FormField>) -> Self {
        ComponentContent::Form {
            fields,
            submit_label: default_submit_label(),
        }
    }

    pub fn custom(html: impl Into<String>) -> Self {
        ComponentContent::Custom { html: html.into() }
    }

    pub fn content_type(&self) -> ComponentType {
        match self {
            ComponentContent::Heading { .. } => ComponentType::Heading,
            ComponentContent::Text { .. } => ComponentType::Text,
            ComponentContent::Button { .. } => ComponentType::Button,
            ComponentContent::Image { .. } => ComponentType::Image,
            ComponentContent::Video { .. } => ComponentType::Video,
            ComponentContent::Icon { .. } => ComponentType::Icon,
            ComponentContent::Form { .. } => ComponentType::Form,
            ComponentContent::Custom { .. } => ComponentType::Custom,
        }
    }

    /// Check the structural constraints of this payload.
    pub fn validate(&self) -> Result<(), ModelError> {
        let kind = self.content_type();
        match self {
            ComponentContent::Heading { level, .. } => {
                if !(1..=6).contains(level) {
                    return Err(ModelError::invalid(kind, format!("heading level {} outside 1..=6", level)));
                }
            }
            ComponentContent::Image { src, .. } | ComponentContent::Video { src, .. } => {
                if src.trim().is_empty() {
                    return Err(ModelError::invalid(kind, "empty src"));
                }
            }
            ComponentContent::Icon { name, .. } => {
                if name.trim().is_empty() {
                    return Err(ModelError::invalid(kind, "empty icon name"));
                }
            }
            ComponentContent::Form { fields, .. } => {
                let mut seen = HashSet::new();
                for field in fields {
                    if field.name.trim().is_empty() {
                        return Err(ModelError::invalid(kind, "form field without a name"));
                    }
                    if !seen.insert(field.name.as_str()) {
                        return Err(ModelError::invalid(kind, format!("duplicate form field '{}'", field.name)));
                    }
                }
            }
            ComponentContent::Text { .. }
            | ComponentContent::Button { .. }
            | ComponentContent::Custom { .. } => {}
        }
        Ok(())
    }
}

/// A leaf node of the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: NodeId,
    pub content: ComponentContent,
    #[serde(default)]
    pub styles: Styles,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Component {
    /// Create a visible, unstyled component with an unassigned id.
    pub fn new(content: ComponentContent) -> Self {
        Self {
            id: NodeId::default(),
            content,
            styles: Styles::default(),
            visible: true,
        }
    }

    /// Create a component, rejecting content that fails validation.
    pub fn try_new(content: ComponentContent) -> Result<Self, ModelError> {
        content.validate()?;
        Ok(Self::new(content))
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.content.content_type()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.content.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_tagged_by_type() {
        let json = serde_json::to_value(ComponentContent::heading("Welcome", 1)).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 1);

        let parsed: ComponentContent =
            serde_json::from_str(r#"{"type":"video","src":"/intro.mp4"}"#).unwrap();
        assert_eq!(parsed, ComponentContent::video("/intro.mp4"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let parsed = serde_json::from_str::<ComponentContent>(r#"{"type":"carousel"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_heading_level_validation() {
        assert!(Component::try_new(ComponentContent::heading("Ok", 6)).is_ok());

        let err = Component::try_new(ComponentContent::heading("Too deep", 7)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidContent { component_type: ComponentType::Heading, .. }
        ));
    }

    #[test]
    fn test_media_requires_src() {
        assert!(ComponentContent::image("  ", "alt").validate().is_err());
        assert!(ComponentContent::video("").validate().is_err());
        assert!(ComponentContent::image("/a.png", "").validate().is_ok());
    }

    #[test]
    fn test_form_rejects_duplicate_fields() {
        let form = ComponentContent::form(vec![
            FormField::new("email", "Email", InputKind::Email).required(),
            FormField::new("email", "Email again", InputKind::Email),
        ]);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_component_defaults_on_deserialize() {
        let component: Component =
            serde_json::from_str(r#"{"content":{"type":"text","text":"Hi"}}"#).unwrap();
        assert!(component.id.is_empty());
        assert!(component.visible);
        assert!(component.styles.is_empty());
        assert_eq!(component.component_type(), ComponentType::Text);
    }
}
