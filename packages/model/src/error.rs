use thiserror::Error;

use crate::component::ComponentType;
use crate::ids::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid {component_type} content: {reason}")]
    InvalidContent {
        component_type: ComponentType,
        reason: String,
    },

    #[error("Type mismatch: component is {expected}, patch is {found}")]
    TypeMismatch {
        expected: ComponentType,
        found: ComponentType,
    },

    #[error("Duplicate id: {0}")]
    DuplicateId(NodeId),

    #[error("Empty id in section {0}")]
    EmptyId(usize),

    #[error("JSON error: {0}")]
    Json(String),
}

impl ModelError {
    pub(crate) fn invalid(component_type: ComponentType, reason: impl Into<String>) -> Self {
        ModelError::InvalidContent {
            component_type,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Json(e.to_string())
    }
}
