//! Error types for the editor

use thiserror::Error;

use crate::persistence::PersistenceError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Invalid document: {0}")]
    Model(#[from] pagebuilder_model::ModelError),
}
