//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] chartdoc_document::DocumentError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
