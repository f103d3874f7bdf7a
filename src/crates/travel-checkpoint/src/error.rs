//! Error types for checkpoint operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckpointError>;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid checkpoint request: {0}")]
    Invalid(String),

    #[error("{0}")]
    Custom(String),
}
