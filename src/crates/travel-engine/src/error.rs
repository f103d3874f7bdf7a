//! Error taxonomy for the session API facade.
//!
//! Wraps every lower crate's error type rather than flattening them: a
//! caller that wants to distinguish "session not found" from "oracle is
//! down" still can via `source()`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session '{0}' does not exist")]
    SessionNotFound(String),

    #[error("session '{0}' was cancelled and cannot be resumed")]
    SessionCancelled(String),

    #[error("session '{0}' is not suspended; cannot resume")]
    NotSuspended(String),

    #[error(transparent)]
    Graph(#[from] travel_core::GraphError),

    #[error(transparent)]
    Checkpoint(#[from] travel_checkpoint::CheckpointError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Custom(String),
}
