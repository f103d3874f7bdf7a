//! Error taxonomy for worker node functions.
//!
//! Workers never panic and never propagate raw oracle/source errors --
//! anything recoverable is absorbed into the returned state (a source-error
//! entry, a fallback value). What's left here is strictly the fatal path:
//! an oracle failure on a critical-path worker, or a malformed state the
//! worker cannot make sense of.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("oracle call failed: {0}")]
    Oracle(#[from] travel_oracle::OracleError),

    #[error("state field '{field}' was missing or the wrong shape: {detail}")]
    InvalidState { field: String, detail: String },

    #[error("{0}")]
    Other(String),
}

impl WorkerError {
    pub fn invalid_state(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidState { field: field.into(), detail: detail.into() }
    }
}
