//! Error types for oracle calls.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OracleError>;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("provider returned an error: {0}")]
    Provider(String),

    #[error("response did not match the requested schema: {0}")]
    SchemaViolation(String),

    #[error("response body could not be parsed as JSON: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl OracleError {
    /// Transient failures workers should retry or fall back on, never
    /// surface raw to a caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Http(_) | OracleError::RateLimited(_))
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        OracleError::InvalidResponse(err.to_string())
    }
}
