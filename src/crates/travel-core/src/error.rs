//! Error taxonomy for the coordination fabric.
//!
//! Every error kind maps to exactly one of the propagation rules the
//! executor follows: fatal (session transitions to `failed`), absorbed
//! (recorded in the message log, session continues), or not-an-error at all
//! (`Suspended`, `ExceededReplanBudget` once converted to force-approval).
//!
//! ```rust
//! use travel_core::error::GraphError;
//!
//! fn handle(err: GraphError) -> String {
//!     match err {
//!         GraphError::ExceededStepBudget { steps } => format!("ran {steps} steps, aborting"),
//!         GraphError::OracleFailure(msg) => format!("oracle call failed: {msg}"),
//!         _ => format!("{err}"),
//!     }
//! }
//! ```

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// All error kinds a session's execution can produce.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Request text or clarification answers failed basic validation before
    /// a session was even created. The caller never receives a session id.
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    /// Graph structure is invalid (missing node, dangling edge target).
    #[error("Graph validation failed: {0}")]
    Validation(String),

    /// A node's executor returned an error.
    #[error("Node '{node}' execution failed: {error}")]
    NodeExecution { node: String, error: String },

    /// The oracle capability failed. Fatal on critical-path workers
    /// (planner, geography, critic, finalizer); callers on data-gathering
    /// workers should catch this and fall back instead of propagating it.
    #[error("Oracle call failed: {0}")]
    OracleFailure(String),

    /// A single external data source failed. Always absorbed by the worker
    /// that called it -- this variant exists so the absorption shows up in
    /// the message log, not so it propagates.
    #[error("Source '{source}' failed: {error}")]
    SourceFailure { source: String, error: String },

    /// Not an error: the session reached a suspension point (clarification's
    /// `wait_for_answers` branch) and is waiting for `ResumeWith`.
    #[error("Session suspended at '{node}': {reason}")]
    Suspended { node: String, reason: String },

    /// A conditional edge's router returned a label with no matching branch.
    #[error("Unknown branch '{label}' from node '{node}'")]
    UnknownBranch { node: String, label: String },

    /// The graph executed more supersteps than `MAX_GRAPH_STEPS` allows.
    #[error("Exceeded step budget after {steps} steps")]
    ExceededStepBudget { steps: u32 },

    /// The critic requested another replan past `MAX_REPLAN_ITERATIONS`.
    /// Callers should never see this surface as a failure: the critic
    /// converts it into a force-approval decision before it leaves the
    /// critic node.
    #[error("Exceeded replan budget after {iterations} iterations")]
    ExceededReplanBudget { iterations: u32 },

    /// Session was cancelled by the caller. Partial state up to the last
    /// checkpoint is preserved, not discarded.
    #[error("Session cancelled: {0}")]
    Cancelled(String),

    /// State reducer or schema error.
    #[error("State error{}: {error}", node.as_ref().map(|n| format!(" in node '{}'", n)).unwrap_or_default())]
    StateError {
        node: Option<String>,
        error: String,
    },

    /// Checkpoint persistence error.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] travel_checkpoint::CheckpointError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error (bad timeout, bad concurrency bound, etc).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation exceeded its configured timeout. Whether this is fatal
    /// depends on which worker: fatal for planner/geography/critic/finalizer,
    /// a fallback trigger for research/price_scraper/food_culture.
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Application-defined error not covered by another variant.
    #[error("{0}")]
    Custom(String),
}

impl GraphError {
    pub fn node_execution(node: impl Into<String>, error: impl Into<String>) -> Self {
        Self::NodeExecution {
            node: node.into(),
            error: error.into(),
        }
    }

    pub fn state_error(node: Option<impl Into<String>>, error: impl Into<String>) -> Self {
        Self::StateError {
            node: node.map(|n| n.into()),
            error: error.into(),
        }
    }

    pub fn source_failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self::SourceFailure {
            source: source.into(),
            error: error.into(),
        }
    }

    pub fn suspended(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Suspended {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors transition the session to `failed`; everything else is
    /// either absorbed (recorded, execution continues) or a legitimate
    /// non-error status (`Suspended`).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GraphError::SourceFailure { .. } | GraphError::Suspended { .. }
        )
    }
}
