//! [`CheckpointSaver`] - the storage abstraction a session uses to persist
//! and recover its state.
//!
//! The fabric has no need for the general Pregel checkpointer contract
//! (channel versions, pending writes, thread namespaces, history queries):
//! a session is single-threaded and only ever needs its most recent steps,
//! so the contract is reduced to three operations.
//!
//! ```rust
//! use travel_checkpoint::{CheckpointSaver, InMemoryCheckpointSaver};
//! use serde_json::json;
//!
//! # async fn example() {
//! let saver = InMemoryCheckpointSaver::new();
//! saver.put("session-1", 0, json!({"messages": []})).await.unwrap();
//! let state = saver.get("session-1", None).await.unwrap();
//! assert!(state.is_some());
//! # }
//! ```

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Storage backend for session checkpoints.
///
/// Implementations must be `Send + Sync` to be shared across concurrently
/// running sessions.
#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Persist `state` as the checkpoint for `session_id` at `step`.
    async fn put(&self, session_id: &str, step: u32, state: Value) -> Result<()>;

    /// Fetch a session's state. `step: None` returns the latest checkpoint;
    /// `step: Some(n)` returns that exact step, or `Ok(None)` if it was
    /// never recorded.
    async fn get(&self, session_id: &str, step: Option<u32>) -> Result<Option<Value>>;

    /// Remove all checkpoints for a session (called on session completion
    /// or explicit cancellation cleanup).
    async fn delete(&self, session_id: &str) -> Result<()>;
}
