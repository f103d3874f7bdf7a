//! The [`Oracle`] trait: the single capability boundary every worker calls
//! through to reach a language model.
//!
//! A worker never talks to an HTTP client directly. It builds a system
//! prompt, a user prompt, and a JSON Schema describing the shape it needs
//! back, and calls [`Oracle::structured_call`]. This keeps workers testable
//! against [`crate::mock::MockOracle`] without any network dependency, and
//! keeps provider-specific request/response shapes out of worker code
//! entirely.

use crate::config::WorkerKind;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A black-box capability that turns a prompt plus an output schema into a
/// validated JSON value.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Make a structured call. Implementations MUST validate the returned
    /// value against `output_schema` before returning it -- a worker that
    /// gets `Ok(value)` back should never need to re-validate.
    async fn structured_call(
        &self,
        worker: WorkerKind,
        system_prompt: &str,
        user_prompt: &str,
        output_schema: &Value,
    ) -> Result<Value>;
}
