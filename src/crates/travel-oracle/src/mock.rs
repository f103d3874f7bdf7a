//! Deterministic [`Oracle`] double for tests.
//!
//! Scenario tests need an oracle that returns an exact, known value for the
//! Nth call to a given worker without touching the network. [`MockOracle`]
//! queues responses per [`WorkerKind`] and pops them in call order; a
//! worker that calls more times than the test queued responses for gets a
//! [`OracleError::Other`] describing which worker ran dry, which surfaces
//! as a clear test failure instead of a silent default.

use crate::config::WorkerKind;
use crate::error::{OracleError, Result};
use crate::oracle::Oracle;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockOracle {
    queued: Mutex<HashMap<WorkerKind, Vec<Value>>>,
    calls: Mutex<Vec<(WorkerKind, String)>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `response` to be returned the next time `worker` is called.
    /// Multiple calls append, so `queue` twice to script two successive
    /// calls (e.g. a critic's first "replan" then second "approve").
    pub fn queue(&self, worker: WorkerKind, response: Value) -> &Self {
        self.queued.lock().unwrap().entry(worker).or_default().push(response);
        self
    }

    /// The prompts every call received, in call order, for assertions.
    pub fn call_log(&self) -> Vec<(WorkerKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn structured_call(
        &self,
        worker: WorkerKind,
        _system_prompt: &str,
        user_prompt: &str,
        _output_schema: &Value,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push((worker, user_prompt.to_string()));

        let mut queued = self.queued.lock().unwrap();
        let queue = queued.entry(worker).or_default();
        if queue.is_empty() {
            return Err(OracleError::Other(format!(
                "mock oracle has no queued response left for {worker:?}"
            )));
        }
        Ok(queue.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_queued_responses_in_order() {
        let oracle = MockOracle::new();
        oracle.queue(WorkerKind::Critic, json!({"decision": "replan"}));
        oracle.queue(WorkerKind::Critic, json!({"decision": "approve"}));

        let first = oracle
            .structured_call(WorkerKind::Critic, "sys", "first", &json!({}))
            .await
            .unwrap();
        let second = oracle
            .structured_call(WorkerKind::Critic, "sys", "second", &json!({}))
            .await
            .unwrap();

        assert_eq!(first, json!({"decision": "replan"}));
        assert_eq!(second, json!({"decision": "approve"}));
    }

    #[tokio::test]
    async fn test_empty_queue_errors_clearly() {
        let oracle = MockOracle::new();
        let result = oracle.structured_call(WorkerKind::Planner, "sys", "user", &json!({})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_call_log_records_prompts() {
        let oracle = MockOracle::new();
        oracle.queue(WorkerKind::Planner, json!({}));
        oracle.structured_call(WorkerKind::Planner, "sys", "plan my trip", &json!({})).await.unwrap();

        let log = oracle.call_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, "plan my trip");
    }
}
