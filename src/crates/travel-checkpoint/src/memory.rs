//! In-memory checkpoint storage, the only backend this fabric ships.
//!
//! Sessions are expected to live for the duration of one planning
//! conversation (minutes, not hours), so an in-process `RwLock<HashMap>`
//! is the right default rather than a stepping stone to a database --
//! a durable backend can implement [`CheckpointSaver`] the same way a
//! caller would plug in Postgres or Redis, this just isn't that caller.

use crate::{
    checkpoint::Checkpoint,
    error::{CheckpointError, Result},
    traits::CheckpointSaver,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Storage = Arc<RwLock<HashMap<String, Vec<Checkpoint>>>>;

/// Reference [`CheckpointSaver`] implementation. Checkpoints for a session
/// are appended in step order; `get(session_id, None)` returns the last
/// entry, which is always the highest step recorded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointSaver {
    storage: Storage,
}

impl InMemoryCheckpointSaver {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.storage.read().await.len()
    }

    pub async fn checkpoint_count(&self, session_id: &str) -> usize {
        self.storage
            .read()
            .await
            .get(session_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl CheckpointSaver for InMemoryCheckpointSaver {
    async fn put(&self, session_id: &str, step: u32, state: Value) -> Result<()> {
        let mut storage = self.storage.write().await;
        let entries = storage.entry(session_id.to_string()).or_default();
        entries.push(Checkpoint::new(session_id, step, state));
        Ok(())
    }

    async fn get(&self, session_id: &str, step: Option<u32>) -> Result<Option<Value>> {
        let storage = self.storage.read().await;
        let Some(entries) = storage.get(session_id) else {
            return Ok(None);
        };

        match step {
            Some(step) => Ok(entries
                .iter()
                .find(|entry| entry.step == step)
                .map(|entry| entry.state.clone())),
            None => Ok(entries.last().map(|entry| entry.state.clone())),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.storage.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_get_latest() {
        let saver = InMemoryCheckpointSaver::new();
        saver.put("s1", 0, json!({"step": 0})).await.unwrap();
        saver.put("s1", 1, json!({"step": 1})).await.unwrap();

        let latest = saver.get("s1", None).await.unwrap().unwrap();
        assert_eq!(latest, json!({"step": 1}));
    }

    #[tokio::test]
    async fn test_get_specific_step() {
        let saver = InMemoryCheckpointSaver::new();
        saver.put("s1", 0, json!({"step": 0})).await.unwrap();
        saver.put("s1", 1, json!({"step": 1})).await.unwrap();

        let step0 = saver.get("s1", Some(0)).await.unwrap().unwrap();
        assert_eq!(step0, json!({"step": 0}));
    }

    #[tokio::test]
    async fn test_get_missing_session_returns_none() {
        let saver = InMemoryCheckpointSaver::new();
        assert!(saver.get("nope", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_all_checkpoints() {
        let saver = InMemoryCheckpointSaver::new();
        saver.put("s1", 0, json!({})).await.unwrap();
        assert_eq!(saver.session_count().await, 1);

        saver.delete("s1").await.unwrap();
        assert_eq!(saver.session_count().await, 0);
        assert!(saver.get("s1", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkpoint_count_per_session() {
        let saver = InMemoryCheckpointSaver::new();
        saver.put("s1", 0, json!({})).await.unwrap();
        saver.put("s1", 1, json!({})).await.unwrap();
        saver.put("s2", 0, json!({})).await.unwrap();

        assert_eq!(saver.checkpoint_count("s1").await, 2);
        assert_eq!(saver.checkpoint_count("s2").await, 1);
    }

    #[tokio::test]
    async fn test_session_isolation() {
        let saver = InMemoryCheckpointSaver::new();
        saver.put("s1", 0, json!({"who": "s1"})).await.unwrap();
        saver.put("s2", 0, json!({"who": "s2"})).await.unwrap();

        assert_eq!(
            saver.get("s1", None).await.unwrap().unwrap()["who"],
            json!("s1")
        );
        assert_eq!(
            saver.get("s2", None).await.unwrap().unwrap()["who"],
            json!("s2")
        );
    }
}
