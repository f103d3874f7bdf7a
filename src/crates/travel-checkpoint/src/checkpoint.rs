//! Checkpoint record: a single snapshot of session state at a given step.
//!
//! Unlike a general-purpose Pregel checkpointer, a session here has exactly
//! one channel worth persisting -- the whole [`serde_json::Value`] state --
//! so a checkpoint is just `(session_id, step, state, timestamp)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single persisted snapshot of a session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub session_id: String,
    pub step: u32,
    pub state: Value,
    pub ts: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(session_id: impl Into<String>, step: u32, state: Value) -> Self {
        Self {
            session_id: session_id.into(),
            step,
            state,
            ts: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkpoint_creation() {
        let checkpoint = Checkpoint::new("session-1", 3, json!({"messages": []}));
        assert_eq!(checkpoint.session_id, "session-1");
        assert_eq!(checkpoint.step, 3);
    }
}
