//! Oracle configuration: connection settings plus a per-worker
//! temperature/model table.
//!
//! Workers differ widely in how deterministic their calls should be: the
//! critic needs to be nearly deterministic to give consistent approve/
//! reject verdicts across replans, while food/culture narration benefits
//! from more variety. Rather than threading a temperature argument through
//! every worker call, each worker looks up its own settings by
//! [`WorkerKind`] once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Identifies which worker is making an oracle call, for config lookup and
/// for tracing/log correlation -- it carries no behavior of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    Clarification,
    Planner,
    Geography,
    Research,
    FoodCulture,
    TransportBudget,
    Critic,
    Finalizer,
}

impl WorkerKind {
    /// Default sampling temperature, carried over from the reference
    /// planner's per-agent tuning: the critic and transport/geography
    /// workers stay close to deterministic, narrative workers run hotter.
    pub fn default_temperature(self) -> f32 {
        match self {
            WorkerKind::Clarification => 0.3,
            WorkerKind::Planner => 0.7,
            WorkerKind::Geography => 0.2,
            WorkerKind::Research => 0.3,
            WorkerKind::FoodCulture => 0.5,
            WorkerKind::TransportBudget => 0.2,
            WorkerKind::Critic => 0.1,
            WorkerKind::Finalizer => 0.4,
        }
    }
}

/// Per-worker override of model and temperature, layered over
/// [`OracleConfig`]'s connection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    pub model: String,
    pub temperature: f32,
}

/// Connection settings plus the per-worker settings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    pub max_retries: u32,
    pub workers: HashMap<WorkerKind, WorkerSettings>,
}

impl OracleConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            default_model: default_model.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            workers: HashMap::new(),
        }
    }

    /// Build from environment variables, following the project's
    /// `<PREFIX>_API_KEY` / `<PREFIX>_BASE_URL` / `<PREFIX>_MODEL` convention.
    pub fn from_env(prefix: &str) -> Result<Self, std::env::VarError> {
        let api_key = std::env::var(format!("{prefix}_API_KEY"))?;
        let base_url = std::env::var(format!("{prefix}_BASE_URL"))
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let default_model = std::env::var(format!("{prefix}_MODEL"))
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self::new(base_url, api_key, default_model))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_worker(mut self, worker: WorkerKind, settings: WorkerSettings) -> Self {
        self.workers.insert(worker, settings);
        self
    }

    /// Resolve the effective model and temperature for a worker, falling
    /// back to the crate's default model and [`WorkerKind::default_temperature`]
    /// when no override was registered.
    pub fn resolve(&self, worker: WorkerKind) -> WorkerSettings {
        self.workers.get(&worker).cloned().unwrap_or_else(|| WorkerSettings {
            model: self.default_model.clone(),
            temperature: worker.default_temperature(),
        })
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_default_temperature() {
        let config = OracleConfig::new("https://api.openai.com/v1", "key", "gpt-4o-mini");
        let settings = config.resolve(WorkerKind::Critic);
        assert_eq!(settings.temperature, 0.1);
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn test_resolve_honors_worker_override() {
        let config = OracleConfig::new("https://api.openai.com/v1", "key", "gpt-4o-mini").with_worker(
            WorkerKind::Planner,
            WorkerSettings { model: "gpt-4o".to_string(), temperature: 0.9 },
        );
        let settings = config.resolve(WorkerKind::Planner);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.temperature, 0.9);
    }
}
