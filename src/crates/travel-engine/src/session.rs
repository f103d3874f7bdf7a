//! The session API facade: [`SessionApi`] wires the compiled graph, a
//! [`CheckpointSaver`], the cache, and the oracle into the five operations a
//! caller needs -- start, resume, inspect, cancel, and stream a planning
//! session. Nothing above this layer should need to touch the graph or the
//! worker contracts directly.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::pipeline::build_graph;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use travel_checkpoint::CheckpointSaver;
use travel_core::executor::{CompiledGraph, RunConfig, RunOutcome, StreamEvent};
use travel_types::{build_schema, SessionState};
use travel_workers::WorkerContext;
use uuid::Uuid;

/// What a `start_session`/`resume_session` call produces.
#[derive(Debug, Clone)]
pub enum SessionResult {
    /// The run reached the finalizer. Carries the full session state,
    /// including `final_itinerary`.
    Completed { session_id: String, state: Value },
    /// The run hit clarification's suspend branch. Carries the clarifying
    /// questions the caller must answer to resume.
    Suspended { session_id: String, questions: Vec<Value> },
}

/// A read-only view of a session's latest checkpoint, for `get_session`.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: Value,
    pub step: u32,
}

/// Wires a compiled graph to a checkpoint backend, a cache, and an oracle.
/// One `SessionApi` instance serves every session; sessions are identified
/// by an opaque id the facade mints on `start_session`.
pub struct SessionApi {
    compiled: CompiledGraph,
    checkpointer: Arc<dyn CheckpointSaver>,
    config: EngineConfig,
    steps: RwLock<HashMap<String, u32>>,
    cancelled: RwLock<HashSet<String>>,
}

impl SessionApi {
    pub fn new(ctx: WorkerContext, checkpointer: Arc<dyn CheckpointSaver>, config: EngineConfig) -> Result<Self> {
        let graph = build_graph(ctx, &config);
        let compiled = CompiledGraph::compile(graph, build_schema()).map_err(EngineError::Graph)?;
        Ok(Self {
            compiled,
            checkpointer,
            config,
            steps: RwLock::new(HashMap::new()),
            cancelled: RwLock::new(HashSet::new()),
        })
    }

    /// Begin a new session from a free-text request. Runs from the graph's
    /// entry (clarification) through to either a suspension or the
    /// finalizer.
    pub async fn start_session(&self, user_request: impl Into<String>) -> Result<SessionResult> {
        let session_id = Uuid::new_v4().to_string();
        let state = SessionState::initial(user_request).into_value();

        self.checkpoint(&session_id, state.clone()).await?;

        let run_config = RunConfig { max_steps: self.config.recursion_limit };
        let outcome = self.compiled.run_from("clarification".to_string(), state, run_config).await;
        self.finish(session_id, outcome).await
    }

    /// Resume a suspended session, folding `answers` into
    /// `clarification_answers` and re-entering at `process_answers`.
    pub async fn resume_session(&self, session_id: &str, answers: Value) -> Result<SessionResult> {
        if self.cancelled.read().await.contains(session_id) {
            return Err(EngineError::SessionCancelled(session_id.to_string()));
        }

        let mut state = self
            .checkpointer
            .get(session_id, None)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;

        if !state["clarification_needed"].as_bool().unwrap_or(false) {
            return Err(EngineError::NotSuspended(session_id.to_string()));
        }

        state["clarification_answers"] = answers;
        self.checkpoint(session_id, state.clone()).await?;

        let run_config = RunConfig { max_steps: self.config.recursion_limit };
        let outcome = self.compiled.run_from("process_answers".to_string(), state, run_config).await;
        self.finish(session_id.to_string(), outcome).await
    }

    /// Read the latest checkpoint without advancing the session.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionSnapshot>> {
        let Some(state) = self.checkpointer.get(session_id, None).await? else {
            return Ok(None);
        };
        let step = self.steps.read().await.get(session_id).copied().unwrap_or(0);
        Ok(Some(SessionSnapshot { session_id: session_id.to_string(), state, step }))
    }

    /// Mark a session terminated. Its checkpoint remains for inspection via
    /// `get_session`, but `resume_session` on it will error.
    pub async fn cancel_session(&self, session_id: &str) -> Result<()> {
        if self.checkpointer.get(session_id, None).await?.is_none() {
            return Err(EngineError::SessionNotFound(session_id.to_string()));
        }
        self.cancelled.write().await.insert(session_id.to_string());
        Ok(())
    }

    /// The node-transition event stream for live progress, starting from
    /// whatever state the caller supplies (typically a fresh session's
    /// initial state, or a resumed session's checkpoint).
    pub fn stream_session(&self, session_id: &str, state: Value) -> impl futures::Stream<Item = StreamEvent> + '_ {
        tracing::debug!(session_id = %session_id, "streaming session");
        self.compiled.stream(state)
    }

    async fn checkpoint(&self, session_id: &str, state: Value) -> Result<()> {
        let mut steps = self.steps.write().await;
        let step = steps.entry(session_id.to_string()).or_insert(0);
        self.checkpointer.put(session_id, *step, state).await?;
        *step += 1;
        Ok(())
    }

    async fn finish(&self, session_id: String, outcome: RunOutcome) -> Result<SessionResult> {
        match outcome {
            RunOutcome::Completed(state) => {
                self.checkpoint(&session_id, state.clone()).await?;
                Ok(SessionResult::Completed { session_id, state })
            }
            RunOutcome::Suspended { reason, waiting_for } => {
                let mut state = self.checkpointer.get(&session_id, None).await?.unwrap_or(Value::Null);
                state["clarification_needed"] = Value::Bool(true);
                self.checkpoint(&session_id, state.clone()).await?;
                let questions = state["clarification_questions"].as_array().cloned().unwrap_or_default();
                tracing::info!(session_id = %session_id, waiting_for = %waiting_for, reason = %reason, "session suspended");
                Ok(SessionResult::Suspended { session_id, questions })
            }
            RunOutcome::Failed(err) => Err(EngineError::Graph(err)),
        }
    }
}

/// Whether `state` represents a finalized itinerary -- the condition the
/// critic's branch router checks, exposed for callers building their own
/// partial-run tooling around [`SessionApi::stream_session`].
pub fn is_finalized(state: &Value) -> bool {
    state.get("final_itinerary").map(|v| !v.is_null()).unwrap_or(false)
}
