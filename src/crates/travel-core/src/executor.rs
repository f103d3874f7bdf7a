//! Single-session graph executor.
//!
//! This replaces the teacher's general multi-channel Pregel engine (channel
//! versioning, `Topic`/`BinaryOp` channels, parallel superstep barriers) with
//! a small superstep loop purpose-built for this fabric's execution model:
//! exactly one session runs cooperatively at a time, state merges happen
//! through [`crate::state::StateSchema`] reducers rather than channel types,
//! and there is exactly one kind of pause (suspend/resume), not generic
//! before/after-node interrupts.
//!
//! `CompiledGraph::run` walks direct and conditional edges until it reaches
//! [`END`], a suspension branch, or the step budget is exhausted.
//!
//! ```rust,no_run
//! use travel_core::executor::{CompiledGraph, RunConfig, RunOutcome};
//! use travel_core::graph::Graph;
//! use travel_core::state::StateSchema;
//! use serde_json::json;
//!
//! # async fn run(graph: Graph, schema: StateSchema) {
//! let compiled = CompiledGraph::compile(graph, schema).unwrap();
//! match compiled.run(json!({})).await {
//!     RunOutcome::Completed(state) => println!("done: {state}"),
//!     RunOutcome::Suspended { reason, waiting_for } => {
//!         println!("suspended at {waiting_for}: {reason}")
//!     }
//!     RunOutcome::Failed(err) => eprintln!("failed: {err}"),
//! }
//! # }
//! ```

use crate::error::GraphError;
use crate::graph::{BranchTarget, Edge, Graph, NodeId, END, START};
use crate::state::StateSchema;
use serde_json::Value;
use std::sync::Arc;

/// Default bound on the number of supersteps a single `run` may take before
/// it is aborted with [`GraphError::ExceededStepBudget`].
pub const DEFAULT_MAX_GRAPH_STEPS: u32 = 40;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub max_steps: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_GRAPH_STEPS,
        }
    }
}

/// The outcome of a single `run`/`run_from` call. Suspend/resume is modeled
/// as an explicit sum type rather than an exception or coroutine
/// save/restore: the only durable reference across a suspension is the
/// checkpoint itself.
#[derive(Debug)]
pub enum RunOutcome {
    /// The graph reached `END`. Carries the full accumulated state.
    Completed(Value),
    /// The graph reached a conditional branch mapped to
    /// [`BranchTarget::Suspend`]. `waiting_for` is the node the suspension
    /// happened at; `reason` is the branch's payload (e.g. what's needed to
    /// resume).
    Suspended { reason: String, waiting_for: String },
    /// A fatal error stopped execution. Absorbed errors (source failures)
    /// never produce this -- they are caught inside node executors and
    /// folded into state instead.
    Failed(GraphError),
}

/// One step of [`CompiledGraph::stream`]'s event feed. Mirrors the wire
/// format callers see over `StreamSession`.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    NodeStart { node: String },
    NodeEnd { node: String },
    Suspended { reason: String, waiting_for: String },
    Error { message: String },
    Complete,
}

enum NextStep {
    Node(NodeId),
    Suspend(String),
}

/// A validated, executable [`Graph`] paired with the [`StateSchema`] that
/// governs how node outputs merge into accumulated state.
pub struct CompiledGraph {
    graph: Arc<Graph>,
    schema: Arc<StateSchema>,
}

impl CompiledGraph {
    /// Validates the graph structure and wraps it for execution.
    pub fn compile(graph: Graph, schema: StateSchema) -> Result<Self, GraphError> {
        graph.validate().map_err(GraphError::Validation)?;
        Ok(Self {
            graph: Arc::new(graph),
            schema: Arc::new(schema),
        })
    }

    /// Run from the graph's configured entry node with default step budget.
    #[tracing::instrument(skip(self, state), fields(entry = %self.graph.entry))]
    pub async fn run(&self, state: Value) -> RunOutcome {
        self.run_from(self.graph.entry.clone(), state, RunConfig::default()).await
    }

    /// Run starting at an arbitrary node. Used by `ResumeWith` to re-enter at
    /// `process_answers` rather than back at `clarification`.
    #[tracing::instrument(skip(self, state), fields(start = %start))]
    pub async fn run_from(&self, start: NodeId, mut state: Value, config: RunConfig) -> RunOutcome {
        let mut current = start;
        let mut steps: u32 = 0;

        tracing::info!(node = %current, "run starting");

        loop {
            if current == END {
                tracing::info!("run completed");
                return RunOutcome::Completed(state);
            }

            // START is a virtual routing point: it never executes, it only
            // carries the edge(s) leading to the real first node.
            if current == START {
                current = match self.next_step(&current, &state) {
                    Ok(NextStep::Node(next)) => next,
                    Ok(NextStep::Suspend(reason)) => {
                        return RunOutcome::Suspended {
                            reason,
                            waiting_for: current,
                        }
                    }
                    Err(err) => return RunOutcome::Failed(err),
                };
                continue;
            }

            steps += 1;
            if steps > config.max_steps {
                tracing::error!(steps, "exceeded step budget");
                return RunOutcome::Failed(GraphError::ExceededStepBudget { steps });
            }

            let node = match self.graph.nodes.get(&current) {
                Some(n) => n.clone(),
                None => {
                    return RunOutcome::Failed(GraphError::Validation(format!(
                        "node '{current}' does not exist"
                    )))
                }
            };

            tracing::debug!(node = %current, "node_start");
            let update = match (node.executor)(state.clone()).await {
                Ok(update) => update,
                Err(err) => {
                    tracing::error!(node = %current, error = %err, "node execution failed");
                    return RunOutcome::Failed(GraphError::node_execution(current.clone(), err.to_string()));
                }
            };

            if let Err(err) = self.schema.apply(&mut state, &update) {
                return RunOutcome::Failed(GraphError::state_error(Some(current.clone()), err.to_string()));
            }
            tracing::debug!(node = %current, "node_end");

            current = match self.next_step(&current, &state) {
                Ok(NextStep::Node(next)) => next,
                Ok(NextStep::Suspend(reason)) => {
                    tracing::info!(node = %current, reason = %reason, "suspended");
                    return RunOutcome::Suspended {
                        reason,
                        waiting_for: current,
                    };
                }
                Err(err) => return RunOutcome::Failed(err),
            };
        }
    }

    /// Stream `node_start`/`node_end` events as the run progresses, finishing
    /// with `Suspended`, `Error`, or `Complete`.
    pub fn stream(&self, state: Value) -> impl futures::Stream<Item = StreamEvent> + '_ {
        let start = self.graph.entry.clone();
        self.stream_from(start, state, RunConfig::default())
    }

    pub fn stream_from(
        &self,
        start: NodeId,
        state: Value,
        config: RunConfig,
    ) -> impl futures::Stream<Item = StreamEvent> + '_ {
        async_stream::stream! {
            let mut current = start;
            let mut state = state;
            let mut steps: u32 = 0;

            loop {
                if current == END {
                    yield StreamEvent::Complete;
                    return;
                }

                if current == START {
                    match self.next_step(&current, &state) {
                        Ok(NextStep::Node(next)) => { current = next; continue; }
                        Ok(NextStep::Suspend(reason)) => {
                            yield StreamEvent::Suspended { reason, waiting_for: current };
                            return;
                        }
                        Err(err) => {
                            yield StreamEvent::Error { message: err.to_string() };
                            return;
                        }
                    }
                }

                steps += 1;
                if steps > config.max_steps {
                    yield StreamEvent::Error {
                        message: format!("exceeded step budget after {steps} steps"),
                    };
                    return;
                }

                let node = match self.graph.nodes.get(&current) {
                    Some(n) => n.clone(),
                    None => {
                        yield StreamEvent::Error { message: format!("node '{current}' does not exist") };
                        return;
                    }
                };

                yield StreamEvent::NodeStart { node: current.clone() };

                let update = match (node.executor)(state.clone()).await {
                    Ok(update) => update,
                    Err(err) => {
                        yield StreamEvent::Error { message: err.to_string() };
                        return;
                    }
                };

                if let Err(err) = self.schema.apply(&mut state, &update) {
                    yield StreamEvent::Error { message: err.to_string() };
                    return;
                }

                yield StreamEvent::NodeEnd { node: current.clone() };

                match self.next_step(&current, &state) {
                    Ok(NextStep::Node(next)) => current = next,
                    Ok(NextStep::Suspend(reason)) => {
                        yield StreamEvent::Suspended { reason, waiting_for: current };
                        return;
                    }
                    Err(err) => {
                        yield StreamEvent::Error { message: err.to_string() };
                        return;
                    }
                }
            }
        }
    }

    fn next_step(&self, from: &NodeId, state: &Value) -> Result<NextStep, GraphError> {
        let edges = match self.graph.edges.get(from) {
            Some(e) if !e.is_empty() => e,
            _ => return Ok(NextStep::Node(END.to_string())),
        };

        match &edges[0] {
            Edge::Direct(to) => Ok(NextStep::Node(to.clone())),
            Edge::Conditional { router, branches } => {
                let label = router(state);
                match branches.get(&label) {
                    Some(BranchTarget::Node(to)) => Ok(NextStep::Node(to.clone())),
                    Some(BranchTarget::Suspend(reason)) => Ok(NextStep::Suspend(reason.clone())),
                    None => Err(GraphError::UnknownBranch {
                        node: from.clone(),
                        label,
                    }),
                }
            }
        }
    }
}
