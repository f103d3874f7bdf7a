//! # travel-core
//!
//! Graph executor, state reducers, and the suspend/resume protocol shared by
//! every worker in the travel-planning coordination fabric.
//!
//! This crate is a direct descendant of a Rust port of Python's LangGraph:
//! it keeps that project's node/edge vocabulary and its reducer-based state
//! model, but replaces the general multi-channel Pregel engine with a small
//! single-session executor (see [`executor`]) built for this fabric's actual
//! execution model -- one session runs cooperatively at a time, and there is
//! exactly one suspension point (clarification), not generic
//! before/after-node interrupts.
//!
//! ## Modules
//!
//! - [`state`] -- [`StateSchema`] and the reducer trait (overwrite, append, merge, sum)
//! - [`graph`] -- [`Graph`], [`NodeSpec`], [`Edge`], [`BranchTarget`]
//! - [`executor`] -- [`CompiledGraph`], [`RunOutcome`], [`StreamEvent`]
//! - [`error`] -- [`GraphError`], the fabric's error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use travel_core::{Graph, NodeSpec, StateSchema, AppendReducer, CompiledGraph, RunOutcome, START, END};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let mut graph = Graph::new();
//! graph.add_node("planner".to_string(), NodeSpec {
//!     name: "planner".to_string(),
//!     executor: Arc::new(|state| Box::pin(async move {
//!         Ok(json!({"messages": ["planned"]}))
//!     })),
//!     reads: vec![],
//!     writes: vec!["messages".to_string()],
//! });
//! graph.add_edge(START.to_string(), "planner".to_string());
//! graph.add_edge("planner".to_string(), END.to_string());
//!
//! let mut schema = StateSchema::new();
//! schema.add_field("messages", Box::new(AppendReducer));
//!
//! let compiled = CompiledGraph::compile(graph, schema).unwrap();
//! if let RunOutcome::Completed(state) = compiled.run(json!({"messages": []})).await {
//!     println!("{state}");
//! }
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod graph;
pub mod state;

pub use error::{GraphError, Result};
pub use executor::{CompiledGraph, RunConfig, RunOutcome, StreamEvent, DEFAULT_MAX_GRAPH_STEPS};
pub use graph::{BranchTarget, Edge, Graph, NodeExecutor, NodeId, NodeSpec, END, START};
pub use state::{AppendReducer, MergeReducer, OverwriteReducer, Reducer, StateError, StateSchema, SumReducer};
