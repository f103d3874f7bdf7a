//! # travel-engine
//!
//! The session API facade: wires the ten worker nodes from `travel-workers`
//! into the fixed planning pipeline, compiles it against `travel-core`'s
//! graph executor, and exposes `start_session`/`resume_session`/
//! `get_session`/`cancel_session`/`stream_session` as the single entry point
//! a caller (CLI, HTTP handler, test) needs.
//!
//! ## Modules
//!
//! - [`config`] -- [`config::EngineConfig`], resolved once at bootstrap
//! - [`pipeline`] -- [`pipeline::build_graph`], the fixed ten-node topology
//! - [`session`] -- [`session::SessionApi`], [`session::SessionResult`]
//! - [`error`] -- [`error::EngineError`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use travel_engine::{EngineConfig, SessionApi, SessionResult};
//! use travel_workers::WorkerContext;
//! use travel_oracle::MockOracle;
//! use travel_cache::Cache;
//! use travel_checkpoint::InMemoryCheckpointSaver;
//! use std::sync::Arc;
//!
//! # async fn example() -> travel_engine::Result<()> {
//! let ctx = WorkerContext::new(Arc::new(MockOracle::new()), Cache::new());
//! let checkpointer = Arc::new(InMemoryCheckpointSaver::new());
//! let api = SessionApi::new(ctx, checkpointer, EngineConfig::default())?;
//!
//! match api.start_session("5 days in Tokyo and Kyoto").await? {
//!     SessionResult::Completed { state, .. } => println!("{state}"),
//!     SessionResult::Suspended { questions, .. } => println!("{questions:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use pipeline::build_graph;
pub use session::{is_finalized, SessionApi, SessionResult, SessionSnapshot};
