//! # travel-workers
//!
//! The ten worker node implementations that do the actual planning work in
//! the travel coordination fabric: each is a plain `async fn(state, ctx)`
//! that reads whatever fields it needs out of the shared session state,
//! makes one oracle call (or a bounded fan-out of them), and returns a
//! partial state update. None of them know about the graph, the
//! checkpointer, or how they're wired together -- that's `travel-engine`'s
//! job, which turns each `run` function into a `travel_core::graph::NodeExecutor`
//! closure over a shared [`context::WorkerContext`].
//!
//! ## Modules
//!
//! - [`context`] -- [`context::WorkerContext`], the oracle/cache/fan-out/data-source bundle every worker takes
//! - [`error`] -- [`error::WorkerError`], the crate's error type
//! - [`sources`] -- [`sources::PlacesSource`] and [`sources::PriceSource`], the external data-source interfaces
//! - [`dates`] -- fuzzy/structured travel-date parsing shared by `process_answers`
//! - [`clarification`], [`process_answers`], [`planner`], [`geography`], [`research`],
//!   [`food_culture`], [`price_scraper`], [`transport_budget`], [`critic`], [`finalizer`] --
//!   one module per worker, matching the planning pipeline's order

pub mod clarification;
pub mod context;
pub mod critic;
pub mod dates;
pub mod error;
pub mod finalizer;
pub mod food_culture;
pub mod geography;
pub mod planner;
pub mod price_scraper;
pub mod process_answers;
pub mod research;
pub mod sources;
pub mod transport_budget;

pub use context::WorkerContext;
pub use error::{Result, WorkerError};
