//! # travel-oracle
//!
//! The oracle capability boundary: every worker that needs a language
//! model call goes through [`Oracle::structured_call`], never through a
//! provider SDK directly.
//!
//! ## Modules
//!
//! - [`oracle`] -- the [`Oracle`] trait
//! - [`config`] -- [`config::OracleConfig`], per-[`config::WorkerKind`] temperature/model table
//! - [`http`] -- [`http::HttpOracle`], an OpenAI-compatible chat-completions backend
//! - [`mock`] -- [`mock::MockOracle`], a scripted double for tests
//! - [`error`] -- [`error::OracleError`]

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod oracle;

pub use config::{OracleConfig, WorkerKind, WorkerSettings};
pub use error::{OracleError, Result};
pub use http::HttpOracle;
pub use mock::MockOracle;
pub use oracle::Oracle;
