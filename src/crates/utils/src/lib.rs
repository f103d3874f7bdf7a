//! Utility functions and helpers for the travel-planning fabric.
//!
//! This crate provides generic configuration and error-handling helpers
//! shared by crates that don't pull in the full `tooling` stack.
//!
//! # Modules
//!
//! ## Config (`config`)
//!
//! Configuration management utilities for environment variables and file loading:
//!
//! ```rust,ignore
//! use utils::config::{get_env, get_env_parse, load_config_file};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AppConfig {
//!     api_key: String,
//!     port: u16,
//! }
//!
//! // Load from environment
//! let api_key = get_env("API_KEY")?;
//! let port = get_env_parse::<u16>("PORT")?;
//!
//! // Load from file
//! let config: AppConfig = load_config_file("config.yaml")?;
//! ```
//!
//! # Features
//!
//! - `config` - Configuration utilities (enabled by default)

pub mod error;

#[cfg(feature = "config")]
pub mod config;

// Re-export commonly used types
pub use error::{Result, UtilsError};

#[cfg(feature = "config")]
pub use config::{
    get_env, get_env_bool, get_env_bool_or, get_env_or, get_env_parse, get_env_parse_or,
    load_config_file, load_json_config, load_yaml_config, ConfigBuilder, FromEnv, ValidateConfig,
};
