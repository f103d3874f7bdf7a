//! # travel-cache
//!
//! The single content-addressed cache shared across planning sessions,
//! with domain-aware TTLs: long TTLs for stable facts (attractions,
//! stations), short ones for volatile transport prices, shorter still for
//! high-frequency metro pairs.
//!
//! ## Modules
//!
//! - [`cache`] -- [`cache::Cache`], the store itself
//! - [`domain`] -- [`domain::CacheDomain`] and its TTLs, [`domain::is_high_frequency_route`]
//! - [`key`] -- key-generation helpers per query kind

pub mod cache;
pub mod domain;
pub mod key;

pub use cache::{Cache, CacheStats};
pub use domain::{is_high_frequency_route, CacheDomain, DEFAULT_TTL};
