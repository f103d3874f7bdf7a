//! Data-source capabilities: places/review lookups and transport-price
//! scraping are out-of-scope external collaborators here -- only their
//! interface to the core is specified. [`PlacesSource`] and [`PriceSource`]
//! are that interface, mirrored on [`travel_oracle::Oracle`]'s shape: a
//! worker calls through the trait and never touches a concrete provider
//! SDK. A deployment with no real source wired in (`WorkerContext`'s
//! `places`/`prices` left `None`) always falls through to the oracle
//! fallback path the contracts require.

use async_trait::async_trait;
use serde_json::Value;

/// A single normalized attraction or restaurant record from an external
/// source, or `None` when the source found nothing.
#[async_trait]
pub trait PlacesSource: Send + Sync {
    async fn search_attractions(&self, city: &str, country: &str, max_results: usize) -> Option<Vec<Value>>;
    async fn search_restaurants(&self, city: &str, country: &str, max_results: usize) -> Option<Vec<Value>>;
    async fn search_hotels(&self, city: &str, country: &str, budget_level: &str) -> Option<Vec<Value>>;
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Normalized price records in a common shape. Source failures
    /// are the source's own responsibility to swallow; this returns an
    /// empty vec rather than an error.
    async fn scrape_segment(&self, from_city: &str, to_city: &str, country: &str, travel_date: &str) -> Vec<Value>;

    async fn find_nearest_stations(&self, city: &str, country: &str) -> Option<Value>;
}
