//! Shared capabilities every worker function needs: the oracle, the cache,
//! the fan-out concurrency bound, and the (optional) external data-source
//! capabilities. A single [`WorkerContext`] is built once at boundary
//! bootstrap and cloned cheaply into every node closure.

use crate::sources::{PlacesSource, PriceSource};
use std::sync::Arc;
use travel_cache::Cache;
use travel_oracle::Oracle;

/// Max parallel subtasks a fan-out worker (research, price-scraper) spawns.
pub const DEFAULT_FANOUT: usize = 8;

#[derive(Clone)]
pub struct WorkerContext {
    pub oracle: Arc<dyn Oracle>,
    pub cache: Cache,
    pub fanout: usize,
    /// Upper bound on critic -> planner replan loops; mirrors
    /// `EngineConfig::max_replan_iterations` for callers that build a
    /// `WorkerContext` directly rather than through the engine.
    pub max_replan_iterations: u64,
    /// Cap on clarification questions surfaced in a single round; mirrors
    /// `EngineConfig::max_clarification_questions`.
    pub max_clarification_questions: usize,
    /// Places/review lookups. `None` means no provider is wired in and
    /// research/food-culture always take the oracle fallback path.
    pub places: Option<Arc<dyn PlacesSource>>,
    /// Transport-price scraping. `None` means price-scraper always falls
    /// back to the oracle's own price estimate.
    pub prices: Option<Arc<dyn PriceSource>>,
}

impl WorkerContext {
    pub fn new(oracle: Arc<dyn Oracle>, cache: Cache) -> Self {
        Self {
            oracle,
            cache,
            fanout: DEFAULT_FANOUT,
            max_replan_iterations: crate::critic::MAX_REPLAN_ITERATIONS,
            max_clarification_questions: crate::clarification::DEFAULT_MAX_CLARIFICATION_QUESTIONS,
            places: None,
            prices: None,
        }
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_max_replan_iterations(mut self, max_replan_iterations: u64) -> Self {
        self.max_replan_iterations = max_replan_iterations;
        self
    }

    pub fn with_max_clarification_questions(mut self, max_clarification_questions: usize) -> Self {
        self.max_clarification_questions = max_clarification_questions;
        self
    }

    pub fn with_places(mut self, places: Arc<dyn PlacesSource>) -> Self {
        self.places = Some(places);
        self
    }

    pub fn with_prices(mut self, prices: Arc<dyn PriceSource>) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Bounded parallelism for a fan-out over `n` items: `min(n, fanout)`.
    pub fn concurrency_for(&self, n: usize) -> usize {
        n.min(self.fanout).max(1)
    }
}
