//! Cache domains and their default TTLs.
//!
//! Mirrors the reference planner's split between `browser_cache` (stable
//! content: attractions, reviews) and `transport_cache` (volatile prices,
//! where high-frequency routes get a shorter TTL than standard ones).

use std::time::Duration;

/// The fallback TTL for entries set without an explicit domain, matching
/// `CACHE_TTL_DEFAULT`.
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Which kind of data a cache entry holds, used only to pick a default TTL
/// -- it is not stored alongside the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDomain {
    AttractionListings,
    RestaurantReviews,
    TransportPrice { high_frequency: bool },
    StationFacts,
}

impl CacheDomain {
    pub fn ttl(self) -> Duration {
        match self {
            CacheDomain::AttractionListings => Duration::from_secs(7 * 24 * 3600),
            CacheDomain::RestaurantReviews => Duration::from_secs(24 * 3600),
            CacheDomain::TransportPrice { high_frequency: true } => Duration::from_secs(2 * 3600),
            CacheDomain::TransportPrice { high_frequency: false } => Duration::from_secs(4 * 3600),
            CacheDomain::StationFacts => Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// Curated set of metro pairs whose prices change often enough to warrant
/// the shorter `TransportPrice { high_frequency: true }` TTL.
const HIGH_FREQUENCY_ROUTES: &[(&str, &str)] = &[
    ("delhi", "mumbai"),
    ("delhi", "bangalore"),
    ("delhi", "bengaluru"),
    ("mumbai", "bangalore"),
    ("mumbai", "bengaluru"),
    ("mumbai", "goa"),
    ("delhi", "kolkata"),
    ("delhi", "chennai"),
    ("mumbai", "chennai"),
    ("new york", "london"),
    ("tokyo", "osaka"),
    ("singapore", "kuala lumpur"),
    ("hong kong", "singapore"),
    ("dubai", "mumbai"),
    ("dubai", "delhi"),
];

/// A route is high-frequency if its unordered `{from, to}` pair appears in
/// [`HIGH_FREQUENCY_ROUTES`], case-insensitively and in either direction.
pub fn is_high_frequency_route(from: &str, to: &str) -> bool {
    let from = from.trim().to_lowercase();
    let to = to.trim().to_lowercase();
    HIGH_FREQUENCY_ROUTES
        .iter()
        .any(|(a, b)| (*a == from && *b == to) || (*a == to && *b == from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_frequency_route_matches_either_direction() {
        assert!(is_high_frequency_route("Delhi", "Mumbai"));
        assert!(is_high_frequency_route("mumbai", "DELHI"));
    }

    #[test]
    fn test_unlisted_route_is_not_high_frequency() {
        assert!(!is_high_frequency_route("Paris", "Berlin"));
    }

    #[test]
    fn test_domain_ttls_match_spec_tiers() {
        assert_eq!(CacheDomain::AttractionListings.ttl(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(CacheDomain::RestaurantReviews.ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(
            CacheDomain::TransportPrice { high_frequency: true }.ttl(),
            Duration::from_secs(2 * 3600)
        );
        assert_eq!(
            CacheDomain::TransportPrice { high_frequency: false }.ttl(),
            Duration::from_secs(4 * 3600)
        );
        assert_eq!(CacheDomain::StationFacts.ttl(), Duration::from_secs(7 * 24 * 3600));
    }
}
