//! Cache key generation.
//!
//! Keys are built from a normalized, case-insensitive canonical form of the
//! query, then hashed with SHA-256 and truncated to bound key length --
//! the same scheme the reference cache used (there it was stdlib
//! `hashlib`, here it's `sha2`).

use sha2::{Digest, Sha256};

fn normalize(part: &str) -> String {
    part.trim().to_lowercase().replace(' ', "_")
}

fn hash_truncated(input: &str, hex_len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let full_hex = hex_encode(&digest);
    full_hex[..hex_len.min(full_hex.len())].to_string()
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String never fails");
    }
    out
}

/// Key for an attraction listing query for one city.
pub fn attraction_key(city: &str) -> String {
    format!("attractions:{}", hash_truncated(&normalize(city), 32))
}

/// Key for a restaurant review search, optionally narrowed by cuisine.
pub fn restaurant_review_key(city: &str, source: &str, cuisine: Option<&str>) -> String {
    let cuisine_part = cuisine.map(normalize).unwrap_or_else(|| "all".to_string());
    let raw = format!("{}:{}:{}", normalize(source), normalize(city), cuisine_part);
    format!("restaurant_reviews:{}", hash_truncated(&raw, 32))
}

/// Key for a transport price query, optionally narrowed by fare class.
pub fn transport_price_key(
    mode: &str,
    from: &str,
    to: &str,
    travel_date: &str,
    class: Option<&str>,
) -> String {
    let mut raw = format!("{}:{}:{}:{}", normalize(mode), normalize(from), normalize(to), travel_date);
    if let Some(class) = class {
        raw.push(':');
        raw.push_str(&normalize(class));
    }
    format!("transport:{}", hash_truncated(&raw, 16))
}

/// Key for station/airport facts about a city.
pub fn station_info_key(city: &str, country: &str) -> String {
    let raw = format!("{}:{}", normalize(city), normalize(country));
    format!("stations:{}", hash_truncated(&raw, 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attraction_key_is_case_and_whitespace_insensitive() {
        assert_eq!(attraction_key("Kyoto"), attraction_key("  kyoto "));
        assert_eq!(attraction_key("New York"), attraction_key("new york"));
    }

    #[test]
    fn test_transport_price_key_distinguishes_class() {
        let a = transport_price_key("train", "Delhi", "Mumbai", "2026-01-15", None);
        let b = transport_price_key("train", "Delhi", "Mumbai", "2026-01-15", Some("sleeper"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_keys_are_stably_prefixed_by_domain() {
        assert!(attraction_key("Tokyo").starts_with("attractions:"));
        assert!(station_info_key("Tokyo", "Japan").starts_with("stations:"));
        assert!(restaurant_review_key("Tokyo", "google_maps", None).starts_with("restaurant_reviews:"));
    }
}
