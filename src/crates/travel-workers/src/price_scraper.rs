//! Transport price-scraper worker: gathers real-world transport
//! prices for each inter-city leg (and the origin-to-first-city leg, when
//! an origin is known), computing each leg's travel date by walking the
//! visit-order-sorted cities forward from the trip start date.
//!
//! Per-source failures never fail the whole node -- an empty scrape result
//! for a segment simply means the budget worker falls back to an estimate.

use crate::context::WorkerContext;
use crate::error::Result;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};

fn fallback_start_date() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

struct Segment {
    from_city: String,
    to_city: String,
    country: String,
    travel_date: String,
    is_origin_transport: bool,
}

/// Walks `city_allocations` in visit-order, accumulating `days` per city to
/// compute each leg's travel date, and prepends an origin leg when
/// `origin_city` is known.
fn calculate_segments(city_allocations: &[Value], origin_city: Option<&str>, start_date: Option<&str>) -> Vec<Segment> {
    let mut sorted = city_allocations.to_vec();
    sorted.sort_by_key(|c| c.get("visit_order").and_then(Value::as_i64).unwrap_or(0));

    let start = start_date
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(fallback_start_date);

    let mut segments = Vec::new();
    let mut current_date = start;

    if let Some(origin) = origin_city {
        if let Some(first) = sorted.first() {
            segments.push(Segment {
                from_city: origin.to_string(),
                to_city: first.get("city").and_then(Value::as_str).unwrap_or_default().to_string(),
                country: first.get("country").and_then(Value::as_str).unwrap_or_default().to_string(),
                travel_date: current_date.format("%Y-%m-%d").to_string(),
                is_origin_transport: true,
            });
        }
    }

    for window in sorted.windows(2) {
        let [from, to] = window else { continue };
        let from_days = from.get("days").and_then(Value::as_i64).unwrap_or(1).max(1);
        current_date += Duration::days(from_days);
        segments.push(Segment {
            from_city: from.get("city").and_then(Value::as_str).unwrap_or_default().to_string(),
            to_city: to.get("city").and_then(Value::as_str).unwrap_or_default().to_string(),
            country: to.get("country").and_then(Value::as_str).unwrap_or_default().to_string(),
            travel_date: current_date.format("%Y-%m-%d").to_string(),
            is_origin_transport: false,
        });
    }

    segments
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();
    let origin_city = state.get("origin_city").and_then(Value::as_str);
    let start_date = state.get("travel_start_date").and_then(Value::as_str);

    if city_allocations.is_empty() {
        return Ok(json!({
            "scraped_transport_prices": [],
            "messages": [{"role": "price_scraper", "content": "No cities to scrape prices for."}],
        }));
    }

    let segments = calculate_segments(&city_allocations, origin_city, start_date);

    let mut prices = Vec::new();
    if let Some(source) = &ctx.prices {
        for segment in &segments {
            let mut results = source
                .scrape_segment(&segment.from_city, &segment.to_city, &segment.country, &segment.travel_date)
                .await;
            for record in results.iter_mut() {
                if let Some(obj) = record.as_object_mut() {
                    obj.insert("from_location".to_string(), json!(segment.from_city.clone()));
                    obj.insert("to_location".to_string(), json!(segment.to_city.clone()));
                    obj.insert("travel_date".to_string(), json!(segment.travel_date.clone()));
                    obj.insert("is_origin_transport".to_string(), json!(segment.is_origin_transport));
                }
            }
            prices.extend(results);
        }
    }

    let nearest_stations = match (&ctx.prices, origin_city) {
        (Some(source), Some(origin)) => {
            let country = city_allocations.first().and_then(|c| c.get("country")).and_then(Value::as_str).unwrap_or_default();
            source.find_nearest_stations(origin, country).await
        }
        _ => None,
    };

    let content = format!("Scraped {} transport price record(s) across {} leg(s).", prices.len(), segments.len());

    Ok(json!({
        "scraped_transport_prices": prices,
        "nearest_stations": nearest_stations,
        "messages": [{"role": "price_scraper", "content": content}],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    #[tokio::test]
    async fn test_no_cities_short_circuits() {
        let ctx = WorkerContext::new(std::sync::Arc::new(MockOracle::new()), Cache::new());
        let update = run(json!({"city_allocations": []}), &ctx).await.unwrap();
        assert_eq!(update["scraped_transport_prices"], json!([]));
    }

    #[test]
    fn test_calculate_segments_accumulates_dates_and_includes_origin() {
        let allocations = vec![
            json!({"city": "Jaipur", "country": "India", "days": 3, "visit_order": 1}),
            json!({"city": "Udaipur", "country": "India", "days": 2, "visit_order": 2}),
        ];
        let segments = calculate_segments(&allocations, Some("Delhi"), Some("2026-01-10"));

        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_origin_transport);
        assert_eq!(segments[0].travel_date, "2026-01-10");
        assert_eq!(segments[1].from_city, "Jaipur");
        assert_eq!(segments[1].to_city, "Udaipur");
        assert_eq!(segments[1].travel_date, "2026-01-13");
    }

    #[test]
    fn test_calculate_segments_without_origin_skips_origin_leg() {
        let allocations = vec![
            json!({"city": "A", "country": "X", "days": 1, "visit_order": 1}),
            json!({"city": "B", "country": "X", "days": 1, "visit_order": 2}),
        ];
        let segments = calculate_segments(&allocations, None, Some("2026-02-01"));
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_origin_transport);
    }
}
