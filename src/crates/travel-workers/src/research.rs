//! Research worker: finds attractions and hotel suggestions for
//! each planned city, fanning out across cities with bounded concurrency.
//!
//! An optional [`crate::sources::PlacesSource`] supplies enhanced data
//! (ratings, photos, review highlights); when present it is prioritized as
//! the source of truth and the oracle only structures/cleans it up. When
//! absent -- or when it returns fewer than half the target count -- the
//! oracle is asked to produce attractions from its own knowledge, and the
//! returned batch is tagged with an `oracle_fallback` source entry so a
//! caller can tell real data from a best-guess. A per-city attraction list
//! is cached under `key::attraction_key(city)`; a later request for the
//! same city within the TTL skips both the places lookup and the oracle
//! call and is tagged `cache`. A subtask whose oracle call fails outright
//! yields zero attractions and an `error`-tagged source entry rather than
//! failing the whole node.

use crate::context::WorkerContext;
use crate::error::Result;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use travel_cache::{key, CacheDomain};
use travel_oracle::WorkerKind;

const SYSTEM_PROMPT: &str = "You are a travel research specialist. Find accurate, current attractions and \
things to do in a city. Only include attractions that actually exist; prioritize well-known, highly-rated \
ones; include a mix of categories (culture, nature, food, market); assign realistic visit durations; note \
booking requirements. When Places API data is supplied, prioritize it as the source of truth.";

const MAX_ATTRACTIONS_PER_CITY: usize = 10;

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["attractions"],
        "properties": {
            "attractions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "category", "estimated_duration_hours"],
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "category": {"type": "string"},
                        "estimated_duration_hours": {"type": "number"},
                        "address": {"type": "string"},
                        "entrance_fee_usd": {"type": "number"},
                        "booking_required": {"type": "boolean"},
                        "tips": {"type": "string"},
                        "rating": {"type": "number"},
                        "review_count": {"type": "integer"}
                    }
                }
            }
        }
    })
}

fn normalized_name(value: &Value) -> String {
    value.get("name").and_then(Value::as_str).unwrap_or_default().to_lowercase().trim().to_string()
}

/// Exact-then-substring name match against `places_data`, backfilling
/// rating/review_count/photo_urls/links onto the oracle-structured entry.
fn enrich_with_places_data(attractions: &mut [Value], places_data: &[Value]) {
    for attraction in attractions.iter_mut() {
        let name = normalized_name(attraction);
        let matched = places_data
            .iter()
            .find(|p| normalized_name(p) == name)
            .or_else(|| places_data.iter().find(|p| {
                let place_name = normalized_name(p);
                !place_name.is_empty() && (place_name.contains(&name) || name.contains(&place_name))
            }));

        let Some(place) = matched else { continue };
        if let Some(obj) = attraction.as_object_mut() {
            for field in ["rating", "review_count", "photo_urls", "google_maps_url", "website", "phone"] {
                if let Some(v) = place.get(field) {
                    if !v.is_null() {
                        obj.insert(field.to_string(), v.clone());
                    }
                }
            }
        }
    }
}

async fn research_city(allocation: &Value, ctx: &WorkerContext) -> (Vec<Value>, Vec<Value>, Option<Value>) {
    let city = allocation.get("city").and_then(Value::as_str).unwrap_or_default().to_string();
    let country = allocation.get("country").and_then(Value::as_str).unwrap_or_default().to_string();
    let days = allocation.get("days").and_then(Value::as_i64).unwrap_or(1).max(1) as usize;
    let budget_level = allocation.get("budget_level").and_then(Value::as_str).unwrap_or("mid_range").to_string();

    if city.is_empty() {
        return (Vec::new(), Vec::new(), None);
    }

    let target = (days * 4).min(MAX_ATTRACTIONS_PER_CITY);
    let cache_key = key::attraction_key(&city);

    if let Some(cached) = ctx.cache.get(&cache_key).await {
        let mut attractions: Vec<Value> = cached.as_array().cloned().unwrap_or_default();
        attractions.truncate(target);
        let hotels = fetch_hotels(ctx, &city, &country, &budget_level).await;
        let source_tag = json!({"city": city, "source": "cache"});
        return (attractions, hotels, Some(source_tag));
    }

    let places_data = match &ctx.places {
        Some(source) => source.search_attractions(&city, &country, target).await,
        None => None,
    };

    let places_section = match &places_data {
        Some(places) if !places.is_empty() => {
            let entries: Vec<String> = places
                .iter()
                .take(15)
                .map(|p| format!("- {}", p.get("name").and_then(Value::as_str).unwrap_or("unknown")))
                .collect();
            format!("\n\nDETAILED DATA (use as primary source):\n{}\n", entries.join("\n"))
        }
        _ => String::new(),
    };

    let user_prompt = format!(
        "Find the top attractions in {city}, {country} for a traveler spending {days} day(s) there. \
Return up to {target} attractions.{places_section}"
    );

    let oracle_result = ctx.oracle.structured_call(WorkerKind::Research, SYSTEM_PROMPT, &user_prompt, &output_schema()).await;
    let oracle_failed = oracle_result.is_err();
    let result = oracle_result.unwrap_or_else(|_| json!({"attractions": []}));

    let mut attractions: Vec<Value> = result.get("attractions").and_then(Value::as_array).cloned().unwrap_or_default();

    if let Some(places) = &places_data {
        enrich_with_places_data(&mut attractions, places);
    }

    for attraction in attractions.iter_mut() {
        if let Some(obj) = attraction.as_object_mut() {
            obj.insert("city".to_string(), json!(city));
        }
    }

    let mut seen = std::collections::HashSet::new();
    attractions.retain(|a| seen.insert(normalized_name(a)));
    attractions.truncate(target);

    let hotels = fetch_hotels(ctx, &city, &country, &budget_level).await;

    let source_tag = if oracle_failed && attractions.is_empty() {
        json!({"city": city, "source": "error"})
    } else if places_data.as_ref().map(|p| p.len() >= target / 2).unwrap_or(false) {
        json!({"city": city, "source": "places_api"})
    } else {
        json!({"city": city, "source": "oracle_fallback"})
    };

    if !oracle_failed {
        ctx.cache.set(cache_key, json!(attractions), CacheDomain::AttractionListings.ttl()).await;
    }

    (attractions, hotels, Some(source_tag))
}

async fn fetch_hotels(ctx: &WorkerContext, city: &str, country: &str, budget_level: &str) -> Vec<Value> {
    let hotels = match &ctx.places {
        Some(source) => source.search_hotels(city, country, budget_level).await.unwrap_or_default(),
        None => Vec::new(),
    };
    hotels
        .into_iter()
        .map(|mut hotel| {
            if let Some(obj) = hotel.as_object_mut() {
                obj.insert("city".to_string(), json!(city.to_string()));
            }
            hotel
        })
        .collect()
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();

    if city_allocations.is_empty() {
        return Ok(json!({
            "attractions": [],
            "hotels": [],
            "research_sources": [],
            "messages": [{"role": "research", "content": "No cities to research."}],
        }));
    }

    let concurrency = ctx.concurrency_for(city_allocations.len());
    let results: Vec<(Vec<Value>, Vec<Value>, Option<Value>)> = stream::iter(city_allocations.iter())
        .map(|allocation| research_city(allocation, ctx))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut attractions = Vec::new();
    let mut hotels = Vec::new();
    let mut sources = Vec::new();
    for (city_attractions, city_hotels, source) in results {
        attractions.extend(city_attractions);
        hotels.extend(city_hotels);
        if let Some(tag) = source {
            sources.push(tag);
        }
    }

    let content = format!("Researched {} attraction(s) across {} cities.", attractions.len(), city_allocations.len());

    Ok(json!({
        "attractions": attractions,
        "hotels": hotels,
        "research_sources": sources,
        "messages": [{"role": "research", "content": content}],
    }))
}
