//! Transport/budget worker: inter-city transport options, local
//! transport tips, and a full budget breakdown. Scraped real-world prices
//! (when available) are preferred over the oracle's own cost estimate and
//! surfaced alongside up to three cheaper alternative dates per segment.

use crate::context::WorkerContext;
use crate::error::Result;
use serde_json::{json, Value};
use travel_oracle::WorkerKind;

const SYSTEM_PROMPT: &str = "You are a travel logistics and budget expert. Recommend the best transport \
options between cities (2-3 options each, with pros/cons/costs/durations), suggest local transport within \
each city, and calculate a realistic budget breakdown. Under 300km prefer train/bus, 300-800km prefer train, \
over 800km recommend flight. Budget levels: budget $30-60/day, mid_range $80-150/day, luxury $200+/day. \
When real scraped prices are supplied, prioritize them over your own estimate and mention cheaper alternative \
dates if given.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["inter_city_options", "budget_breakdown"],
        "properties": {
            "inter_city_options": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["from_location", "to_location", "recommended"],
                    "properties": {
                        "from_location": {"type": "string"},
                        "to_location": {"type": "string"},
                        "recommended": {"type": "object"},
                        "alternatives": {"type": "array"},
                        "recommendation_reason": {"type": "string"}
                    }
                }
            },
            "local_transport_recommendations": {
                "type": "array",
                "items": {"type": "object", "properties": {"city": {"type": "string"}, "tips": {"type": "string"}}}
            },
            "budget_breakdown": {
                "type": "object",
                "required": ["transport_inter_city", "transport_local", "accommodation", "food", "activities_entrance_fees", "miscellaneous", "total"],
                "properties": {
                    "transport_inter_city": {"type": "number"},
                    "transport_local": {"type": "number"},
                    "accommodation": {"type": "number"},
                    "food": {"type": "number"},
                    "activities_entrance_fees": {"type": "number"},
                    "miscellaneous": {"type": "number"},
                    "total": {"type": "number"},
                    "currency": {"type": "string"},
                    "notes": {"type": "string"}
                }
            },
            "money_saving_tips": {"type": "array", "items": {"type": "string"}},
            "booking_tips": {"type": "array", "items": {"type": "string"}}
        }
    })
}

fn find_scraped_prices_for_segment<'a>(from_loc: &str, to_loc: &str, scraped_prices: &'a [Value]) -> Vec<&'a Value> {
    let from_lower = from_loc.to_lowercase();
    let to_lower = to_loc.to_lowercase();
    scraped_prices
        .iter()
        .filter(|p| {
            let p_from = p.get("from_location").and_then(Value::as_str).unwrap_or_default().to_lowercase();
            let p_to = p.get("to_location").and_then(Value::as_str).unwrap_or_default().to_lowercase();
            (from_lower.contains(&p_from) || p_from.contains(&from_lower))
                && (to_lower.contains(&p_to) || p_to.contains(&to_lower))
        })
        .collect()
}

fn best_real_price(scraped: &[&Value]) -> Option<Value> {
    scraped
        .iter()
        .filter(|p| p.get("price_usd").and_then(Value::as_f64).is_some())
        .min_by(|a, b| {
            let ap = a.get("price_usd").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
            let bp = b.get("price_usd").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
            ap.total_cmp(&bp)
        })
        .map(|best| {
            json!({
                "price_usd": best.get("price_usd").cloned().unwrap_or(Value::Null),
                "source": best.get("source").cloned().unwrap_or(Value::Null),
                "mode": best.get("mode").cloned().unwrap_or(Value::Null),
                "operator": best.get("operator").cloned().unwrap_or(Value::Null),
                "departure_time": best.get("departure_time").cloned().unwrap_or(Value::Null),
                "duration": best.get("duration").cloned().unwrap_or(Value::Null),
                "travel_date": best.get("travel_date").cloned().unwrap_or(Value::Null),
            })
        })
}

fn cheaper_dates(scraped: &[&Value]) -> Vec<Value> {
    let mut alternatives: Vec<(f64, Value)> = Vec::new();
    for price in scraped {
        let base_price = price.get("price_usd").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
        let alt_dates = price.get("alternative_dates").and_then(Value::as_array).cloned().unwrap_or_default();
        for alt in alt_dates {
            if let Some(alt_price) = alt.get("price_usd").and_then(Value::as_f64) {
                if alt_price < base_price {
                    alternatives.push((
                        alt_price,
                        json!({
                            "date": alt.get("date").cloned().unwrap_or(Value::Null),
                            "price_usd": alt_price,
                            "savings_usd": base_price - alt_price,
                        }),
                    ));
                }
            }
        }
    }
    alternatives.sort_by(|a, b| a.0.total_cmp(&b.0));
    alternatives.into_iter().take(3).map(|(_, v)| v).collect()
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();

    if city_allocations.is_empty() {
        return Ok(json!({
            "transport_options": [],
            "budget_breakdown": {},
            "messages": [{"role": "transport_budget", "content": "No cities to budget for."}],
        }));
    }

    let route_segments = state.get("route_segments").and_then(Value::as_array).cloned().unwrap_or_default();
    let trip_summary = state.get("trip_summary").cloned().unwrap_or(json!({}));
    let attractions = state.get("attractions").and_then(Value::as_array).cloned().unwrap_or_default();
    let scraped_prices = state.get("scraped_transport_prices").and_then(Value::as_array).cloned().unwrap_or_default();
    let origin_city = state.get("origin_city").and_then(Value::as_str);

    let mut sorted_cities = city_allocations.clone();
    sorted_cities.sort_by_key(|c| c.get("visit_order").and_then(Value::as_i64).unwrap_or(0));

    let total_days = trip_summary
        .get("total_days")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| sorted_cities.iter().filter_map(|c| c.get("days").and_then(Value::as_i64)).sum());
    let budget_level = trip_summary.get("budget_level").and_then(Value::as_str).unwrap_or("mid_range");

    let cities_info = sorted_cities
        .iter()
        .map(|c| {
            format!(
                "- {}, {}: {} days",
                c.get("city").and_then(Value::as_str).unwrap_or_default(),
                c.get("country").and_then(Value::as_str).unwrap_or_default(),
                c.get("days").and_then(Value::as_i64).unwrap_or(1),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let routes_info = if route_segments.is_empty() {
        "No inter-city travel".to_string()
    } else {
        route_segments
            .iter()
            .map(|r| {
                format!(
                    "- {} -> {}: {}km, ~{}h",
                    r.get("from_city").and_then(Value::as_str).unwrap_or_default(),
                    r.get("to_city").and_then(Value::as_str).unwrap_or_default(),
                    r.get("distance_km").and_then(Value::as_f64).unwrap_or(0.0),
                    r.get("travel_time_hours").and_then(Value::as_f64).unwrap_or(0.0),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let origin_section = match (origin_city, sorted_cities.first()) {
        (Some(origin), Some(first)) => format!(
            "\nORIGIN TO DESTINATION: from {origin} to {}, {}. Include this as the first transport segment.\n",
            first.get("city").and_then(Value::as_str).unwrap_or_default(),
            first.get("country").and_then(Value::as_str).unwrap_or_default(),
        ),
        _ => String::new(),
    };

    let user_prompt = format!(
        "Calculate transport options and budget for this trip:\n\nTotal days: {total_days}\nBudget level: {budget_level}\n{origin_section}\nCITIES:\n{cities_info}\n\nINTER-CITY ROUTES:\n{routes_info}\n\nATTRACTIONS: {} planned\n",
        attractions.len()
    );

    let result =
        ctx.oracle.structured_call(WorkerKind::TransportBudget, SYSTEM_PROMPT, &user_prompt, &output_schema()).await?;

    let mut transport_options = Vec::new();
    for option in result.get("inter_city_options").and_then(Value::as_array).cloned().unwrap_or_default() {
        let from_location = option.get("from_location").and_then(Value::as_str).unwrap_or_default().to_string();
        let to_location = option.get("to_location").and_then(Value::as_str).unwrap_or_default().to_string();
        let is_origin_transport =
            origin_city.map(|origin| origin.eq_ignore_ascii_case(&from_location)).unwrap_or(false);

        let segment_scraped = find_scraped_prices_for_segment(&from_location, &to_location, &scraped_prices);
        let real_price = best_real_price(&segment_scraped);
        let alt_dates = cheaper_dates(&segment_scraped);

        let mut entry = json!({
            "from_location": from_location,
            "to_location": to_location,
            "is_origin_transport": is_origin_transport,
            "recommended": option.get("recommended").cloned().unwrap_or(Value::Null),
            "alternatives": option.get("alternatives").cloned().unwrap_or(json!([])),
            "reason": option.get("recommendation_reason").cloned().unwrap_or(Value::Null),
        });
        if let Some(price) = real_price {
            entry["real_price"] = price;
        }
        if !alt_dates.is_empty() {
            entry["cheaper_dates"] = json!(alt_dates);
        }
        transport_options.push(entry);
    }

    let mut local_transport_tips = serde_json::Map::new();
    for tip in result.get("local_transport_recommendations").and_then(Value::as_array).cloned().unwrap_or_default() {
        if let Some(city) = tip.get("city").and_then(Value::as_str) {
            local_transport_tips.insert(city.to_string(), tip.get("tips").cloned().unwrap_or(Value::Null));
        }
    }

    let breakdown = result.get("budget_breakdown").cloned().unwrap_or(json!({}));
    let budget_breakdown = json!({
        "transport_inter_city": breakdown.get("transport_inter_city").cloned().unwrap_or(json!(0)),
        "transport_local": breakdown.get("transport_local").cloned().unwrap_or(json!(0)),
        "accommodation": breakdown.get("accommodation").cloned().unwrap_or(json!(0)),
        "food": breakdown.get("food").cloned().unwrap_or(json!(0)),
        "activities_entrance_fees": breakdown.get("activities_entrance_fees").cloned().unwrap_or(json!(0)),
        "miscellaneous": breakdown.get("miscellaneous").cloned().unwrap_or(json!(0)),
        "total": breakdown.get("total").cloned().unwrap_or(json!(0)),
        "currency": breakdown.get("currency").cloned().unwrap_or(json!("USD")),
        "notes": breakdown.get("notes").cloned().unwrap_or(Value::Null),
        "money_saving_tips": result.get("money_saving_tips").cloned().unwrap_or(json!([])),
        "booking_tips": result.get("booking_tips").cloned().unwrap_or(json!([])),
        "local_transport_tips": Value::Object(local_transport_tips),
    });

    let content = format!(
        "Estimated total budget ${} across {} transport option(s).",
        budget_breakdown["total"],
        transport_options.len()
    );

    Ok(json!({
        "transport_options": transport_options,
        "budget_breakdown": budget_breakdown,
        "messages": [{"role": "transport_budget", "content": content}],
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
        assert_eq!(update["transport_options"], json!([]));
    }

    #[tokio::test]
    async fn test_real_price_overrides_estimate_and_flags_origin() {
        let oracle = MockOracle::new();
        oracle.queue(
            WorkerKind::TransportBudget,
            json!({
                "inter_city_options": [{
                    "from_location": "Delhi",
                    "to_location": "Jaipur",
                    "recommended": {"mode": "train", "duration_hours": 5, "estimated_cost_usd": 20, "notes": "scenic"},
                    "alternatives": [],
                    "recommendation_reason": "fastest reasonable option",
                }],
                "budget_breakdown": {
                    "transport_inter_city": 20, "transport_local": 10, "accommodation": 50,
                    "food": 30, "activities_entrance_fees": 15, "miscellaneous": 10, "total": 135,
                },
            }),
        );
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());
        let state = json!({
            "origin_city": "Delhi",
            "city_allocations": [{"city": "Jaipur", "country": "India", "days": 2, "visit_order": 1}],
            "scraped_transport_prices": [
                {"from_location": "Delhi", "to_location": "Jaipur", "price_usd": 15.0, "source": "redbus"}
            ],
        });

        let update = run(state, &ctx).await.unwrap();
        let option = &update["transport_options"][0];
        assert_eq!(option["is_origin_transport"], json!(true));
        assert_eq!(option["real_price"]["price_usd"], json!(15.0));
    }

    #[test]
    fn test_cheaper_dates_sorted_and_capped_at_three() {
        let prices = vec![json!({
            "price_usd": 100.0,
            "alternative_dates": [
                {"date": "2026-01-12", "price_usd": 80.0},
                {"date": "2026-01-13", "price_usd": 60.0},
                {"date": "2026-01-14", "price_usd": 90.0},
                {"date": "2026-01-15", "price_usd": 70.0},
            ]
        })];
        let refs: Vec<&Value> = prices.iter().collect();
        let result = cheaper_dates(&refs);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0]["price_usd"], json!(60.0));
    }
}
