//! Geography worker: validates and optimizes the route between
//! cities. Distance-band transport defaults and the 8-hour feasibility
//! cutoff are enforced deterministically in Rust rather than trusted to
//! the oracle, since those invariants bind regardless of what it proposes.

use crate::context::WorkerContext;
use crate::error::Result;
use serde_json::{json, Value};
use travel_oracle::WorkerKind;
use travel_types::RouteSegment;

const SYSTEM_PROMPT: &str = "You are a geography and travel logistics expert. Validate the proposed city \
route, estimate distance and travel time between each consecutive pair of cities, flag zig-zag backtracking, \
and suggest an optimized order when reordering reduces total distance by at least 10%. Flag any day requiring \
more than 4-5 hours of travel or multiple city changes.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["route_is_valid", "original_order", "route_changed", "route_segments"],
        "properties": {
            "route_is_valid": {"type": "boolean"},
            "original_order": {"type": "array", "items": {"type": "string"}},
            "optimized_order": {"type": "array", "items": {"type": "string"}},
            "route_changed": {"type": "boolean"},
            "total_travel_time_hours": {"type": "number"},
            "total_distance_km": {"type": "number"},
            "suggestions": {"type": "array", "items": {"type": "string"}},
            "warnings": {"type": "array", "items": {"type": "string"}},
            "route_segments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["from_city", "to_city", "distance_km"],
                    "properties": {
                        "from_city": {"type": "string"},
                        "to_city": {"type": "string"},
                        "distance_km": {"type": "number"},
                        "travel_time_hours": {"type": "number"},
                        "issues": {"type": "array", "items": {"type": "string"}}
                    }
                }
            }
        }
    })
}

/// Applies the fixed distance-band default and the 8-hour feasibility rule
/// to every segment the oracle returned, overriding whatever mode/feasible
/// flag it proposed.
fn enforce_distance_bands(segments_raw: &[Value]) -> Vec<RouteSegment> {
    segments_raw
        .iter()
        .map(|segment| {
            let from_city = segment.get("from_city").and_then(Value::as_str).unwrap_or_default().to_string();
            let to_city = segment.get("to_city").and_then(Value::as_str).unwrap_or_default().to_string();
            let distance_km = segment.get("distance_km").and_then(Value::as_f64).unwrap_or(0.0);
            let travel_time_hours = segment.get("travel_time_hours").and_then(Value::as_f64).unwrap_or(0.0);
            let recommended_mode = RouteSegment::default_mode_for_distance(distance_km);
            let feasible = travel_time_hours <= 8.0;
            let mut issues: Vec<String> = serde_json::from_value(segment.get("issues").cloned().unwrap_or(json!([])))
                .unwrap_or_default();
            if !feasible {
                issues.push(format!("estimated travel time {travel_time_hours:.1}h exceeds the 8h feasibility cutoff"));
            }
            RouteSegment { from_city, to_city, distance_km, recommended_mode, travel_time_hours, feasible, issues }
        })
        .collect()
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();

    if city_allocations.is_empty() {
        return Ok(json!({
            "route_validation": {"is_valid": false, "error": "No cities to validate"},
            "route_segments": [],
            "messages": [{"role": "geography", "content": "No cities to validate."}],
        }));
    }

    let mut sorted_cities = city_allocations.clone();
    sorted_cities.sort_by_key(|c| c.get("visit_order").and_then(Value::as_i64).unwrap_or(0));
    let proposed_order: Vec<String> =
        sorted_cities.iter().filter_map(|c| c.get("city").and_then(Value::as_str).map(str::to_string)).collect();

    let trip_summary = state.get("trip_summary").cloned().unwrap_or(json!({}));
    let cities_info = sorted_cities
        .iter()
        .map(|c| {
            format!(
                "- {}, {} ({} days)",
                c.get("city").and_then(Value::as_str).unwrap_or_default(),
                c.get("country").and_then(Value::as_str).unwrap_or_default(),
                c.get("days").and_then(Value::as_i64).unwrap_or(1),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user_prompt = format!(
        "Validate and optimize this travel route:\n\nTrip Duration: {} days\nBudget Level: {}\n\nProposed city order:\n{cities_info}\n\nRoute: {}\n",
        trip_summary.get("total_days").and_then(Value::as_i64).unwrap_or(sorted_cities.len() as i64),
        trip_summary.get("budget_level").and_then(Value::as_str).unwrap_or("mid_range"),
        proposed_order.join(" -> "),
    );

    let result = ctx.oracle.structured_call(WorkerKind::Geography, SYSTEM_PROMPT, &user_prompt, &output_schema()).await?;

    let route_changed = result.get("route_changed").and_then(Value::as_bool).unwrap_or(false);
    let optimized_order: Vec<String> =
        serde_json::from_value(result.get("optimized_order").cloned().unwrap_or(json!([]))).unwrap_or_default();

    let segments_raw = result.get("route_segments").and_then(Value::as_array).cloned().unwrap_or_default();
    let segments = enforce_distance_bands(&segments_raw);

    let route_validation = json!({
        "is_valid": result.get("route_is_valid").cloned().unwrap_or(json!(true)),
        "original_order": proposed_order,
        "optimized_order": optimized_order,
        "route_changed": route_changed,
        "total_travel_time_hours": result.get("total_travel_time_hours").cloned().unwrap_or(json!(0)),
        "total_distance_km": result.get("total_distance_km").cloned().unwrap_or(json!(0)),
        "suggestions": result.get("suggestions").cloned().unwrap_or(json!([])),
        "warnings": result.get("warnings").cloned().unwrap_or(json!([])),
    });

    let content = if route_changed {
        "Route validated; reordered cities to reduce backtracking.".to_string()
    } else {
        "Route validated; proposed order looks geographically sound.".to_string()
    };

    let mut update = json!({
        "route_validation": route_validation,
        "route_segments": segments,
        "messages": [{"role": "geography", "content": content}],
    });

    if route_changed && !optimized_order.is_empty() {
        let city_map: std::collections::HashMap<String, Value> = city_allocations
            .iter()
            .filter_map(|c| c.get("city").and_then(Value::as_str).map(|city| (city.to_string(), c.clone())))
            .collect();

        let reordered: Vec<Value> = optimized_order
            .iter()
            .enumerate()
            .filter_map(|(index, city)| {
                city_map.get(city).map(|allocation| {
                    let mut allocation = allocation.clone();
                    allocation["visit_order"] = json!(index as i64 + 1);
                    allocation
                })
            })
            .collect();

        if !reordered.is_empty() {
            update["city_allocations"] = json!(reordered);
        }
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    fn ctx_with(response: Value) -> WorkerContext {
        let oracle = MockOracle::new();
        oracle.queue(WorkerKind::Geography, response);
        WorkerContext::new(std::sync::Arc::new(oracle), Cache::new())
    }

    #[tokio::test]
    async fn test_empty_allocations_short_circuits() {
        let ctx = WorkerContext::new(std::sync::Arc::new(MockOracle::new()), Cache::new());
        let update = run(json!({"city_allocations": []}), &ctx).await.unwrap();
        assert_eq!(update["route_validation"]["is_valid"], json!(false));
    }

    #[tokio::test]
    async fn test_distance_band_is_enforced_over_oracle_choice() {
        let ctx = ctx_with(json!({
            "route_is_valid": true,
            "original_order": ["Tokyo", "Osaka"],
            "route_changed": false,
            "route_segments": [
                {"from_city": "Tokyo", "to_city": "Osaka", "distance_km": 900.0, "travel_time_hours": 3.0}
            ]
        }));

        let state = json!({
            "city_allocations": [
                {"city": "Tokyo", "country": "Japan", "days": 3, "visit_order": 1},
                {"city": "Osaka", "country": "Japan", "days": 2, "visit_order": 2},
            ]
        });
        let update = run(state, &ctx).await.unwrap();
        assert_eq!(update["route_segments"][0]["recommended_mode"], json!("flight"));
        assert_eq!(update["route_segments"][0]["feasible"], json!(true));
    }

    #[tokio::test]
    async fn test_excessive_travel_time_marks_infeasible() {
        let ctx = ctx_with(json!({
            "route_is_valid": true,
            "original_order": ["A", "B"],
            "route_changed": false,
            "route_segments": [{"from_city": "A", "to_city": "B", "distance_km": 1200.0, "travel_time_hours": 10.0}]
        }));
        let state = json!({"city_allocations": [
            {"city": "A", "country": "X", "days": 1, "visit_order": 1},
            {"city": "B", "country": "X", "days": 1, "visit_order": 2},
        ]});
        let update = run(state, &ctx).await.unwrap();
        assert_eq!(update["route_segments"][0]["feasible"], json!(false));
    }

    #[tokio::test]
    async fn test_route_changed_reorders_city_allocations() {
        let ctx = ctx_with(json!({
            "route_is_valid": false,
            "original_order": ["A", "C", "B"],
            "optimized_order": ["A", "B", "C"],
            "route_changed": true,
            "route_segments": []
        }));
        let state = json!({"city_allocations": [
            {"city": "A", "country": "X", "days": 1, "visit_order": 1},
            {"city": "C", "country": "X", "days": 1, "visit_order": 2},
            {"city": "B", "country": "X", "days": 1, "visit_order": 3},
        ]});
        let update = run(state, &ctx).await.unwrap();
        let reordered = update["city_allocations"].as_array().unwrap();
        assert_eq!(reordered[1]["city"], json!("B"));
        assert_eq!(reordered[1]["visit_order"], json!(2));
    }
}
