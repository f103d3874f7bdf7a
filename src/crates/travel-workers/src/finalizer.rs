//! Finalizer worker: assembles every worker's output into one
//! `final_itinerary` document -- a day-by-day schedule per city plus the
//! transport and budget summary a traveler actually reads.
//!
//! Day-plan assembly, per city: attractions are deduplicated by name and
//! capped at `days_in_city * 4`, then spread across days as evenly as
//! possible (`base_per_day` plus the remainder distributed to the
//! earliest days). Each day follows a fixed schedule: breakfast at
//! 08:00, up to two morning attractions from 09:00 (capped at 12:00,
//! one-hour gap between), lunch at 12:30, up to two afternoon attractions
//! from 14:00 (capped at 18:00), dinner at 19:00.

use crate::error::Result;
use serde_json::{json, Value};

fn dedupe_by_name(items: Vec<&Value>) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
            if name.is_empty() || !seen.insert(name) {
                None
            } else {
                Some(item.clone())
            }
        })
        .collect()
}

fn schedule_attraction_block(attractions: &[Value], start_hour: u32, cap_hour: u32) -> Vec<Value> {
    let mut activities = Vec::new();
    let mut current_hour = start_hour;
    for attraction in attractions {
        let duration = attraction.get("estimated_duration_hours").and_then(Value::as_f64).unwrap_or(2.0).max(1.0) as u32;
        let end_hour = (current_hour + duration).min(cap_hour);
        activities.push(json!({
            "time_slot": format!("{current_hour:02}:00 - {end_hour:02}:00"),
            "activity_type": "attraction",
            "title": attraction.get("name").cloned().unwrap_or(json!("Activity")),
            "attraction": attraction,
        }));
        current_hour = end_hour + 1;
        if current_hour > cap_hour {
            break;
        }
    }
    activities
}

fn meal_activity(meal: Option<&Value>, time_slot: &str, label: &str, default_name: &str) -> Option<Value> {
    meal.map(|meal| {
        json!({
            "time_slot": time_slot,
            "activity_type": "meal",
            "title": format!("{label}: {}", meal.get("name").and_then(Value::as_str).unwrap_or(default_name)),
            "meal": meal,
        })
    })
}

fn build_daily_plans(sorted_cities: &[Value], attractions: &[Value], food_recommendations: &[Value], daily_budget_usd: f64) -> Vec<Value> {
    let mut daily_plans = Vec::new();
    let mut day_number: u32 = 1;

    for city_info in sorted_cities {
        let city = city_info.get("city").and_then(Value::as_str).unwrap_or_default();
        let days_in_city = city_info.get("days").and_then(Value::as_i64).unwrap_or(1).max(1) as usize;

        let city_attractions_raw: Vec<&Value> =
            attractions.iter().filter(|a| a.get("city").and_then(Value::as_str) == Some(city)).collect();
        let mut city_attractions = dedupe_by_name(city_attractions_raw);
        city_attractions.truncate(days_in_city * 4);

        let city_food: Vec<&Value> =
            food_recommendations.iter().filter(|f| f.get("city").and_then(Value::as_str) == Some(city)).collect();
        let breakfasts: Vec<&Value> = city_food.iter().filter(|f| f.get("meal_type").and_then(Value::as_str) == Some("breakfast")).copied().collect();
        let lunches: Vec<&Value> = city_food.iter().filter(|f| f.get("meal_type").and_then(Value::as_str) == Some("lunch")).copied().collect();
        let dinners: Vec<&Value> = city_food.iter().filter(|f| f.get("meal_type").and_then(Value::as_str) == Some("dinner")).copied().collect();

        let total_attractions = city_attractions.len();
        let base_per_day = total_attractions / days_in_city;
        let extra = total_attractions % days_in_city;
        let mut attraction_idx = 0;

        for day_offset in 0..days_in_city {
            let mut activities = Vec::new();

            if let Some(activity) = meal_activity(breakfasts.get(day_offset).copied(), "08:00 - 09:00", "Breakfast", "Local breakfast spot") {
                activities.push(activity);
            }

            let attractions_today = base_per_day + if day_offset < extra { 1 } else { 0 };
            let day_attractions: Vec<Value> = city_attractions
                [attraction_idx.min(total_attractions)..(attraction_idx + attractions_today).min(total_attractions)]
                .to_vec();
            attraction_idx += attractions_today;
            let day_attractions: Vec<Value> = day_attractions.into_iter().take(4).collect();

            let morning = &day_attractions[..day_attractions.len().min(2)];
            let afternoon = if day_attractions.len() > 2 { &day_attractions[2..day_attractions.len().min(4)] } else { &[] };

            activities.extend(schedule_attraction_block(morning, 9, 12));

            if let Some(activity) = meal_activity(lunches.get(day_offset).copied(), "12:30 - 14:00", "Lunch", "Local restaurant") {
                activities.push(activity);
            }

            activities.extend(schedule_attraction_block(afternoon, 14, 18));

            if let Some(activity) = meal_activity(dinners.get(day_offset).copied(), "19:00 - 21:00", "Dinner", "Local restaurant") {
                activities.push(activity);
            }

            daily_plans.push(json!({
                "day_number": day_number,
                "city": city,
                "theme": format!("Day {} in {city}", day_offset + 1),
                "activities": activities,
                "daily_budget_usd": daily_budget_usd,
            }));
            day_number += 1;
        }
    }

    daily_plans
}

pub async fn run(state: Value, _ctx: &crate::context::WorkerContext) -> Result<Value> {
    let trip_summary = state.get("trip_summary").cloned().unwrap_or(json!({}));
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();
    let route_segments = state.get("route_segments").and_then(Value::as_array).cloned().unwrap_or_default();
    let attractions = state.get("attractions").and_then(Value::as_array).cloned().unwrap_or_default();
    let hotels = state.get("hotels").cloned().unwrap_or(json!([]));
    let food_recommendations = state.get("food_recommendations").and_then(Value::as_array).cloned().unwrap_or_default();
    let transport_options = state.get("transport_options").and_then(Value::as_array).cloned().unwrap_or_default();
    let budget_breakdown = state.get("budget_breakdown").cloned().unwrap_or(json!({}));
    let validation_result = state.get("validation_result").cloned().unwrap_or(json!({}));

    let mut sorted_cities = city_allocations.clone();
    sorted_cities.sort_by_key(|c| c.get("visit_order").and_then(Value::as_i64).unwrap_or(0));

    let total_days = trip_summary.get("total_days").and_then(Value::as_i64).unwrap_or(sorted_cities.len().max(1) as i64).max(1);
    let daily_budget_usd =
        if budget_breakdown.is_object() && !budget_breakdown.as_object().unwrap().is_empty() {
            budget_breakdown.get("total").and_then(Value::as_f64).unwrap_or(0.0) / total_days as f64
        } else {
            0.0
        };

    let daily_plans = build_daily_plans(&sorted_cities, &attractions, &food_recommendations, daily_budget_usd);

    let mut origin_transport: Option<Value> = None;
    let mut inter_city_transport = Vec::new();
    for option in &transport_options {
        let from_location = option.get("from_location").cloned().unwrap_or(Value::Null);
        let to_location = option.get("to_location").cloned().unwrap_or(Value::Null);
        let mut entry = json!({
            "from_location": from_location,
            "to_location": to_location,
            "recommended": option.get("recommended").cloned().unwrap_or(json!({})),
            "alternatives": option.get("alternatives").cloned().unwrap_or(json!([])),
            "reason": option.get("reason").cloned().unwrap_or(json!("")),
        });

        if option.get("is_origin_transport").and_then(Value::as_bool).unwrap_or(false) {
            origin_transport = Some(entry);
        } else {
            if let Some(matching) = route_segments.iter().find(|segment| {
                segment.get("from_city") == option.get("from_location") && segment.get("to_city") == option.get("to_location")
            }) {
                if let Some(distance) = matching.get("distance_km") {
                    entry["distance_km"] = distance.clone();
                }
            }
            inter_city_transport.push(entry);
        }
    }

    let local_transport_tips = budget_breakdown.get("local_transport_tips").cloned().unwrap_or(json!({}));

    let country_name = sorted_cities.first().and_then(|c| c.get("country")).and_then(Value::as_str).unwrap_or("Trip");
    let trip_title = format!("{total_days}-Day {country_name}");

    let reshaped_budget = if budget_breakdown.is_object() && !budget_breakdown.as_object().unwrap().is_empty() {
        json!({
            "transport_inter_city": budget_breakdown.get("transport_inter_city").cloned().unwrap_or(json!(0)),
            "transport_local": budget_breakdown.get("transport_local").cloned().unwrap_or(json!(0)),
            "accommodation": budget_breakdown.get("accommodation").cloned().unwrap_or(json!(0)),
            "food": budget_breakdown.get("food").cloned().unwrap_or(json!(0)),
            "activities": budget_breakdown.get("activities_entrance_fees").cloned().unwrap_or(json!(0)),
            "miscellaneous": budget_breakdown.get("miscellaneous").cloned().unwrap_or(json!(0)),
            "total": budget_breakdown.get("total").cloned().unwrap_or(json!(0)),
            "money_saving_tips": budget_breakdown.get("money_saving_tips").cloned().unwrap_or(json!([])),
        })
    } else {
        json!({})
    };

    let final_itinerary = json!({
        "trip_title": trip_title,
        "destination_summary": trip_summary.get("understanding").cloned().unwrap_or(json!("")),
        "total_days": total_days,
        "travelers_count": 1,
        "traveler_profile": trip_summary.get("traveler_profile").cloned().unwrap_or(json!("solo")),
        "budget_level": trip_summary.get("budget_level").cloned().unwrap_or(json!("mid_range")),
        "total_estimated_cost_usd": budget_breakdown.get("total").cloned().unwrap_or(json!(0)),
        "cities_visited": sorted_cities.iter().filter_map(|c| c.get("city").cloned()).collect::<Vec<_>>(),
        "daily_plans": daily_plans,
        "origin_transport": origin_transport,
        "inter_city_transport": inter_city_transport,
        "local_transport_tips": local_transport_tips,
        "budget_breakdown": reshaped_budget,
        "cultural_tips": state.get("cultural_tips").cloned().unwrap_or(json!([])),
        "packing_suggestions": Value::Array(vec![]),
        "warnings": validation_result.get("final_recommendations").cloned().unwrap_or(json!([])),
        "sources_consulted": state.get("research_sources").cloned().unwrap_or(json!([])),
        "hotels": hotels,
    });

    Ok(json!({
        "final_itinerary": final_itinerary,
        "messages": [{"role": "finalizer", "content": format!("Itinerary complete: {trip_title}")}],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    fn ctx() -> crate::context::WorkerContext {
        crate::context::WorkerContext::new(std::sync::Arc::new(MockOracle::new()), Cache::new())
    }

    #[tokio::test]
    async fn test_deduplicates_and_caps_attractions_per_city() {
        let state = json!({
            "trip_summary": {"total_days": 2, "understanding": "2 days in Kyoto", "budget_level": "mid_range"},
            "city_allocations": [{"city": "Kyoto", "country": "Japan", "days": 2, "visit_order": 1}],
            "attractions": [
                {"name": "Temple A", "city": "Kyoto", "estimated_duration_hours": 1.5},
                {"name": "Temple A", "city": "Kyoto", "estimated_duration_hours": 1.5},
                {"name": "Temple B", "city": "Kyoto", "estimated_duration_hours": 2.0},
                {"name": "Temple C", "city": "Kyoto", "estimated_duration_hours": 2.0},
                {"name": "Temple D", "city": "Kyoto", "estimated_duration_hours": 2.0},
                {"name": "Temple E", "city": "Kyoto", "estimated_duration_hours": 2.0},
                {"name": "Temple F", "city": "Kyoto", "estimated_duration_hours": 2.0},
            ],
        });

        let update = run(state, &ctx()).await.unwrap();
        let plans = update["final_itinerary"]["daily_plans"].as_array().unwrap();
        assert_eq!(plans.len(), 2);
        let total_attraction_titles: usize = plans
            .iter()
            .map(|p| p["activities"].as_array().unwrap().iter().filter(|a| a["activity_type"] == "attraction").count())
            .sum();
        assert_eq!(total_attraction_titles, 6);
    }

    #[tokio::test]
    async fn test_meals_placed_at_fixed_time_slots() {
        let state = json!({
            "trip_summary": {"total_days": 1, "budget_level": "mid_range"},
            "city_allocations": [{"city": "Goa", "country": "India", "days": 1, "visit_order": 1}],
            "attractions": [],
            "food_recommendations": [
                {"name": "Beach Shack", "city": "Goa", "meal_type": "breakfast"},
                {"name": "Cafe", "city": "Goa", "meal_type": "lunch"},
                {"name": "Bistro", "city": "Goa", "meal_type": "dinner"},
            ],
        });

        let update = run(state, &ctx()).await.unwrap();
        let activities = update["final_itinerary"]["daily_plans"][0]["activities"].as_array().unwrap();
        assert!(activities.iter().any(|a| a["time_slot"] == "08:00 - 09:00"));
        assert!(activities.iter().any(|a| a["time_slot"] == "12:30 - 14:00"));
        assert!(activities.iter().any(|a| a["time_slot"] == "19:00 - 21:00"));
    }

    #[tokio::test]
    async fn test_origin_transport_separated_from_inter_city() {
        let state = json!({
            "trip_summary": {"total_days": 3},
            "city_allocations": [{"city": "Jaipur", "country": "India", "days": 3, "visit_order": 1}],
            "transport_options": [
                {"from_location": "Delhi", "to_location": "Jaipur", "is_origin_transport": true},
                {"from_location": "Jaipur", "to_location": "Udaipur", "is_origin_transport": false},
            ],
            "route_segments": [{"from_city": "Jaipur", "to_city": "Udaipur", "distance_km": 400.0}],
        });

        let update = run(state, &ctx()).await.unwrap();
        assert_eq!(update["final_itinerary"]["origin_transport"]["from_location"], json!("Delhi"));
        assert_eq!(update["final_itinerary"]["inter_city_transport"][0]["distance_km"], json!(400.0));
    }
}
