//! Process-answers worker: the resume re-entry point. Normalizes
//! `clarification_answers` into typed user-facts fields and folds them back
//! into `user_request` as explicit constraints, so the planner never has to
//! re-infer what the user already told the clarification step.

use crate::context::WorkerContext;
use crate::dates::parse_travel_dates;
use crate::error::Result;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

fn split_destinations(raw: &str) -> Vec<String> {
    let stripped = PARENTHETICAL.replace_all(raw, "");
    stripped
        .replace(" and ", ",")
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

pub async fn run(state: Value, _ctx: &WorkerContext) -> Result<Value> {
    let original_request = state.get("user_request").and_then(Value::as_str).unwrap_or_default().to_string();
    let answers = state.get("clarification_answers").cloned().unwrap_or(Value::Null);

    let origin_city = answers.get("origin_city").and_then(Value::as_str).map(str::to_string);
    let dietary = answers.get("dietary").and_then(Value::as_str).map(str::to_string);
    let travel_pace = answers.get("travel_pace").and_then(Value::as_str).map(str::to_string);
    let visited = answers.get("visited_places").and_then(Value::as_str).map(str::to_string);
    let destinations_raw = answers.get("specific_destinations").and_then(Value::as_str);

    let mut enriched = vec![original_request];

    let travel_dates_answer = answers.get("travel_dates").and_then(Value::as_str);
    let mut travel_start_date = None;
    let mut travel_end_date = None;
    let mut travel_date_flexibility = None;

    if let Some(dates_answer) = travel_dates_answer {
        let parsed = parse_travel_dates(dates_answer);
        travel_start_date = parsed.start_date.clone();
        travel_end_date = parsed.end_date.clone();
        travel_date_flexibility = Some(parsed.flexibility.clone());

        if let (Some(start), Some(end)) = (&parsed.start_date, &parsed.end_date) {
            enriched.push(format!("\nIMPORTANT - Travel dates: {start} to {end}"));
        } else {
            enriched.push(format!("\nIMPORTANT - Travel timing: {} (flexible)", parsed.description));
        }
    }

    if let Some(origin) = &origin_city {
        enriched.push(format!("\nIMPORTANT - Traveling from: {origin}"));
    }

    let destinations_list = destinations_raw.map(split_destinations);
    if let Some(destinations) = &destinations_list {
        enriched.push(format!("\nIMPORTANT - MUST visit these specific cities: {}", destinations.join(", ")));
        enriched.push("Do NOT substitute different cities. Plan ONLY for the cities listed above.".to_string());
    }

    if let Some(diet) = &dietary {
        enriched.push(format!("\nDietary preferences: {diet}"));
    }
    if let Some(pace) = &travel_pace {
        enriched.push(format!("\nTravel pace preference: {pace}"));
    }
    if let Some(places) = &visited {
        enriched.push(format!("\nAlready visited (avoid these): {places}"));
    }

    let message = json!({
        "role": "process_answers",
        "content": "Enriched request with user preferences",
    });

    Ok(json!({
        "user_request": enriched.join("\n"),
        "origin_city": origin_city,
        "dietary_preferences": dietary.map(|d| vec![d]).unwrap_or_default(),
        "travel_pace": travel_pace,
        "places_visited": visited.map(|v| vec![v]).unwrap_or_default(),
        "specific_destinations": destinations_list.unwrap_or_default(),
        "travel_start_date": travel_start_date,
        "travel_end_date": travel_end_date,
        "travel_date_flexibility": travel_date_flexibility,
        "messages": [message],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    fn ctx() -> WorkerContext {
        WorkerContext::new(std::sync::Arc::new(MockOracle::new()), Cache::new())
    }

    #[tokio::test]
    async fn test_parses_dates_and_destinations() {
        let state = json!({
            "user_request": "Plan a trip to Rajasthan",
            "clarification_answers": {
                "travel_dates": "January 15-22, 2026",
                "origin_city": "Delhi",
                "specific_destinations": "Jaipur, Udaipur and Jodhpur",
                "dietary": "vegetarian",
                "travel_pace": "relaxed",
            }
        });

        let update = run(state, &ctx()).await.unwrap();

        assert_eq!(update["travel_start_date"], json!("2026-01-15"));
        assert_eq!(update["travel_end_date"], json!("2026-01-22"));
        assert_eq!(update["origin_city"], json!("Delhi"));
        assert_eq!(update["specific_destinations"], json!(["Jaipur", "Udaipur", "Jodhpur"]));
        assert!(update["user_request"].as_str().unwrap().contains("MUST visit these specific cities"));
    }

    #[tokio::test]
    async fn test_missing_answers_leave_fields_empty() {
        let state = json!({"user_request": "Plan a trip", "clarification_answers": {}});
        let update = run(state, &ctx()).await.unwrap();
        assert_eq!(update["origin_city"], Value::Null);
        assert_eq!(update["specific_destinations"], json!([]));
    }

    #[tokio::test]
    async fn test_destination_parentheticals_are_stripped() {
        let state = json!({
            "user_request": "Plan a trip to Rajasthan",
            "clarification_answers": {"specific_destinations": "Udaipur (optional), Jodhpur"}
        });
        let update = run(state, &ctx()).await.unwrap();
        assert_eq!(update["specific_destinations"], json!(["Udaipur", "Jodhpur"]));
    }

    #[tokio::test]
    async fn test_flexible_date_description_is_appended() {
        let state = json!({
            "user_request": "Plan a trip to Kyoto",
            "clarification_answers": {"travel_dates": "sometime in spring"}
        });
        let update = run(state, &ctx()).await.unwrap();
        assert_eq!(update["travel_date_flexibility"], json!("flexible_week"));
        assert!(update["user_request"].as_str().unwrap().contains("flexible"));
    }
}
