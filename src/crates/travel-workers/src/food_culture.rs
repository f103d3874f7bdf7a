//! Food & culture worker: per-city meal recommendations (exactly
//! `days` breakfast/lunch/dinner entries each) and a deduplicated list of
//! cultural tips, running once across every planned city per invocation.

use crate::context::WorkerContext;
use crate::error::Result;
use serde_json::{json, Value};
use travel_oracle::WorkerKind;

const SYSTEM_PROMPT: &str = "You are a local food and culture expert. For each city, recommend one breakfast, \
one lunch, and one dinner venue per day of the stay, prioritizing highly-rated local favorites over tourist \
traps. Respect any stated dietary preferences. Also provide cultural etiquette tips: customs to observe, \
things travelers should avoid doing, typical dress code, and useful local-language phrases.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["recommendations", "cultural_tips"],
        "properties": {
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "meal_type"],
                    "properties": {
                        "name": {"type": "string"},
                        "meal_type": {"type": "string", "enum": ["breakfast", "lunch", "dinner"]},
                        "cuisine": {"type": "string"},
                        "price_range": {"type": "string"},
                        "address": {"type": "string"},
                        "must_try_dishes": {"type": "array", "items": {"type": "string"}}
                    }
                }
            },
            "cultural_tips": {"type": "array", "items": {"type": "string"}},
            "cultural_donts": {"type": "array", "items": {"type": "string"}},
            "dress_code": {"type": "string"},
            "language_tips": {"type": "array", "items": {"type": "string"}}
        }
    })
}

async fn food_for_city(allocation: &Value, dietary_preferences: &[String], ctx: &WorkerContext) -> (Vec<Value>, Vec<String>) {
    let city = allocation.get("city").and_then(Value::as_str).unwrap_or_default().to_string();
    let country = allocation.get("country").and_then(Value::as_str).unwrap_or_default().to_string();
    let days = allocation.get("days").and_then(Value::as_i64).unwrap_or(1).max(1);

    if city.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let dietary_note = if dietary_preferences.is_empty() {
        String::new()
    } else {
        format!("\nDietary preferences to respect: {}", dietary_preferences.join(", "))
    };

    let reviews_note = match &ctx.places {
        Some(source) => match source.search_restaurants(&city, &country, days as usize * 3).await {
            Some(results) if !results.is_empty() => {
                let names: Vec<String> =
                    results.iter().take(10).filter_map(|r| r.get("name").and_then(Value::as_str)).map(str::to_string).collect();
                format!("\nHighly-rated local venues to consider: {}", names.join(", "))
            }
            _ => String::new(),
        },
        None => String::new(),
    };

    let user_prompt = format!(
        "Recommend food for {city}, {country} across {days} day(s): exactly one breakfast, one lunch, and one \
dinner per day.{dietary_note}{reviews_note}\nAlso provide cultural etiquette tips for visiting {city}."
    );

    let result = match ctx.oracle.structured_call(WorkerKind::FoodCulture, SYSTEM_PROMPT, &user_prompt, &output_schema()).await {
        Ok(value) => value,
        Err(_) => json!({"recommendations": [], "cultural_tips": []}),
    };

    let mut recommendations: Vec<Value> =
        result.get("recommendations").and_then(Value::as_array).cloned().unwrap_or_default();
    for rec in recommendations.iter_mut() {
        if let Some(obj) = rec.as_object_mut() {
            obj.insert("city".to_string(), json!(city.clone()));
        }
    }

    let mut tips: Vec<String> =
        serde_json::from_value(result.get("cultural_tips").cloned().unwrap_or(json!([]))).unwrap_or_default();

    let donts: Vec<String> =
        serde_json::from_value(result.get("cultural_donts").cloned().unwrap_or(json!([]))).unwrap_or_default();
    tips.extend(donts.into_iter().map(|d| format!("Don't: {d}")));

    if let Some(dress_code) = result.get("dress_code").and_then(Value::as_str) {
        if !dress_code.is_empty() {
            tips.push(format!("Dress code: {dress_code}"));
        }
    }

    let language_tips: Vec<String> =
        serde_json::from_value(result.get("language_tips").cloned().unwrap_or(json!([]))).unwrap_or_default();
    tips.extend(language_tips.into_iter().map(|t| format!("Language: {t}")));

    (recommendations, tips)
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();
    let dietary_preferences: Vec<String> =
        serde_json::from_value(state.get("dietary_preferences").cloned().unwrap_or(json!([]))).unwrap_or_default();

    if city_allocations.is_empty() {
        return Ok(json!({
            "food_recommendations": [],
            "cultural_tips": [],
            "messages": [{"role": "food_culture", "content": "No cities to plan food for."}],
        }));
    }

    let mut all_recommendations = Vec::new();
    let mut all_tips: Vec<String> = Vec::new();
    for allocation in &city_allocations {
        let (recommendations, tips) = food_for_city(allocation, &dietary_preferences, ctx).await;
        all_recommendations.extend(recommendations);
        all_tips.extend(tips);
    }

    let mut seen = std::collections::HashSet::new();
    all_tips.retain(|tip| seen.insert(tip.clone()));

    let content = format!(
        "Gathered {} food recommendation(s) and {} cultural tip(s).",
        all_recommendations.len(),
        all_tips.len()
    );

    Ok(json!({
        "food_recommendations": all_recommendations,
        "cultural_tips": all_tips,
        "messages": [{"role": "food_culture", "content": content}],
    }))
}
