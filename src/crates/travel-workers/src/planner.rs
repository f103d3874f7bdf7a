//! Planner worker: turns the (possibly enriched) request into a
//! trip summary and a day allocation per city, and clears `critic_feedback`
//! once it has been addressed.

use crate::context::WorkerContext;
use crate::error::{Result, WorkerError};
use serde_json::{json, Value};
use travel_oracle::WorkerKind;

const SYSTEM_PROMPT: &str = "You are an expert travel planner. Understand the traveler's request, pick which \
cities to visit, and allocate days per city. Minimum 1 day per city. For trips of 5 days or fewer use at most \
3 cities; 6-9 days use at most 4 cities; 10 or more days use at most 5 cities. Never propose a zig-zag route. \
Infer budget_level from keywords (backpacking/cheap/budget -> budget, moderate/comfortable -> mid_range, \
luxury/premium -> luxury; default mid_range), traveler_profile (default solo), and travel_style. When \
re-planning, address every issue raised in the feedback.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["trip_understanding", "total_days", "budget_level", "city_allocations"],
        "properties": {
            "trip_understanding": {"type": "string"},
            "total_days": {"type": "integer", "minimum": 1},
            "budget_level": {"type": "string", "enum": ["budget", "mid_range", "luxury"]},
            "traveler_profile": {"type": "string"},
            "travel_style": {"type": "string"},
            "overall_strategy": {"type": "string"},
            "city_allocations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["city", "country", "days", "visit_order"],
                    "properties": {
                        "city": {"type": "string"},
                        "country": {"type": "string"},
                        "days": {"type": "integer", "minimum": 1},
                        "visit_order": {"type": "integer", "minimum": 1},
                        "highlights": {"type": "array", "items": {"type": "string"}},
                        "reasoning": {"type": "string"}
                    }
                }
            }
        }
    })
}

/// Enforces the invariants the shared state requires regardless of what the oracle
/// returned: visit_order is `1..N` in the order cities were listed, days
/// are clamped to at least 1, and `total_days` tracks the resulting sum.
fn normalize_allocations(mut result: Value) -> Value {
    let total_days = if let Some(allocations) = result.get_mut("city_allocations").and_then(Value::as_array_mut) {
        for (index, allocation) in allocations.iter_mut().enumerate() {
            if let Some(obj) = allocation.as_object_mut() {
                let days = obj.get("days").and_then(Value::as_i64).unwrap_or(1).max(1);
                obj.insert("days".to_string(), json!(days));
                obj.insert("visit_order".to_string(), json!(index as i64 + 1));
            }
        }
        allocations.iter().filter_map(|a| a.get("days").and_then(Value::as_i64)).sum::<i64>()
    } else {
        result.get("total_days").and_then(Value::as_i64).unwrap_or(0)
    };
    result["total_days"] = json!(total_days);
    result
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let user_request = state
        .get("user_request")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkerError::invalid_state("user_request", "missing or not a string"))?;
    let critic_feedback = state.get("critic_feedback").and_then(Value::as_str);
    let iteration = state.get("iteration_count").and_then(Value::as_u64).unwrap_or(0);

    let mut user_prompt = format!("Plan this trip:\n\n{user_request}");
    if let Some(feedback) = critic_feedback {
        user_prompt.push_str(&format!(
            "\n\n---\nThis is re-planning iteration {}. The previous plan had issues. Address this feedback:\n\n{feedback}\n",
            iteration + 1
        ));
    }

    let result =
        ctx.oracle.structured_call(WorkerKind::Planner, SYSTEM_PROMPT, &user_prompt, &output_schema()).await?;
    let result = normalize_allocations(result);

    let trip_summary = json!({
        "understanding": result.get("trip_understanding").cloned().unwrap_or(Value::Null),
        "total_days": result.get("total_days").cloned().unwrap_or(json!(0)),
        "budget_level": result.get("budget_level").cloned().unwrap_or(json!("mid_range")),
        "traveler_profile": result.get("traveler_profile").cloned().unwrap_or(json!("solo")),
        "travel_style": result.get("travel_style").cloned().unwrap_or(Value::Null),
        "strategy": result.get("overall_strategy").cloned().unwrap_or(Value::Null),
    });

    let city_allocations = result.get("city_allocations").cloned().unwrap_or(json!([]));
    let city_count = city_allocations.as_array().map(|a| a.len()).unwrap_or(0);
    let content = if critic_feedback.is_some() {
        format!("Re-planned trip across {city_count} cities, addressing critic feedback.")
    } else {
        format!("Planned trip across {city_count} cities.")
    };

    Ok(json!({
        "trip_summary": trip_summary,
        "city_allocations": city_allocations,
        "critic_feedback": Value::Null,
        "messages": [{"role": "planner", "content": content}],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    #[tokio::test]
    async fn test_normalizes_visit_order_and_total_days() {
        let oracle = MockOracle::new();
        oracle.queue(
            WorkerKind::Planner,
            json!({
                "trip_understanding": "5 days in Japan",
                "total_days": 99,
                "budget_level": "mid_range",
                "city_allocations": [
                    {"city": "Tokyo", "country": "Japan", "days": 3, "visit_order": 5},
                    {"city": "Kyoto", "country": "Japan", "days": 2, "visit_order": 1},
                ]
            }),
        );
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());

        let update = run(json!({"user_request": "5 days in Japan"}), &ctx).await.unwrap();

        assert_eq!(update["trip_summary"]["total_days"], json!(5));
        assert_eq!(update["city_allocations"][0]["visit_order"], json!(1));
        assert_eq!(update["city_allocations"][1]["visit_order"], json!(2));
        assert_eq!(update["critic_feedback"], Value::Null);
    }

    #[tokio::test]
    async fn test_clears_critic_feedback_after_replan() {
        let oracle = MockOracle::new();
        oracle.queue(
            WorkerKind::Planner,
            json!({
                "trip_understanding": "replan",
                "total_days": 2,
                "budget_level": "budget",
                "city_allocations": [{"city": "Goa", "country": "India", "days": 2, "visit_order": 1}],
            }),
        );
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());

        let state = json!({
            "user_request": "2 days in Goa",
            "critic_feedback": "Budget was unrealistic",
            "iteration_count": 1,
        });
        let update = run(state, &ctx).await.unwrap();
        assert_eq!(update["critic_feedback"], Value::Null);
    }

    #[tokio::test]
    async fn test_missing_user_request_errors() {
        let ctx = WorkerContext::new(std::sync::Arc::new(MockOracle::new()), Cache::new());
        assert!(run(json!({}), &ctx).await.is_err());
    }
}
