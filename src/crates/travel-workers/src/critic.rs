//! Critic worker: validates the assembled plan across five issue
//! categories and decides whether another planning iteration is needed.
//!
//! Decision table: any critical issue, or three or more high-severity
//! issues, forces a replan. Once `iteration_count` reaches
//! `MAX_REPLAN_ITERATIONS` a requested replan is overridden into a forced
//! approval with a synthetic medium "process" issue recorded instead, so
//! the loop always terminates.

use crate::context::WorkerContext;
use crate::error::Result;
use serde_json::{json, Value};
use travel_oracle::WorkerKind;

/// Default replan-loop cap; overridable via
/// [`WorkerContext::max_replan_iterations`].
pub const MAX_REPLAN_ITERATIONS: u64 = 3;

const SYSTEM_PROMPT: &str = "You are a meticulous travel plan validator. Review the itinerary for timing \
issues (overpacked days, unrealistic travel times), logistics issues (impossible connections, zig-zag \
routing, missing check-in/check-out time), budget issues (costs exceeding the stated level), feasibility \
issues (booking requirements, seasonal closures, physical demands), and balance issues (no variety, no free \
time). Assign each issue a severity: low, medium, high, or critical. Any critical issue, or three or more \
high issues, means the plan requires re-planning. Provide specific replan_focus and replan_instructions when \
re-planning is required. Be fair but thorough -- a good plan should pass.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["is_valid", "issues", "requires_replanning"],
        "properties": {
            "is_valid": {"type": "boolean"},
            "overall_score": {"type": "number"},
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["category", "description", "severity"],
                    "properties": {
                        "category": {"type": "string", "enum": ["timing", "logistics", "budget", "feasibility", "balance"]},
                        "description": {"type": "string"},
                        "severity": {"type": "string", "enum": ["low", "medium", "high", "critical"]},
                        "affected_days": {"type": "array", "items": {"type": "integer"}},
                        "affected_cities": {"type": "array", "items": {"type": "string"}},
                        "suggested_fix": {"type": "string"}
                    }
                }
            },
            "requires_replanning": {"type": "boolean"},
            "replan_focus": {"type": "string"},
            "replan_instructions": {"type": "string"},
            "strengths": {"type": "array", "items": {"type": "string"}},
            "final_recommendations": {"type": "array", "items": {"type": "string"}}
        }
    })
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let iteration = state.get("iteration_count").and_then(Value::as_u64).unwrap_or(0);
    let max_replan_iterations = ctx.max_replan_iterations;

    let trip_summary = state.get("trip_summary").cloned().unwrap_or(json!({}));
    let city_allocations = state.get("city_allocations").and_then(Value::as_array).cloned().unwrap_or_default();
    let route_validation = state.get("route_validation").cloned().unwrap_or(json!({}));
    let route_segments = state.get("route_segments").and_then(Value::as_array).cloned().unwrap_or_default();
    let attractions = state.get("attractions").and_then(Value::as_array).cloned().unwrap_or_default();
    let food_recommendations = state.get("food_recommendations").and_then(Value::as_array).cloned().unwrap_or_default();
    let transport_options = state.get("transport_options").and_then(Value::as_array).cloned().unwrap_or_default();
    let budget_breakdown = state.get("budget_breakdown").cloned().unwrap_or(json!({}));

    let mut sorted_cities = city_allocations.clone();
    sorted_cities.sort_by_key(|c| c.get("visit_order").and_then(Value::as_i64).unwrap_or(0));
    let cities_info = sorted_cities
        .iter()
        .map(|c| {
            format!(
                "  {}. {}, {} - {} days",
                c.get("visit_order").and_then(Value::as_i64).unwrap_or(0),
                c.get("city").and_then(Value::as_str).unwrap_or_default(),
                c.get("country").and_then(Value::as_str).unwrap_or_default(),
                c.get("days").and_then(Value::as_i64).unwrap_or(1),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user_prompt = format!(
        "Please validate this travel plan:\n\n\
=== TRIP OVERVIEW ===\nUnderstanding: {}\nDuration: {} days\nBudget Level: {}\n\n\
=== CITIES & ALLOCATION ===\n{}\n\n\
=== ROUTE ===\nValid: {}\nWarnings: {}\n\n\
=== ATTRACTIONS ===\n{} researched\n\n\
=== FOOD RECOMMENDATIONS ===\n{} gathered\n\n\
=== TRANSPORT OPTIONS ===\n{} identified\n\n\
=== BUDGET ===\nTotal: {}\n\n\
=== VALIDATION CONTEXT ===\nThis is iteration {} of {} maximum.\n{}",
        trip_summary.get("understanding").and_then(Value::as_str).unwrap_or("N/A"),
        trip_summary.get("total_days").cloned().unwrap_or(json!("N/A")),
        trip_summary.get("budget_level").and_then(Value::as_str).unwrap_or("N/A"),
        if cities_info.is_empty() { "  No cities planned".to_string() } else { cities_info },
        route_validation.get("is_valid").cloned().unwrap_or(json!("Unknown")),
        route_validation.get("warnings").cloned().unwrap_or(json!([])),
        attractions.len(),
        food_recommendations.len(),
        transport_options.len(),
        budget_breakdown.get("total").cloned().unwrap_or(json!("Unknown")),
        iteration + 1,
        max_replan_iterations,
        if iteration > 0 { "This is a re-planning attempt -- be strict about whether issues were addressed." } else { "This is the first validation pass." },
    );
    let _ = route_segments;

    let result = ctx.oracle.structured_call(WorkerKind::Critic, SYSTEM_PROMPT, &user_prompt, &output_schema()).await?;

    let mut issues: Vec<Value> = result.get("issues").and_then(Value::as_array).cloned().unwrap_or_default();
    let mut requires_replanning = result.get("requires_replanning").and_then(Value::as_bool).unwrap_or(false);
    let mut is_valid = result.get("is_valid").and_then(Value::as_bool).unwrap_or(true);

    if iteration >= max_replan_iterations && requires_replanning {
        is_valid = true;
        requires_replanning = false;
        issues.push(json!({
            "category": "process",
            "description": format!("Max re-planning iterations ({max_replan_iterations}) reached. Approving with known issues."),
            "severity": "medium",
        }));
    }

    let validation_result = json!({
        "is_valid": is_valid,
        "overall_score": result.get("overall_score").cloned().unwrap_or(Value::Null),
        "issues": issues,
        "requires_replanning": requires_replanning,
        "strengths": result.get("strengths").cloned().unwrap_or(json!([])),
        "final_recommendations": result.get("final_recommendations").cloned().unwrap_or(json!([])),
    });

    let mut update = json!({"validation_result": validation_result});

    if requires_replanning {
        let mut feedback_parts = Vec::new();
        if let Some(focus) = result.get("replan_focus").and_then(Value::as_str) {
            feedback_parts.push(format!("Focus area: {focus}"));
        }
        if let Some(instructions) = result.get("replan_instructions").and_then(Value::as_str) {
            feedback_parts.push(format!("Instructions: {instructions}"));
        }
        let critical_or_high: Vec<&Value> = issues
            .iter()
            .filter(|issue| matches!(issue.get("severity").and_then(Value::as_str), Some("critical") | Some("high")))
            .collect();
        if !critical_or_high.is_empty() {
            feedback_parts.push("\nCritical issues to address:".to_string());
            for issue in &critical_or_high {
                let severity = issue.get("severity").and_then(Value::as_str).unwrap_or("").to_uppercase();
                let description = issue.get("description").and_then(Value::as_str).unwrap_or("");
                feedback_parts.push(format!("- [{severity}] {description}"));
                if let Some(fix) = issue.get("suggested_fix").and_then(Value::as_str) {
                    feedback_parts.push(format!("  Suggestion: {fix}"));
                }
            }
        }
        update["critic_feedback"] = json!(feedback_parts.join("\n"));
        update["iteration_count"] = json!(iteration + 1);
        update["messages"] = json!([{"role": "critic", "content": "Plan requires re-planning; feedback recorded."}]);
    } else {
        update["critic_feedback"] = Value::Null;
        update["messages"] = json!([{"role": "critic", "content": "Plan approved."}]);
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    fn base_state() -> Value {
        json!({
            "trip_summary": {"understanding": "5 days", "total_days": 5, "budget_level": "mid_range"},
            "city_allocations": [{"city": "Tokyo", "country": "Japan", "days": 5, "visit_order": 1}],
            "iteration_count": 0,
        })
    }

    #[tokio::test]
    async fn test_no_issues_approves_plan() {
        let oracle = MockOracle::new();
        oracle.queue(WorkerKind::Critic, json!({"is_valid": true, "issues": [], "requires_replanning": false}));
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());

        let update = run(base_state(), &ctx).await.unwrap();
        assert_eq!(update["validation_result"]["is_valid"], json!(true));
        assert_eq!(update["critic_feedback"], Value::Null);
        assert!(update.get("iteration_count").is_none());
    }

    #[tokio::test]
    async fn test_critical_issue_triggers_replan_and_increments_iteration() {
        let oracle = MockOracle::new();
        oracle.queue(
            WorkerKind::Critic,
            json!({
                "is_valid": false,
                "issues": [{"category": "logistics", "description": "Impossible day trip", "severity": "critical", "suggested_fix": "Add a night in between"}],
                "requires_replanning": true,
                "replan_focus": "Route logistics",
            }),
        );
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());

        let update = run(base_state(), &ctx).await.unwrap();
        assert_eq!(update["iteration_count"], json!(1));
        assert!(update["critic_feedback"].as_str().unwrap().contains("Impossible day trip"));
    }

    #[tokio::test]
    async fn test_cap_reached_forces_approval_with_synthetic_issue() {
        let oracle = MockOracle::new();
        oracle.queue(
            WorkerKind::Critic,
            json!({"is_valid": false, "issues": [], "requires_replanning": true}),
        );
        let ctx = WorkerContext::new(std::sync::Arc::new(oracle), Cache::new());

        let mut state = base_state();
        state["iteration_count"] = json!(MAX_REPLAN_ITERATIONS);
        let update = run(state, &ctx).await.unwrap();

        assert_eq!(update["validation_result"]["is_valid"], json!(true));
        assert_eq!(update["validation_result"]["requires_replanning"], json!(false));
        assert_eq!(update["critic_feedback"], Value::Null);
        let issues = update["validation_result"]["issues"].as_array().unwrap();
        assert_eq!(issues[0]["category"], json!("process"));
        assert_eq!(issues[0]["severity"], json!("medium"));
    }
}
