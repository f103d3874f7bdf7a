//! Clarification worker: decides whether the free-text request
//! carries enough information to plan, and if not, asks bounded, typed
//! questions with `travel_dates` always first.

use crate::context::WorkerContext;
use crate::error::{Result, WorkerError};
use serde_json::{json, Value};
use travel_oracle::WorkerKind;
use travel_types::{ClarificationQuestion, QuestionType};

/// Default cap on clarification questions per round; overridable via
/// [`WorkerContext::max_clarification_questions`].
pub const DEFAULT_MAX_CLARIFICATION_QUESTIONS: usize = 6;

const SYSTEM_PROMPT: &str = "You are a travel planning assistant. Before creating an itinerary, \
determine what information is missing from the traveler's request: travel dates, origin city, \
specific city-level destinations, places already visited, dietary preferences, and travel pace. \
Always ask about travel dates first when they are missing. Only ask about information not already \
present in the request. Ask at most 6 questions total.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["needs_clarification", "questions"],
        "properties": {
            "needs_clarification": {"type": "boolean"},
            "questions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "text", "type", "required"],
                    "properties": {
                        "id": {"type": "string"},
                        "text": {"type": "string"},
                        "type": {
                            "type": "string",
                            "enum": ["travel_dates", "origin_city", "specific_destinations", "visited_places", "dietary", "travel_pace"]
                        },
                        "required": {"type": "boolean"},
                        "options": {"type": "array", "items": {"type": "string"}},
                        "allow_multiple": {"type": "boolean"}
                    }
                }
            }
        }
    })
}

pub async fn run(state: Value, ctx: &WorkerContext) -> Result<Value> {
    let user_request = state
        .get("user_request")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkerError::invalid_state("user_request", "missing or not a string"))?;

    let user_prompt =
        format!("Analyze this travel request and determine what clarification is needed:\n\n{user_request}");

    let result = ctx
        .oracle
        .structured_call(WorkerKind::Clarification, SYSTEM_PROMPT, &user_prompt, &output_schema())
        .await?;

    let needs_clarification = result.get("needs_clarification").and_then(Value::as_bool).unwrap_or(false);

    let mut questions: Vec<ClarificationQuestion> =
        serde_json::from_value(result.get("questions").cloned().unwrap_or(Value::Array(vec![]))).unwrap_or_default();
    questions.sort_by_key(|q| q.question_type != QuestionType::TravelDates);
    questions.truncate(ctx.max_clarification_questions);

    let content = if needs_clarification {
        format!("Need to ask {} clarifying question(s) before planning.", questions.len())
    } else {
        "Request has enough detail to plan directly.".to_string()
    };

    Ok(json!({
        "clarification_needed": needs_clarification,
        "clarification_questions": questions,
        "messages": [{"role": "clarification", "content": content}],
    }))
}
