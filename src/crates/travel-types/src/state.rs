//! `SessionState`: the typed view of a planning session's shared state.
//!
//! The executor in `travel_core` works entirely in `serde_json::Value` --
//! it has no notion of what fields exist, only what reducer governs each
//! key. `SessionState` is the typed counterpart workers and tests build
//! against; [`SessionState::initial`] produces the zero-value state a new
//! session starts from and [`build_schema`] wires every field in the table
//! below to its reducer, mirroring the reference planner's per-field
//! `Annotated` declarations.

use crate::entities::{ClarificationQuestion, RouteSegment, ValidationIssue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use travel_core::state::{AppendReducer, OverwriteReducer, StateSchema};

/// A single tagged entry in the session's running message log, used for
/// diagnostics and to satisfy the "one entry per node executed" invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub role: String,
    pub content: String,
}

/// The full shared state of one planning session, grouped by producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    // Input
    pub user_request: String,

    // Message log
    #[serde(default)]
    pub messages: Vec<LogMessage>,

    // Clarification
    #[serde(default)]
    pub clarification_needed: Option<bool>,
    #[serde(default)]
    pub clarification_questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub clarification_answers: Option<Value>,

    // User facts
    #[serde(default)]
    pub origin_city: Option<String>,
    #[serde(default)]
    pub specific_destinations: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub travel_pace: Option<String>,
    #[serde(default)]
    pub places_visited: Vec<String>,
    #[serde(default)]
    pub travel_start_date: Option<String>,
    #[serde(default)]
    pub travel_end_date: Option<String>,
    #[serde(default)]
    pub travel_date_flexibility: Option<String>,

    // Plan
    #[serde(default)]
    pub trip_summary: Option<Value>,
    #[serde(default)]
    pub city_allocations: Vec<Value>,

    // Route
    #[serde(default)]
    pub route_validation: Option<Value>,
    #[serde(default)]
    pub route_segments: Vec<RouteSegment>,

    // Gathered (append-accumulate)
    #[serde(default)]
    pub attractions: Vec<Value>,
    #[serde(default)]
    pub hotels: Vec<Value>,
    #[serde(default)]
    pub research_sources: Vec<Value>,

    // Food
    #[serde(default)]
    pub food_recommendations: Vec<Value>,
    #[serde(default)]
    pub cultural_tips: Vec<String>,

    // Prices
    #[serde(default)]
    pub scraped_transport_prices: Vec<Value>,
    #[serde(default)]
    pub nearest_stations: Option<Value>,

    // Budget
    #[serde(default)]
    pub transport_options: Vec<Value>,
    #[serde(default)]
    pub budget_breakdown: Option<Value>,

    // Validation
    #[serde(default)]
    pub validation_result: Option<Value>,
    #[serde(default)]
    pub critic_feedback: Option<String>,

    // Control
    #[serde(default)]
    pub iteration_count: u32,
    #[serde(default)]
    pub current_city_index: u32,

    // Output
    #[serde(default)]
    pub final_itinerary: Option<Value>,
}

impl SessionState {
    /// The zero-value state a new session starts from, mirroring the
    /// reference planner's `get_initial_state`.
    pub fn initial(user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            messages: Vec::new(),
            clarification_needed: None,
            clarification_questions: Vec::new(),
            clarification_answers: None,
            origin_city: None,
            specific_destinations: Vec::new(),
            dietary_preferences: Vec::new(),
            travel_pace: None,
            places_visited: Vec::new(),
            travel_start_date: None,
            travel_end_date: None,
            travel_date_flexibility: None,
            trip_summary: None,
            city_allocations: Vec::new(),
            route_validation: None,
            route_segments: Vec::new(),
            attractions: Vec::new(),
            hotels: Vec::new(),
            research_sources: Vec::new(),
            food_recommendations: Vec::new(),
            cultural_tips: Vec::new(),
            scraped_transport_prices: Vec::new(),
            nearest_stations: None,
            transport_options: Vec::new(),
            budget_breakdown: None,
            validation_result: None,
            critic_feedback: None,
            iteration_count: 0,
            current_city_index: 0,
            final_itinerary: None,
        }
    }

    /// Serialize to the `serde_json::Value` form the graph executor
    /// operates on.
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).expect("SessionState always serializes")
    }

    /// Parse a state `Value` back into its typed form, e.g. after a run
    /// completes or a checkpoint is loaded.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Every field name in [`SessionState`], paired with its governing
/// reducer, registered the way a node's declared `writes` are expected to
/// line up with this table. An update key not in the schema still applies,
/// just without accumulation.
pub fn build_schema() -> StateSchema {
    let mut schema = StateSchema::new();

    schema.add_field("user_request", Box::new(OverwriteReducer));
    schema.add_field("messages", Box::new(AppendReducer));

    schema.add_field("clarification_needed", Box::new(OverwriteReducer));
    schema.add_field("clarification_questions", Box::new(OverwriteReducer));
    schema.add_field("clarification_answers", Box::new(OverwriteReducer));

    schema.add_field("origin_city", Box::new(OverwriteReducer));
    schema.add_field("specific_destinations", Box::new(OverwriteReducer));
    schema.add_field("dietary_preferences", Box::new(OverwriteReducer));
    schema.add_field("travel_pace", Box::new(OverwriteReducer));
    schema.add_field("places_visited", Box::new(OverwriteReducer));
    schema.add_field("travel_start_date", Box::new(OverwriteReducer));
    schema.add_field("travel_end_date", Box::new(OverwriteReducer));
    schema.add_field("travel_date_flexibility", Box::new(OverwriteReducer));

    schema.add_field("trip_summary", Box::new(OverwriteReducer));
    schema.add_field("city_allocations", Box::new(OverwriteReducer));

    schema.add_field("route_validation", Box::new(OverwriteReducer));
    schema.add_field("route_segments", Box::new(OverwriteReducer));

    schema.add_field("attractions", Box::new(AppendReducer));
    schema.add_field("hotels", Box::new(AppendReducer));
    schema.add_field("research_sources", Box::new(AppendReducer));

    schema.add_field("food_recommendations", Box::new(OverwriteReducer));
    schema.add_field("cultural_tips", Box::new(OverwriteReducer));

    schema.add_field("scraped_transport_prices", Box::new(OverwriteReducer));
    schema.add_field("nearest_stations", Box::new(OverwriteReducer));

    schema.add_field("transport_options", Box::new(OverwriteReducer));
    schema.add_field("budget_breakdown", Box::new(OverwriteReducer));

    schema.add_field("validation_result", Box::new(OverwriteReducer));
    schema.add_field("critic_feedback", Box::new(OverwriteReducer));

    schema.add_field("iteration_count", Box::new(OverwriteReducer));
    schema.add_field("current_city_index", Box::new(OverwriteReducer));

    schema.add_field("final_itinerary", Box::new(OverwriteReducer));

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_state_round_trips_through_value() {
        let state = SessionState::initial("5 days in Tokyo");
        let value = state.into_value();
        assert_eq!(value["user_request"], "5 days in Tokyo");
        assert_eq!(value["iteration_count"], 0);
        let back = SessionState::from_value(value).unwrap();
        assert_eq!(back.user_request, "5 days in Tokyo");
    }

    #[test]
    fn test_schema_applies_append_reducer_to_attractions() {
        let schema = build_schema();
        let mut state = SessionState::initial("trip").into_value();
        schema
            .apply(&mut state, &json!({"attractions": [{"name": "Temple", "city": "Kyoto"}]}))
            .unwrap();
        schema
            .apply(&mut state, &json!({"attractions": [{"name": "Tower", "city": "Tokyo"}]}))
            .unwrap();
        assert_eq!(state["attractions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_schema_overwrites_iteration_count() {
        let schema = build_schema();
        let mut state = SessionState::initial("trip").into_value();
        schema.apply(&mut state, &json!({"iteration_count": 1})).unwrap();
        assert_eq!(state["iteration_count"], 1);
    }

    #[test]
    fn test_unknown_field_not_in_schema_still_overwrites() {
        let schema = build_schema();
        let mut state = SessionState::initial("trip").into_value();
        schema.apply(&mut state, &json!({"some_future_field": "value"})).unwrap();
        assert_eq!(state["some_future_field"], "value");
    }
}
