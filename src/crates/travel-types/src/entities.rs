//! Entity types referenced from session state: clarification questions,
//! validation issues, and route segments.
//!
//! These mirror the shape of the dicts the reference planner threads
//! through `clarification_questions`, `validation_result.issues`, and
//! `route_segments`, given real field names and closed enums instead of
//! free-form strings where the fabric needs to branch on them.

use serde::{Deserialize, Serialize};

/// The fixed set of things clarification can ask about, in the priority
/// order the clarification worker should emit them (`TravelDates` always
/// sorts first when present).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    TravelDates,
    OriginCity,
    SpecificDestinations,
    VisitedPlaces,
    Dietary,
    TravelPace,
}

/// A single clarification question surfaced to the caller when a session
/// suspends at `wait_for_answers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_multiple: bool,
}

/// Severity band the critic assigns to a [`ValidationIssue`]. Ordering
/// matches the replan decision table: `Critical` always forces a replan,
/// three or more `High` issues force one too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// The fixed issue taxonomy the critic reports against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Timing,
    Logistics,
    Budget,
    Feasibility,
    Balance,
    /// Synthetic category used only for the force-approval "cap reached"
    /// entry appended when `iteration_count` hits `MAX_REPLAN_ITERATIONS`.
    Process,
}

/// One finding produced by the critic. Never mutated after emission --
/// a replan produces a fresh `validation_result` rather than editing an
/// existing issue in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub category: IssueCategory,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub affected_days: Vec<u32>,
    #[serde(default)]
    pub affected_cities: Vec<String>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

/// Mode of inter-city transport the geography worker can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Flight,
    Train,
    Bus,
    Car,
    Ferry,
}

/// One leg of the inter-city route the geography worker validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from_city: String,
    pub to_city: String,
    pub distance_km: f64,
    pub recommended_mode: TransportMode,
    pub travel_time_hours: f64,
    pub feasible: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl RouteSegment {
    /// Distance-band default: `<300km` favors train/bus, `300-800km`
    /// prefers train, `>800km` calls for a flight.
    pub fn default_mode_for_distance(distance_km: f64) -> TransportMode {
        if distance_km < 300.0 {
            TransportMode::Train
        } else if distance_km <= 800.0 {
            TransportMode::Train
        } else {
            TransportMode::Flight
        }
    }
}
