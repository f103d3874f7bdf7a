//! # travel-types
//!
//! The typed shared state and entity vocabulary for the travel planning
//! coordination fabric, layered over `travel-core`'s untyped
//! [`travel_core::state::StateSchema`].
//!
//! ## Modules
//!
//! - [`state`] -- [`state::SessionState`] and [`state::build_schema`]
//! - [`entities`] -- [`entities::ClarificationQuestion`], [`entities::ValidationIssue`], [`entities::RouteSegment`]

pub mod entities;
pub mod state;

pub use entities::{
    ClarificationQuestion, IssueCategory, QuestionType, RouteSegment, Severity, TransportMode,
    ValidationIssue,
};
pub use state::{build_schema, LogMessage, SessionState};
