//! Layered engine configuration, resolved once at bootstrap.
//!
//! Every knob has a typed default; `from_env` overlays environment
//! variables on top using the same `get_env_parse_or` convention the rest
//! of the workspace uses for its own env-backed config.

use tooling::config::get_env_parse_or;

/// Max parallel subtasks a fan-out worker spawns.
pub const DEFAULT_FANOUT: usize = 8;
/// Cap on clarification questions in a single round.
pub const DEFAULT_MAX_CLARIFICATION_QUESTIONS: usize = 6;
/// Hard ceiling on total node executions per run (non-termination guard).
pub const DEFAULT_RECURSION_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on critic -> planner loops.
    pub max_replan_iterations: u64,
    /// Max parallel subtasks per fan-out worker.
    pub fanout: usize,
    /// Cap on clarification questions in a single round.
    pub max_clarification_questions: usize,
    /// Hard ceiling on total node executions per run.
    pub recursion_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_replan_iterations: travel_workers::critic::MAX_REPLAN_ITERATIONS,
            fanout: DEFAULT_FANOUT,
            max_clarification_questions: DEFAULT_MAX_CLARIFICATION_QUESTIONS,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Overlay `TRAVEL_ENGINE_*` environment variables on top of the
    /// defaults. Never fails: a malformed override falls back to default
    /// rather than aborting bootstrap, since none of these knobs can make a
    /// running session unsafe, only slower or more conservative.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_replan_iterations: get_env_parse_or(
                "TRAVEL_ENGINE_MAX_REPLAN_ITERATIONS",
                defaults.max_replan_iterations,
            )
            .unwrap_or(defaults.max_replan_iterations),
            fanout: get_env_parse_or("TRAVEL_ENGINE_FANOUT", defaults.fanout).unwrap_or(defaults.fanout),
            max_clarification_questions: get_env_parse_or(
                "TRAVEL_ENGINE_MAX_CLARIFICATION_QUESTIONS",
                defaults.max_clarification_questions,
            )
            .unwrap_or(defaults.max_clarification_questions),
            recursion_limit: get_env_parse_or("TRAVEL_ENGINE_RECURSION_LIMIT", defaults.recursion_limit)
                .unwrap_or(defaults.recursion_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.max_replan_iterations, 3);
        assert_eq!(config.fanout, 8);
        assert_eq!(config.max_clarification_questions, 6);
    }
}
