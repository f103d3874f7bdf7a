//! Builds the planning graph: ten nodes wired in the fixed pipeline order,
//! with two conditional branch points -- clarification's suspend-or-continue
//! router and the critic's replan-or-finalize router.
//!
//! Every worker's `run(state, ctx)` function is lifted into a
//! [`travel_core::graph::NodeExecutor`] closure that clones the shared
//! [`WorkerContext`] once at graph-build time and moves it into the
//! closure; nodes never reconstruct or look up their context per call.

use crate::config::EngineConfig;
use std::collections::HashMap;
use std::sync::Arc;
use travel_core::graph::{BranchTarget, Graph, NodeExecutor, NodeSpec, END, START};
use travel_workers::WorkerContext;

fn executor<F, Fut>(ctx: WorkerContext, f: F) -> NodeExecutor
where
    F: Fn(serde_json::Value, WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = travel_workers::Result<serde_json::Value>> + Send + 'static,
{
    Arc::new(move |state| {
        let ctx = ctx.clone();
        let fut = f(state, ctx);
        Box::pin(async move { fut.await.map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>) })
    })
}

fn node(name: &str, reads: &[&str], writes: &[&str], executor: NodeExecutor) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        executor,
        reads: reads.iter().map(|s| s.to_string()).collect(),
        writes: writes.iter().map(|s| s.to_string()).collect(),
    }
}

/// Builds the unvalidated graph; `CompiledGraph::compile` validates it.
pub fn build_graph(ctx: WorkerContext, config: &EngineConfig) -> Graph {
    let ctx = ctx
        .with_fanout(config.fanout)
        .with_max_replan_iterations(config.max_replan_iterations)
        .with_max_clarification_questions(config.max_clarification_questions);
    let mut graph = Graph::new();

    graph.add_node(
        "clarification".to_string(),
        node(
            "clarification",
            &["user_request"],
            &["clarification_needed", "clarification_questions", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::clarification::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "process_answers".to_string(),
        node(
            "process_answers",
            &["clarification_answers"],
            &["user_request", "origin_city", "specific_destinations", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::process_answers::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "planner".to_string(),
        node(
            "planner",
            &["user_request", "critic_feedback"],
            &["trip_summary", "city_allocations", "critic_feedback", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::planner::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "geography".to_string(),
        node(
            "geography",
            &["city_allocations"],
            &["route_validation", "route_segments", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::geography::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "research".to_string(),
        node(
            "research",
            &["city_allocations"],
            &["attractions", "hotels", "research_sources", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::research::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "food_culture".to_string(),
        node(
            "food_culture",
            &["city_allocations", "dietary_preferences"],
            &["food_recommendations", "cultural_tips", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::food_culture::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "price_scraper".to_string(),
        node(
            "price_scraper",
            &["city_allocations", "origin_city", "travel_start_date"],
            &["scraped_transport_prices", "nearest_stations", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::price_scraper::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "transport_budget".to_string(),
        node(
            "transport_budget",
            &["route_segments", "scraped_transport_prices"],
            &["transport_options", "budget_breakdown", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::transport_budget::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "critic".to_string(),
        node(
            "critic",
            &["trip_summary", "city_allocations", "route_validation", "attractions", "budget_breakdown"],
            &["validation_result", "critic_feedback", "iteration_count", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::critic::run(s, &c).await }),
        ),
    );
    graph.add_node(
        "finalizer".to_string(),
        node(
            "finalizer",
            &["city_allocations", "attractions", "food_recommendations", "transport_options", "budget_breakdown", "validation_result"],
            &["final_itinerary", "messages"],
            executor(ctx.clone(), |s, c| async move { travel_workers::finalizer::run(s, &c).await }),
        ),
    );

    graph.set_entry("clarification".to_string());
    graph.add_edge(START.to_string(), "clarification".to_string());

    let mut clarification_branches = HashMap::new();
    clarification_branches.insert("continue".to_string(), BranchTarget::Node("planner".to_string()));
    clarification_branches.insert(
        "wait_for_answers".to_string(),
        BranchTarget::Suspend("clarification_needed".to_string()),
    );
    graph.add_conditional_edge(
        "clarification".to_string(),
        Arc::new(|state| {
            if state["clarification_needed"].as_bool().unwrap_or(false) {
                "wait_for_answers".to_string()
            } else {
                "continue".to_string()
            }
        }),
        clarification_branches,
    );

    graph.add_edge("process_answers".to_string(), "planner".to_string());
    graph.add_edge("planner".to_string(), "geography".to_string());
    graph.add_edge("geography".to_string(), "research".to_string());
    graph.add_edge("research".to_string(), "food_culture".to_string());
    graph.add_edge("food_culture".to_string(), "price_scraper".to_string());
    graph.add_edge("price_scraper".to_string(), "transport_budget".to_string());
    graph.add_edge("transport_budget".to_string(), "critic".to_string());

    let mut critic_branches = HashMap::new();
    critic_branches.insert("replan".to_string(), BranchTarget::Node("planner".to_string()));
    critic_branches.insert("finalize".to_string(), BranchTarget::Node("finalizer".to_string()));
    graph.add_conditional_edge(
        "critic".to_string(),
        Arc::new(|state| {
            if state["validation_result"]["requires_replanning"].as_bool().unwrap_or(false) {
                "replan".to_string()
            } else {
                "finalize".to_string()
            }
        }),
        critic_branches,
    );

    graph.add_edge("finalizer".to_string(), END.to_string());

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;
    use travel_cache::Cache;
    use travel_oracle::MockOracle;

    #[test]
    fn test_graph_validates() {
        let ctx = WorkerContext::new(StdArc::new(MockOracle::new()), Cache::new());
        let graph = build_graph(ctx, &EngineConfig::default());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_all_ten_workers_registered() {
        let ctx = WorkerContext::new(StdArc::new(MockOracle::new()), Cache::new());
        let graph = build_graph(ctx, &EngineConfig::default());
        assert_eq!(graph.nodes.len(), 10);
    }
}
