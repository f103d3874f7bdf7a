//! Graph data structures: nodes, edges, and branch targets.
//!
//! A [`Graph`] is a table of [`NodeSpec`]s plus a table of outgoing [`Edge`]s
//! per node. There is no class hierarchy and no node-discovery magic: the
//! executor in [`crate::executor`] walks exactly these two tables.
//!
//! Conditional edges route by label to a [`BranchTarget`], which is either
//! another node or a request to suspend the session (used by the
//! clarification step's `wait_for_answers` branch — see
//! [`crate::executor::RunOutcome::Suspended`]).
//!
//! ```rust
//! use travel_core::graph::{Graph, NodeSpec, BranchTarget, START, END};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let mut graph = Graph::new();
//!
//! graph.add_node("process".to_string(), NodeSpec {
//!     name: "process".to_string(),
//!     executor: Arc::new(|state| Box::pin(async move { Ok(state) })),
//!     reads: vec![],
//!     writes: vec![],
//! });
//!
//! graph.add_edge(START.to_string(), "process".to_string());
//! graph.add_edge("process".to_string(), END.to_string());
//!
//! assert!(graph.validate().is_ok());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

/// Node identifier. Two identifiers are reserved: [`START`] and [`END`].
pub type NodeId = String;

/// Virtual entry node. Never executes.
pub const START: &str = "__start__";

/// Virtual terminal node. Reaching it ends the run with [`crate::executor::RunOutcome::Completed`].
pub const END: &str = "__end__";

/// Where a conditional edge's chosen branch leads.
#[derive(Clone, Debug)]
pub enum BranchTarget {
    /// Continue execution at this node.
    Node(NodeId),
    /// Stop executing and return [`crate::executor::RunOutcome::Suspended`]
    /// with this reason. Used by clarification's `wait_for_answers` branch.
    Suspend(String),
}

/// A transition out of a node: unconditional, or chosen at runtime by a router.
#[derive(Clone)]
pub enum Edge {
    /// Always proceeds to the given node.
    Direct(NodeId),

    /// Router inspects state and returns a branch label; `branches` maps that
    /// label to its [`BranchTarget`]. A label the router returns that is not
    /// in `branches` fails the session (unknown conditional-branch labels are
    /// fatal, never silently ignored).
    Conditional {
        router: Arc<dyn Fn(&serde_json::Value) -> String + Send + Sync>,
        branches: HashMap<String, BranchTarget>,
    },
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Direct(node_id) => f.debug_tuple("Direct").field(node_id).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("router", &"<function>")
                .field("branches", branches)
                .finish(),
        }
    }
}

/// Node executor function type: `state -> partial_state_update`.
pub type NodeExecutor = Arc<
    dyn Fn(
            serde_json::Value,
        ) -> std::pin::Pin<
            Box<
                dyn std::future::Future<
                        Output = Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>,
                    > + Send,
            >,
        > + Send
        + Sync,
>;

/// A node's executor plus the state fields it reads and writes (used for
/// diagnostics and graph visualization, not for dependency scheduling --
/// execution is single-threaded-cooperative per session, not data-flow driven).
#[derive(Clone)]
pub struct NodeSpec {
    pub name: String,
    pub executor: NodeExecutor,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
}

impl std::fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("executor", &"<function>")
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .finish()
    }
}

/// The node and edge tables that make up a workflow graph.
#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: HashMap<NodeId, NodeSpec>,
    pub edges: HashMap<NodeId, Vec<Edge>>,
    pub entry: NodeId,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: START.to_string(),
        }
    }

    pub fn add_node(&mut self, id: NodeId, spec: NodeSpec) {
        self.nodes.insert(id, spec);
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.entry(from).or_insert_with(Vec::new).push(Edge::Direct(to));
    }

    pub fn add_conditional_edge(
        &mut self,
        from: NodeId,
        router: Arc<dyn Fn(&serde_json::Value) -> String + Send + Sync>,
        branches: HashMap<String, BranchTarget>,
    ) {
        self.edges
            .entry(from)
            .or_insert_with(Vec::new)
            .push(Edge::Conditional { router, branches });
    }

    pub fn set_entry(&mut self, node: NodeId) {
        self.entry = node;
    }

    /// Checks entry point, edge sources, and all branch/direct targets exist.
    pub fn validate(&self) -> Result<(), String> {
        if !self.nodes.contains_key(&self.entry) && self.entry != START {
            return Err(format!("Entry point {} does not exist", self.entry));
        }

        for (from, edges) in &self.edges {
            if !self.nodes.contains_key(from) && from != START {
                return Err(format!("Edge source {} does not exist", from));
            }

            for edge in edges {
                match edge {
                    Edge::Direct(to) => {
                        if !self.nodes.contains_key(to) && to != END {
                            return Err(format!("Edge target {} does not exist", to));
                        }
                    }
                    Edge::Conditional { branches, .. } => {
                        for target in branches.values() {
                            if let BranchTarget::Node(to) = target {
                                if !self.nodes.contains_key(to) && to != END {
                                    return Err(format!("Branch target {} does not exist", to));
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
