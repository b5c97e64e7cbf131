//! Error type shared by every stage of the optimization pipeline.

use thiserror::Error;

use crate::extract::Plan;

/// Terminal failure of a single optimization request.
///
/// None of these are retried internally; each carries enough context
/// (offending node, demand deficit, matrix shape) for the caller to act on.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Malformed request data: coordinates, ids, demands, capacities, shapes.
    #[error("invalid input: {reason}{}", node_suffix(.node))]
    InvalidInput {
        /// Human readable description.
        reason: String,
        /// Offending node id, when a single node is at fault.
        node: Option<String>,
    },

    /// The fleet cannot serve every node.
    #[error("fleet capacity is insufficient: {} node(s) unrouted, demand deficit {demand_deficit}", count(.unrouted))]
    CapacityInfeasible {
        /// Ids of the nodes that could not be placed.
        unrouted: Vec<String>,
        /// Demand that exceeds what the fleet can carry.
        demand_deficit: i64,
    },

    /// The time projector produced a matrix the solver cannot use.
    #[error("projected cost matrix rejected: {reason} (expected {expected}x{expected}, found {}x{})", .found.0, .found.1)]
    Projection {
        expected: usize,
        found: (usize, usize),
        reason: String,
    },

    /// Improvement stopped on its budget and the caller asked to be told.
    ///
    /// The plan is the best feasible solution found before the budget ran out.
    #[error("optimization budget exhausted; best plan costs {:.3}", .plan.total_cost)]
    BudgetExceeded { plan: Box<Plan> },
}

fn node_suffix(node: &Option<String>) -> String {
    match node {
        Some(id) => format!(" (node {id})"),
        None => String::new(),
    }
}

fn count(nodes: &[String]) -> usize {
    nodes.len()
}

impl RoutingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RoutingError::InvalidInput {
            reason: reason.into(),
            node: None,
        }
    }

    pub(crate) fn invalid_node(reason: impl Into<String>, node: impl Into<String>) -> Self {
        RoutingError::InvalidInput {
            reason: reason.into(),
            node: Some(node.into()),
        }
    }
}
