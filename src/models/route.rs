//! Vehicle routes.

use crate::evaluation::{route_cost, route_load};
use crate::models::RoutingProblem;

/// An ordered sequence of pickups assigned to a single vehicle.
///
/// The depot is implicit at both ends and never stored in `nodes`. `cost`
/// and `load` are derived from the sequence and recomputed by every
/// mutating method, so they are never stale.
///
/// # Examples
///
/// ```
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::models::{Instance, Route};
///
/// let m = CostMatrix::from_data(3, vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1, 1], &[5]).unwrap();
///
/// let mut route = Route::new(0);
/// route.insert(0, 2, &inst);
/// route.insert(0, 1, &inst);
/// assert_eq!(route.nodes(), &[1, 2]);
/// assert_eq!(route.sequence(0), vec![0, 1, 2, 0]);
/// assert_eq!(route.cost(), 4.0);
/// assert_eq!(route.load(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vehicle: usize,
    nodes: Vec<usize>,
    cost: f64,
    load: i64,
}

impl Route {
    /// Creates an empty (depot → depot) route for the vehicle at fleet position `vehicle`.
    pub fn new(vehicle: usize) -> Self {
        Self {
            vehicle,
            nodes: Vec::new(),
            cost: 0.0,
            load: 0,
        }
    }

    /// Creates a route visiting `nodes` in order.
    pub fn with_nodes<P: RoutingProblem>(vehicle: usize, nodes: Vec<usize>, problem: &P) -> Self {
        let mut route = Self::new(vehicle);
        route.set_nodes(nodes, problem);
        route
    }

    /// Fleet position of the vehicle driving this route.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Visited nodes in order, depot excluded.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.nodes.contains(&node)
    }

    /// Sum of arc costs from the depot, through every node, back to the depot.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Sum of node demands.
    pub fn load(&self) -> i64 {
        self.load
    }

    /// Depot-anchored sequence: `[depot, nodes..., depot]`.
    pub fn sequence(&self, depot: usize) -> Vec<usize> {
        let mut seq = Vec::with_capacity(self.nodes.len() + 2);
        seq.push(depot);
        seq.extend_from_slice(&self.nodes);
        seq.push(depot);
        seq
    }

    /// Node before position `pos` (the depot for the first position).
    pub fn prev(&self, pos: usize, depot: usize) -> usize {
        if pos == 0 {
            depot
        } else {
            self.nodes[pos - 1]
        }
    }

    /// Node after position `pos` (the depot for the last position).
    pub fn next(&self, pos: usize, depot: usize) -> usize {
        self.nodes.get(pos + 1).copied().unwrap_or(depot)
    }

    pub fn insert<P: RoutingProblem>(&mut self, pos: usize, node: usize, problem: &P) {
        self.nodes.insert(pos, node);
        self.refresh(problem);
    }

    pub fn remove<P: RoutingProblem>(&mut self, pos: usize, problem: &P) -> usize {
        let node = self.nodes.remove(pos);
        self.refresh(problem);
        node
    }

    /// Replaces the node at `pos`, returning the old one.
    pub fn replace<P: RoutingProblem>(&mut self, pos: usize, node: usize, problem: &P) -> usize {
        let old = std::mem::replace(&mut self.nodes[pos], node);
        self.refresh(problem);
        old
    }

    /// Reverses the segment `nodes[from..=to]`.
    pub fn reverse<P: RoutingProblem>(&mut self, from: usize, to: usize, problem: &P) {
        self.nodes[from..=to].reverse();
        self.refresh(problem);
    }

    pub fn set_nodes<P: RoutingProblem>(&mut self, nodes: Vec<usize>, problem: &P) {
        self.nodes = nodes;
        self.refresh(problem);
    }

    fn refresh<P: RoutingProblem>(&mut self, problem: &P) {
        self.cost = route_cost(problem, &self.nodes);
        self.load = route_load(problem, &self.nodes);
    }
}
