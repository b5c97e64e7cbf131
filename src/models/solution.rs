//! Solution and violation types.

use super::{Route, RoutingProblem};

/// A broken solution invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Route load exceeds its vehicle's capacity.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Load that exceeded capacity.
        load: i64,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// A node is visited by more than one route or twice in one route.
    DuplicateNode { node: usize },
    /// A non-depot node is not visited at all.
    MissingNode { node: usize },
    /// The depot appears inside a route body.
    DepotInRoute { route_index: usize },
    /// A route references a node index outside the instance.
    UnknownNode { route_index: usize, node: usize },
    /// A route's stored cost disagrees with its arc sum.
    StaleCost {
        route_index: usize,
        stored: f64,
        actual: f64,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// One route per vehicle, in fleet order.
///
/// Unused vehicles keep an empty route.
///
/// # Examples
///
/// ```
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::models::{Instance, Solution};
///
/// let m = CostMatrix::from_data(2, vec![0.0, 3.0, 3.0, 0.0]).unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1], &[1, 1]).unwrap();
///
/// let mut sol = Solution::empty(&inst);
/// assert_eq!(sol.num_routes(), 2);
/// sol.route_mut(1).insert(0, 1, &inst);
/// assert_eq!(sol.total_cost(), 6.0);
/// assert_eq!(sol.num_used(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// One empty route per vehicle.
    pub fn empty<P: RoutingProblem>(problem: &P) -> Self {
        Self {
            routes: (0..problem.num_vehicles()).map(Route::new).collect(),
        }
    }

    /// Wraps routes; `routes[v]` must belong to vehicle `v`.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        debug_assert!(routes.iter().enumerate().all(|(v, r)| r.vehicle() == v));
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> &Route {
        &self.routes[vehicle]
    }

    pub fn route_mut(&mut self, vehicle: usize) -> &mut Route {
        &mut self.routes[vehicle]
    }

    /// Two distinct routes borrowed mutably at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b`.
    pub fn route_pair_mut(&mut self, a: usize, b: usize) -> (&mut Route, &mut Route) {
        assert_ne!(a, b, "route_pair_mut needs two distinct routes");
        if a < b {
            let (left, right) = self.routes.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.routes.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Routes with at least one stop.
    pub fn num_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Sum of route costs.
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(Route::cost).sum()
    }

    pub fn total_load(&self) -> i64 {
        self.routes.iter().map(Route::load).sum()
    }

    /// Total number of nodes served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Every broken invariant; empty for a feasible solution.
    pub fn violations<P: RoutingProblem>(&self, problem: &P) -> Vec<Violation> {
        crate::evaluation::evaluate_solution(problem, self).1
    }

    /// Position `(route, index)` of a node, if routed.
    pub fn locate(&self, node: usize) -> Option<(usize, usize)> {
        self.routes.iter().enumerate().find_map(|(r, route)| {
            route.nodes().iter().position(|&n| n == node).map(|p| (r, p))
        })
    }
}
