//! Sequential cheapest-insertion constructive heuristic.
//!
//! # Algorithm
//!
//! Vehicles are filled one at a time in fleet order. Each starts with an
//! empty depot → depot route. While some unrouted node still fits the
//! remaining capacity, the node/position pair with the smallest insertion
//! cost
//!
//! ```text
//! delta = c(prev, k) + c(k, next) - c(prev, next)
//! ```
//!
//! is committed. When nothing fits the next vehicle takes over. Nodes left
//! over after the last vehicle make the instance infeasible for this fleet.
//!
//! Ties go to the lowest node index, then the earliest position.
//!
//! # Complexity
//!
//! O(n³) in the worst case: up to n insertions, each scanning n nodes over
//! up to n positions.

use tracing::{debug, instrument};

use crate::error::RoutingError;
use crate::evaluation::insertion_delta;
use crate::models::{Route, RoutingProblem, Solution};

/// Builds a feasible starting solution by cheapest insertion.
///
/// The result satisfies capacity on every route and routes every non-depot
/// node exactly once; quality beyond that is left to local search.
///
/// # Errors
///
/// [`RoutingError::CapacityInfeasible`] with the leftover node labels and
/// their total demand when the fleet runs out before every node is placed.
///
/// # Examples
///
/// ```
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::models::Instance;
/// use commute_routing::constructive::cheapest_insertion;
///
/// let m = CostMatrix::from_data(
///     4,
///     vec![0.0, 1.0, 2.0, 3.0, 1.0, 0.0, 1.0, 2.0, 2.0, 1.0, 0.0, 1.0, 3.0, 2.0, 1.0, 0.0],
/// )
/// .unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1, 1, 1], &[3]).unwrap();
///
/// let solution = cheapest_insertion(&inst).unwrap();
/// assert_eq!(solution.num_served(), 3);
/// assert_eq!(solution.total_cost(), 6.0);
/// ```
#[instrument(skip_all, fields(nodes = problem.num_nodes(), vehicles = problem.num_vehicles()))]
pub fn cheapest_insertion<P: RoutingProblem>(problem: &P) -> Result<Solution, RoutingError> {
    let mut unrouted: Vec<usize> = problem.customers().collect();
    let mut routes = Vec::with_capacity(problem.num_vehicles());

    for vehicle in 0..problem.num_vehicles() {
        let mut route = Route::new(vehicle);
        let capacity = problem.capacity(vehicle);

        while let Some((slot, pos)) = cheapest_feasible(problem, &route, &unrouted, capacity) {
            let node = unrouted.remove(slot);
            route.insert(pos, node, problem);
        }

        debug!(
            vehicle,
            stops = route.len(),
            load = route.load(),
            cost = route.cost(),
            "route constructed"
        );
        routes.push(route);
    }

    if !unrouted.is_empty() {
        let demand_deficit = unrouted.iter().map(|&n| problem.demand(n) as i64).sum();
        return Err(RoutingError::CapacityInfeasible {
            unrouted: unrouted.iter().map(|&n| problem.node_label(n)).collect(),
            demand_deficit,
        });
    }

    debug_assert!(routes.iter().all(|r| !r.contains(problem.depot())));
    Ok(Solution::from_routes(routes))
}

/// Best `(index into unrouted, insertion position)` that fits `capacity`.
///
/// `unrouted` is kept sorted ascending, so the strict comparison leaves ties
/// with the lowest node index and earliest position.
fn cheapest_feasible<P: RoutingProblem>(
    problem: &P,
    route: &Route,
    unrouted: &[usize],
    capacity: i32,
) -> Option<(usize, usize)> {
    let depot = problem.depot();
    let remaining = i64::from(capacity) - route.load();
    let mut best: Option<(usize, usize, f64)> = None;

    for (slot, &node) in unrouted.iter().enumerate() {
        if i64::from(problem.demand(node)) > remaining {
            continue;
        }
        for pos in 0..=route.len() {
            let prev = route.prev(pos, depot);
            let next = if pos == route.len() {
                depot
            } else {
                route.nodes()[pos]
            };
            let delta = insertion_delta(problem, prev, node, next);
            if best.is_none_or(|(_, _, d)| delta < d) {
                best = Some((slot, pos, delta));
            }
        }
    }

    best.map(|(slot, pos, _)| (slot, pos))
}
