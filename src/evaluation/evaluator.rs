//! Route cost evaluation and solution invariant checks.
//!
//! Costs are always the sum of consecutive arc costs read from the problem,
//! in travel direction, so asymmetric matrices are evaluated exactly.

use crate::models::{RoutingProblem, Solution, Violation, ViolationType};

const COST_TOLERANCE: f64 = 1e-6;

/// Cost of `depot → nodes[0] → ... → nodes[n-1] → depot`. Zero for an empty route.
///
/// # Examples
///
/// ```
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::evaluation::route_cost;
/// use commute_routing::models::Instance;
///
/// let m = CostMatrix::from_data(3, vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1, 1], &[2]).unwrap();
/// assert_eq!(route_cost(&inst, &[1, 2]), 4.0);
/// assert_eq!(route_cost(&inst, &[]), 0.0);
/// ```
pub fn route_cost<P: RoutingProblem>(problem: &P, nodes: &[usize]) -> f64 {
    let (first, last) = match (nodes.first(), nodes.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return 0.0,
    };
    let depot = problem.depot();
    let inner: f64 = nodes.windows(2).map(|w| problem.cost(w[0], w[1])).sum();
    problem.cost(depot, first) + inner + problem.cost(last, depot)
}

/// Sum of demands along a route, widened so large demands cannot overflow.
pub fn route_load<P: RoutingProblem>(problem: &P, nodes: &[usize]) -> i64 {
    nodes.iter().map(|&n| i64::from(problem.demand(n))).sum()
}

/// Cost change of inserting `node` between `prev` and `next`.
#[inline]
pub fn insertion_delta<P: RoutingProblem>(problem: &P, prev: usize, node: usize, next: usize) -> f64 {
    problem.cost(prev, node) + problem.cost(node, next) - problem.cost(prev, next)
}

/// Cost change of removing `node` from between `prev` and `next`.
#[inline]
pub fn removal_delta<P: RoutingProblem>(problem: &P, prev: usize, node: usize, next: usize) -> f64 {
    -insertion_delta(problem, prev, node, next)
}

/// Evaluates a solution, returning `(total cost, violations)`.
///
/// Checks every invariant a returned solution must hold: each non-depot
/// node routed exactly once, no depot inside a route, every load within
/// its vehicle's capacity, and stored route costs matching their arcs.
/// A feasible solution has an empty violations list.
pub fn evaluate_solution<P: RoutingProblem>(
    problem: &P,
    solution: &Solution,
) -> (f64, Vec<Violation>) {
    let n = problem.num_nodes();
    let depot = problem.depot();
    let mut visits = vec![0usize; n];
    let mut violations = Vec::new();
    let mut total_cost = 0.0;

    for (idx, route) in solution.routes().iter().enumerate() {
        for &node in route.nodes() {
            if node >= n {
                violations.push(Violation::new(ViolationType::UnknownNode {
                    route_index: idx,
                    node,
                }));
                continue;
            }
            if node == depot {
                violations.push(Violation::new(ViolationType::DepotInRoute { route_index: idx }));
                continue;
            }
            visits[node] += 1;
        }

        let capacity = problem.capacity(route.vehicle());
        let load = route.load();
        if load > i64::from(capacity) {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index: idx,
                load,
                capacity,
            }));
        }

        if route.nodes().iter().all(|&node| node < n) {
            let actual = route_cost(problem, route.nodes());
            if (actual - route.cost()).abs() > COST_TOLERANCE {
                violations.push(Violation::new(ViolationType::StaleCost {
                    route_index: idx,
                    stored: route.cost(),
                    actual,
                }));
            }
            total_cost += actual;
        }
    }

    for (node, &count) in visits.iter().enumerate() {
        if node == depot {
            continue;
        }
        match count {
            0 => violations.push(Violation::new(ViolationType::MissingNode { node })),
            1 => {}
            _ => violations.push(Violation::new(ViolationType::DuplicateNode { node })),
        }
    }

    (total_cost, violations)
}

/// Returns `true` if `solution` holds every invariant.
pub fn is_feasible<P: RoutingProblem>(problem: &P, solution: &Solution) -> bool {
    evaluate_solution(problem, solution).1.is_empty()
}
