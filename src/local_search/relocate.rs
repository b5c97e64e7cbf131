//! Relocate: move one node to another position, in its own route or another.
//!
//! # Algorithm
//!
//! For node `k` between `p` and `q`, and a target gap `a → b`:
//!
//! ```text
//! delta = [c(a, k) + c(k, b) - c(a, b)] - [c(p, k) + c(k, q) - c(p, q)]
//! ```
//!
//! Within one route the target gap is taken on the route with `k` already
//! removed, so the formula stays exact. Moves to another route must fit its
//! remaining capacity.
//!
//! # Complexity
//!
//! O(n²) per scan.

use super::improver::BudgetTracker;
use super::moves::{Move, IMPROVEMENT_EPS};
use crate::evaluation::{insertion_delta, removal_delta};
use crate::models::{Route, RoutingProblem, Solution};

/// First improving relocation, scanning source nodes in route order.
pub(crate) fn find_relocate<P: RoutingProblem>(
    problem: &P,
    solution: &Solution,
    tracker: &mut BudgetTracker,
) -> Option<(Move, f64)> {
    let depot = problem.depot();

    for (from_route, route) in solution.routes().iter().enumerate() {
        if tracker.exhausted() {
            return None;
        }
        for (from_pos, &node) in route.nodes().iter().enumerate() {
            let removal = removal_delta(
                problem,
                route.prev(from_pos, depot),
                node,
                route.next(from_pos, depot),
            );
            let demand = i64::from(problem.demand(node));

            for (to_route, target) in solution.routes().iter().enumerate() {
                if to_route == from_route {
                    if let Some((to_pos, delta)) = best_within(problem, route, from_pos, removal) {
                        return Some((
                            Move::Relocate {
                                from_route,
                                from_pos,
                                to_route,
                                to_pos,
                            },
                            delta,
                        ));
                    }
                    continue;
                }
                if target.load() + demand > i64::from(problem.capacity(to_route)) {
                    continue;
                }
                for to_pos in 0..=target.len() {
                    let delta = insertion_delta(
                        problem,
                        target.prev(to_pos, depot),
                        node,
                        gap_end(target.nodes(), to_pos, depot),
                    ) + removal;
                    if delta < -IMPROVEMENT_EPS {
                        return Some((
                            Move::Relocate {
                                from_route,
                                from_pos,
                                to_route,
                                to_pos,
                            },
                            delta,
                        ));
                    }
                }
            }
        }
    }
    None
}

/// First improving reinsertion of `route[from_pos]` into its own route.
fn best_within<P: RoutingProblem>(
    problem: &P,
    route: &Route,
    from_pos: usize,
    removal: f64,
) -> Option<(usize, f64)> {
    let depot = problem.depot();
    let node = route.nodes()[from_pos];
    let reduced: Vec<usize> = route
        .nodes()
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != from_pos)
        .map(|(_, &n)| n)
        .collect();

    for to_pos in 0..=reduced.len() {
        if to_pos == from_pos {
            continue;
        }
        let prev = if to_pos == 0 { depot } else { reduced[to_pos - 1] };
        let delta = insertion_delta(problem, prev, node, gap_end(&reduced, to_pos, depot)) + removal;
        if delta < -IMPROVEMENT_EPS {
            return Some((to_pos, delta));
        }
    }
    None
}

fn gap_end(nodes: &[usize], pos: usize, depot: usize) -> usize {
    nodes.get(pos).copied().unwrap_or(depot)
}
