//! Exchange: swap two nodes that sit on different routes.
//!
//! ```text
//! delta = c(pa, b) + c(b, na) - c(pa, a) - c(a, na)
//!       + c(pb, a) + c(a, nb) - c(pb, b) - c(b, nb)
//! ```
//!
//! where `pa`/`na` are the neighbours of `a` and `pb`/`nb` those of `b`.
//! Both routes must stay within capacity after the swap.

use super::improver::BudgetTracker;
use super::moves::{Move, IMPROVEMENT_EPS};
use crate::models::{RoutingProblem, Solution};

/// First improving swap over route pairs `route_a < route_b`.
pub(crate) fn find_exchange<P: RoutingProblem>(
    problem: &P,
    solution: &Solution,
    tracker: &mut BudgetTracker,
) -> Option<(Move, f64)> {
    let depot = problem.depot();
    let routes = solution.routes();

    for route_a in 0..routes.len() {
        if tracker.exhausted() {
            return None;
        }
        let ra = &routes[route_a];
        let cap_a = i64::from(problem.capacity(route_a));

        for route_b in route_a + 1..routes.len() {
            let rb = &routes[route_b];
            let cap_b = i64::from(problem.capacity(route_b));

            for (pos_a, &a) in ra.nodes().iter().enumerate() {
                let (pa, na) = (ra.prev(pos_a, depot), ra.next(pos_a, depot));
                let da = i64::from(problem.demand(a));
                let out_a = problem.cost(pa, a) + problem.cost(a, na);

                for (pos_b, &b) in rb.nodes().iter().enumerate() {
                    let db = i64::from(problem.demand(b));
                    if ra.load() - da + db > cap_a || rb.load() - db + da > cap_b {
                        continue;
                    }
                    let (pb, nb) = (rb.prev(pos_b, depot), rb.next(pos_b, depot));
                    let delta = problem.cost(pa, b) + problem.cost(b, na) - out_a
                        + problem.cost(pb, a)
                        + problem.cost(a, nb)
                        - problem.cost(pb, b)
                        - problem.cost(b, nb);

                    if delta < -IMPROVEMENT_EPS {
                        return Some((
                            Move::Exchange {
                                route_a,
                                pos_a,
                                route_b,
                                pos_b,
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
