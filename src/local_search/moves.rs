//! Neighbourhood moves and their commit-time validation.

use crate::models::{RoutingProblem, Solution};

/// Minimum cost decrease for a move to count as an improvement.
pub(crate) const IMPROVEMENT_EPS: f64 = 1e-9;

/// Neighbourhoods, in the order the improver scans them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    TwoOpt,
    Relocate,
    Exchange,
}

impl MoveKind {
    pub const ORDER: [MoveKind; 3] = [MoveKind::TwoOpt, MoveKind::Relocate, MoveKind::Exchange];

    pub fn name(self) -> &'static str {
        match self {
            MoveKind::TwoOpt => "2-opt",
            MoveKind::Relocate => "relocate",
            MoveKind::Exchange => "exchange",
        }
    }
}

/// A single local-search move on a [`Solution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Reverse `nodes[from..=to]` of one route.
    TwoOpt { route: usize, from: usize, to: usize },
    /// Take the node at `from_pos` out of `from_route` and insert it at
    /// `to_pos`. When both routes are the same, `to_pos` indexes the route
    /// after removal.
    Relocate {
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
    },
    /// Swap the nodes at `pos_a` of `route_a` and `pos_b` of `route_b`.
    Exchange {
        route_a: usize,
        pos_a: usize,
        route_b: usize,
        pos_b: usize,
    },
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::TwoOpt { .. } => MoveKind::TwoOpt,
            Move::Relocate { .. } => MoveKind::Relocate,
            Move::Exchange { .. } => MoveKind::Exchange,
        }
    }

    /// Checks that the move addresses existing positions, moves no depot,
    /// and leaves every touched route within capacity.
    pub fn is_valid<P: RoutingProblem>(&self, problem: &P, solution: &Solution) -> bool {
        let routes = solution.num_routes();
        let depot = problem.depot();
        let movable = |r: usize, p: usize| {
            solution
                .route(r)
                .nodes()
                .get(p)
                .is_some_and(|&n| n != depot && n < problem.num_nodes())
        };

        match *self {
            Move::TwoOpt { route, from, to } => {
                route < routes && from < to && movable(route, from) && movable(route, to)
            }
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
            } => {
                if from_route >= routes || to_route >= routes || !movable(from_route, from_pos) {
                    return false;
                }
                let from = solution.route(from_route);
                if from_route == to_route {
                    return to_pos < from.len() && to_pos != from_pos;
                }
                let to = solution.route(to_route);
                let node = from.nodes()[from_pos];
                to_pos <= to.len()
                    && to.load() + i64::from(problem.demand(node))
                        <= i64::from(problem.capacity(to_route))
            }
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => {
                if route_a == route_b
                    || route_a >= routes
                    || route_b >= routes
                    || !movable(route_a, pos_a)
                    || !movable(route_b, pos_b)
                {
                    return false;
                }
                let (ra, rb) = (solution.route(route_a), solution.route(route_b));
                let da = i64::from(problem.demand(ra.nodes()[pos_a]));
                let db = i64::from(problem.demand(rb.nodes()[pos_b]));
                ra.load() - da + db <= i64::from(problem.capacity(route_a))
                    && rb.load() - db + da <= i64::from(problem.capacity(route_b))
            }
        }
    }

    /// Commits the move. Callers check [`Move::is_valid`] first.
    pub fn apply<P: RoutingProblem>(&self, problem: &P, solution: &mut Solution) {
        match *self {
            Move::TwoOpt { route, from, to } => {
                solution.route_mut(route).reverse(from, to, problem);
            }
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
            } => {
                if from_route == to_route {
                    let route = solution.route_mut(from_route);
                    let node = route.remove(from_pos, problem);
                    route.insert(to_pos, node, problem);
                } else {
                    let (from, to) = solution.route_pair_mut(from_route, to_route);
                    let node = from.remove(from_pos, problem);
                    to.insert(to_pos, node, problem);
                }
            }
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => {
                let (ra, rb) = solution.route_pair_mut(route_a, route_b);
                let a = ra.nodes()[pos_a];
                let b = rb.replace(pos_b, a, problem);
                ra.replace(pos_a, b, problem);
            }
        }
    }
}
