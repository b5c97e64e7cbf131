//! Intra-route 2-opt.
//!
//! # Algorithm
//!
//! Reversing `r[i..=j]` replaces the edges `prev_i → r[i]` and
//! `r[j] → next_j` with `prev_i → r[j]` and `r[i] → next_j`, and flips the
//! direction of every edge inside the segment:
//!
//! ```text
//! delta = c(prev_i, r[j]) + c(r[i], next_j) - c(prev_i, r[i]) - c(r[j], next_j)
//!       + Σ c(r[k+1], r[k]) - Σ c(r[k], r[k+1])      for i ≤ k < j
//! ```
//!
//! The inner sums vanish on symmetric matrices. On projected (asymmetric)
//! matrices they are kept exact by accumulating both directions as `j`
//! grows, so each candidate costs O(1).
//!
//! # Complexity
//!
//! O(n²) per scan of a route.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::improver::BudgetTracker;
use super::moves::{Move, IMPROVEMENT_EPS};
use crate::models::{RoutingProblem, Solution};

/// First improving segment reversal, scanning routes in vehicle order.
pub(crate) fn find_two_opt<P: RoutingProblem>(
    problem: &P,
    solution: &Solution,
    tracker: &mut BudgetTracker,
) -> Option<(Move, f64)> {
    let depot = problem.depot();

    for (v, route) in solution.routes().iter().enumerate() {
        if tracker.exhausted() {
            return None;
        }
        let r = route.nodes();
        let n = r.len();
        if n < 2 {
            continue;
        }

        for i in 0..n - 1 {
            let prev_i = route.prev(i, depot);
            let mut forward = 0.0;
            let mut backward = 0.0;

            for j in i + 1..n {
                forward += problem.cost(r[j - 1], r[j]);
                backward += problem.cost(r[j], r[j - 1]);
                let next_j = route.next(j, depot);

                let delta = problem.cost(prev_i, r[j]) + problem.cost(r[i], next_j)
                    - problem.cost(prev_i, r[i])
                    - problem.cost(r[j], next_j)
                    + backward
                    - forward;

                if delta < -IMPROVEMENT_EPS {
                    return Some((
                        Move::TwoOpt {
                            route: v,
                            from: i,
                            to: j,
                        },
                        delta,
                    ));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::distance::CostMatrix;
    use crate::models::{Instance, Route};

    fn line(n: usize) -> CostMatrix {
        let data = (0..n * n)
            .map(|k| ((k / n) as f64 - (k % n) as f64).abs())
            .collect();
        CostMatrix::from_data(n, data).expect("valid")
    }

    fn tracker() -> BudgetTracker {
        BudgetTracker::start(Budget::UNLIMITED)
    }

    #[test]
    fn test_finds_reversal_on_line() {
        let inst = Instance::with_matrix(line(4), &[0, 1, 1, 1], &[3]).expect("valid");
        let mut sol = Solution::from_routes(vec![Route::with_nodes(0, vec![2, 1, 3], &inst)]);
        assert!((sol.total_cost() - 8.0).abs() < 1e-10);

        let (mv, delta) = find_two_opt(&inst, &sol, &mut tracker()).expect("improving");
        assert_eq!(mv, Move::TwoOpt { route: 0, from: 0, to: 1 });
        assert!((delta + 2.0).abs() < 1e-10);

        mv.apply(&inst, &mut sol);
        assert_eq!(sol.route(0).nodes(), &[1, 2, 3]);
        assert!((sol.total_cost() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_none_at_optimum() {
        let inst = Instance::with_matrix(line(4), &[0, 1, 1, 1], &[3]).expect("valid");
        let sol = Solution::from_routes(vec![Route::with_nodes(0, vec![1, 2, 3], &inst)]);
        assert!(find_two_opt(&inst, &sol, &mut tracker()).is_none());
    }

    #[test]
    fn test_delta_exact_on_asymmetric_matrix() {
        // 0→1→2→0 costs 3, the reverse direction costs 27.
        let m = CostMatrix::from_data(3, vec![0.0, 1.0, 9.0, 9.0, 0.0, 1.0, 1.0, 9.0, 0.0])
            .expect("valid");
        let inst = Instance::with_matrix(m, &[0, 1, 1], &[2]).expect("valid");
        let mut sol = Solution::from_routes(vec![Route::with_nodes(0, vec![2, 1], &inst)]);
        let before = sol.total_cost();

        let (mv, delta) = find_two_opt(&inst, &sol, &mut tracker()).expect("improving");
        mv.apply(&inst, &mut sol);
        assert!((before + delta - sol.total_cost()).abs() < 1e-10);
        assert!((sol.total_cost() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_short_routes_skipped() {
        let inst = Instance::with_matrix(line(3), &[0, 1, 1], &[1, 1]).expect("valid");
        let sol = Solution::from_routes(vec![
            Route::with_nodes(0, vec![2], &inst),
            Route::with_nodes(1, vec![1], &inst),
        ]);
        assert!(find_two_opt(&inst, &sol, &mut tracker()).is_none());
    }
}
