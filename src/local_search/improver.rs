//! Budgeted hill-climbing driver.
//!
//! # Algorithm
//!
//! Each pass scans the neighbourhoods in a fixed order (2-opt, relocate,
//! exchange). A neighbourhood is rescanned after every committed move until
//! it has no improving move left, then the next one takes over. The search
//! ends when a whole pass commits nothing (a local optimum) or the budget
//! runs out.
//!
//! Acceptance is strict first improvement, so total cost never increases
//! and the result is fully determined by the input. The climb can stall in
//! poor local optima; seeded [`Diversification`] rounds (perturb a copy of
//! the best solution, climb again, keep it only if strictly better) are the
//! optional way out.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use super::moves::{Move, MoveKind, IMPROVEMENT_EPS};
use super::{exchange, relocate, two_opt};
use crate::config::{Budget, Diversification};
use crate::models::{RoutingProblem, Solution};

/// Tracks consumption of a [`Budget`] and latches once it runs out.
#[derive(Debug)]
pub(crate) struct BudgetTracker {
    budget: Budget,
    started: Instant,
    moves: u64,
    hit: bool,
}

impl BudgetTracker {
    pub(crate) fn start(budget: Budget) -> Self {
        Self {
            budget,
            started: Instant::now(),
            moves: 0,
            hit: false,
        }
    }

    pub(crate) fn record_move(&mut self) {
        self.moves += 1;
    }

    /// `true` once the move limit or the time limit has been reached.
    pub(crate) fn exhausted(&mut self) -> bool {
        if self.hit {
            return true;
        }
        let out_of_moves = self.budget.max_iterations.is_some_and(|m| self.moves >= m);
        let out_of_time = self
            .budget
            .time_limit
            .is_some_and(|t| self.started.elapsed() >= t);
        self.hit = out_of_moves || out_of_time;
        self.hit
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Outcome of one improvement run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImproveReport {
    pub initial_cost: f64,
    pub final_cost: f64,
    /// Improving moves committed, over every neighbourhood and round.
    pub moves: u64,
    pub two_opt_moves: u64,
    pub relocate_moves: u64,
    pub exchange_moves: u64,
    pub passes: u64,
    /// Diversification rounds completed.
    pub restarts: u32,
    /// The budget stopped the search while an improving move or a
    /// diversification round was still pending.
    pub budget_exhausted: bool,
    pub elapsed: Duration,
}

impl ImproveReport {
    fn new(initial_cost: f64) -> Self {
        Self {
            initial_cost,
            final_cost: initial_cost,
            moves: 0,
            two_opt_moves: 0,
            relocate_moves: 0,
            exchange_moves: 0,
            passes: 0,
            restarts: 0,
            budget_exhausted: false,
            elapsed: Duration::ZERO,
        }
    }

    fn count(&mut self, kind: MoveKind) {
        self.moves += 1;
        match kind {
            MoveKind::TwoOpt => self.two_opt_moves += 1,
            MoveKind::Relocate => self.relocate_moves += 1,
            MoveKind::Exchange => self.exchange_moves += 1,
        }
    }
}

/// Local search over a single [`Solution`], mutated in place.
///
/// Runs on the calling thread; the solution has a single writer.
///
/// # Examples
///
/// ```
/// use commute_routing::config::Budget;
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::local_search::LocalSearch;
/// use commute_routing::models::{Instance, Route, Solution};
///
/// let m = CostMatrix::from_data(
///     4,
///     vec![0.0, 1.0, 2.0, 3.0, 1.0, 0.0, 1.0, 2.0, 2.0, 1.0, 0.0, 1.0, 3.0, 2.0, 1.0, 0.0],
/// )
/// .unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1, 1, 1], &[3]).unwrap();
/// let mut sol = Solution::from_routes(vec![Route::with_nodes(0, vec![2, 1, 3], &inst)]);
///
/// let report = LocalSearch::new(&inst, Budget::UNLIMITED).improve(&mut sol);
/// assert_eq!(report.final_cost, 6.0);
/// assert!(report.final_cost < report.initial_cost);
/// ```
pub struct LocalSearch<'a, P> {
    problem: &'a P,
    budget: Budget,
    diversification: Option<Diversification>,
}

impl<'a, P: RoutingProblem> LocalSearch<'a, P> {
    pub fn new(problem: &'a P, budget: Budget) -> Self {
        Self {
            problem,
            budget,
            diversification: None,
        }
    }

    pub fn with_diversification(mut self, diversification: Option<Diversification>) -> Self {
        self.diversification = diversification;
        self
    }

    /// Improves `solution` in place and reports what happened.
    ///
    /// `solution` must be feasible on entry; it is feasible on exit and its
    /// cost is no higher than on entry.
    #[instrument(skip_all, fields(stops = solution.num_served()))]
    pub fn improve(&self, solution: &mut Solution) -> ImproveReport {
        let mut tracker = BudgetTracker::start(self.budget);
        let mut report = ImproveReport::new(solution.total_cost());

        report.budget_exhausted = self.climb(solution, &mut tracker, &mut report);
        if let Some(div) = self.diversification {
            self.diversify(solution, div, &mut tracker, &mut report);
        }

        report.final_cost = solution.total_cost();
        report.elapsed = tracker.elapsed();
        info!(
            initial = report.initial_cost,
            best = report.final_cost,
            moves = report.moves,
            passes = report.passes,
            budget_exhausted = report.budget_exhausted,
            "local search finished"
        );
        report
    }

    /// Climbs until a local optimum or the budget. Returns `true` only when
    /// the budget stopped it with an improving move still available.
    fn climb(
        &self,
        solution: &mut Solution,
        tracker: &mut BudgetTracker,
        report: &mut ImproveReport,
    ) -> bool {
        loop {
            if tracker.exhausted() {
                return self.can_improve(solution);
            }
            report.passes += 1;
            let mut improved = false;

            for kind in MoveKind::ORDER {
                while let Some((mv, delta)) = self.find(kind, solution, tracker) {
                    if !mv.is_valid(self.problem, solution) {
                        warn!(?mv, "rejected invalid {} move", kind.name());
                        break;
                    }
                    let before = solution.total_cost();
                    mv.apply(self.problem, solution);
                    debug_assert!(solution.total_cost() < before + IMPROVEMENT_EPS);
                    debug!(?mv, delta, cost = solution.total_cost(), "applied {}", kind.name());

                    report.count(kind);
                    tracker.record_move();
                    improved = true;
                    if tracker.exhausted() {
                        return self.can_improve(solution);
                    }
                }
            }

            if !improved {
                // A scan the budget interrupted proves nothing about optimality.
                return tracker.hit && self.can_improve(solution);
            }
        }
    }

    /// Full scan of every neighbourhood, outside the budget.
    fn can_improve(&self, solution: &Solution) -> bool {
        let mut unlimited = BudgetTracker::start(Budget::UNLIMITED);
        MoveKind::ORDER
            .into_iter()
            .any(|kind| self.find(kind, solution, &mut unlimited).is_some())
    }

    fn find(
        &self,
        kind: MoveKind,
        solution: &Solution,
        tracker: &mut BudgetTracker,
    ) -> Option<(Move, f64)> {
        match kind {
            MoveKind::TwoOpt => two_opt::find_two_opt(self.problem, solution, tracker),
            MoveKind::Relocate => relocate::find_relocate(self.problem, solution, tracker),
            MoveKind::Exchange => exchange::find_exchange(self.problem, solution, tracker),
        }
    }

    fn diversify(
        &self,
        best: &mut Solution,
        div: Diversification,
        tracker: &mut BudgetTracker,
        report: &mut ImproveReport,
    ) {
        let mut rng = StdRng::seed_from_u64(div.seed);
        for round in 0..div.restarts {
            if tracker.exhausted() {
                report.budget_exhausted = true;
                return;
            }
            let mut candidate = best.clone();
            perturb(self.problem, &mut candidate, &mut rng, div.strength);
            let cut_short = self.climb(&mut candidate, tracker, report);
            report.budget_exhausted |= cut_short;
            report.restarts += 1;

            if candidate.total_cost() < best.total_cost() - IMPROVEMENT_EPS {
                debug!(round, cost = candidate.total_cost(), "diversification found a better optimum");
                *best = candidate;
            }
        }
    }
}

/// Applies up to `strength` random capacity-feasible relocations.
fn perturb<P: RoutingProblem>(problem: &P, solution: &mut Solution, rng: &mut StdRng, strength: u32) {
    let routes = solution.num_routes();
    let mut applied = 0;
    let mut attempts = 0;

    while applied < strength && attempts < strength.saturating_mul(20) {
        attempts += 1;
        let from_route = rng.random_range(0..routes);
        let from_len = solution.route(from_route).len();
        if from_len == 0 {
            continue;
        }
        let from_pos = rng.random_range(0..from_len);
        let to_route = rng.random_range(0..routes);
        let to_len = if to_route == from_route {
            from_len - 1
        } else {
            solution.route(to_route).len()
        };
        let mv = Move::Relocate {
            from_route,
            from_pos,
            to_route,
            to_pos: rng.random_range(0..=to_len),
        };
        if mv.is_valid(problem, solution) {
            mv.apply(problem, solution);
            applied += 1;
        }
    }
}

/// Runs [`LocalSearch`] without diversification.
pub fn improve<P: RoutingProblem>(
    problem: &P,
    solution: &mut Solution,
    budget: Budget,
) -> ImproveReport {
    LocalSearch::new(problem, budget).improve(solution)
}
