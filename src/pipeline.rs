//! Request to response: matrix, instance, construction, improvement, extraction.
//!
//! Every call builds its own [`Instance`] and [`Solution`](crate::models::Solution);
//! nothing is shared between requests, so callers may run them concurrently.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::config::{BudgetPolicy, SolverConfig};
use crate::constructive::cheapest_insertion;
use crate::distance::{
    check_nodes, validate_projection, CongestionModel, CostMatrix, CostProjector, EstimatorProjector,
    MatrixCache,
};
use crate::error::RoutingError;
use crate::extract::{extract, Plan};
use crate::local_search::LocalSearch;
use crate::models::Instance;
use crate::request::{CostMode, Request, Response};

/// Builds the validated instance a request describes.
///
/// Distances come from `cache` when given. In time mode they are then run
/// through `projector` and the result is validated; a rejected projection
/// fails the request rather than falling back to distances.
pub fn build_instance(
    request: &Request,
    cache: Option<&MatrixCache>,
    projector: &dyn CostProjector,
) -> Result<Instance, RoutingError> {
    let distances = match cache {
        Some(cache) => {
            check_nodes(&request.locations)?;
            cache.get_or_build(&request.points())?
        }
        None => CostMatrix::from_nodes(&request.locations)?,
    };

    let costs = match request.cost_mode {
        CostMode::Distance => {
            if request.time_context.is_some() {
                debug!("time_context ignored in distance mode");
            }
            distances
        }
        CostMode::Time => {
            let context = request.time_context.ok_or_else(|| {
                RoutingError::invalid("cost_mode \"time\" requires a time_context")
            })?;
            context.validate()?;
            let projected = projector.project(&distances, &context)?;
            validate_projection(&distances, &projected)?;
            projected
        }
    };

    Instance::new(request.locations.clone(), request.fleet.clone(), costs)
}

/// Solves a built instance and extracts the plan.
///
/// # Errors
///
/// - [`RoutingError::CapacityInfeasible`] when the fleet cannot carry the
///   demand, detected up front or during construction.
/// - [`RoutingError::BudgetExceeded`] when improvement ran out of budget and
///   `config.budget_policy` is [`BudgetPolicy::Flag`].
#[instrument(skip_all, fields(nodes = instance.nodes().len(), vehicles = instance.fleet().len()))]
pub fn solve(instance: &Instance, config: &SolverConfig) -> Result<Plan, RoutingError> {
    instance.check_capacity()?;

    let mut solution = cheapest_insertion(instance)?;
    debug!(cost = solution.total_cost(), "initial solution constructed");

    let report = LocalSearch::new(instance, config.budget)
        .with_diversification(config.diversification)
        .improve(&mut solution);
    debug_assert!(solution.violations(instance).is_empty());

    let plan = extract(instance, &solution, config.unused_vehicles);
    if report.budget_exhausted {
        warn!(moves = report.moves, "improvement stopped on its budget");
        if config.budget_policy == BudgetPolicy::Flag {
            return Err(RoutingError::BudgetExceeded {
                plan: Box::new(plan),
            });
        }
    }
    Ok(plan)
}

/// Runs optimization requests under one configuration.
///
/// # Examples
///
/// ```
/// use commute_routing::config::FleetSpec;
/// use commute_routing::models::Node;
/// use commute_routing::pipeline::Optimizer;
/// use commute_routing::request::{Request, Status};
///
/// let locations = vec![
///     Node::depot("OFFICE_DEPOT", 12.9716, 77.5946),
///     Node::new("EMP_1", 12.98, 77.60, 1),
///     Node::new("EMP_2", 12.96, 77.58, 1),
/// ];
/// let request = Request::new(locations, FleetSpec::uniform(2, 2).vehicles());
///
/// let response = Optimizer::default().optimize(&request);
/// assert_eq!(response.status, Status::Ok);
/// let served: usize = response.routes.iter().map(|r| r.sequence.len() - 2).sum();
/// assert_eq!(served, 2);
/// ```
pub struct Optimizer {
    config: SolverConfig,
    cache: Option<MatrixCache>,
    projector: Box<dyn CostProjector>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Optimizer {
    /// Uses [`CongestionModel`] for time mode and no matrix cache.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            cache: None,
            projector: Box::new(EstimatorProjector::new(CongestionModel)),
        }
    }

    pub fn with_cache(mut self, cache: MatrixCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the time-mode projector.
    pub fn with_projector(mut self, projector: impl CostProjector + 'static) -> Self {
        self.projector = Box::new(projector);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs one request end to end.
    pub fn run(&self, request: &Request) -> Result<Plan, RoutingError> {
        let instance = build_instance(request, self.cache.as_ref(), self.projector.as_ref())?;
        solve(&instance, &self.config)
    }

    /// Like [`Optimizer::run`], with every outcome folded into a [`Response`].
    #[instrument(skip_all, fields(locations = request.locations.len(), mode = ?request.cost_mode))]
    pub fn optimize(&self, request: &Request) -> Response {
        let started = Instant::now();
        let response = match self.run(request) {
            Ok(plan) => Response::ok(plan),
            Err(err) => {
                warn!(%err, "optimization did not produce a plan");
                Response::from_error(err)
            }
        };
        info!(
            status = ?response.status,
            total_cost = response.total_cost,
            routes = response.routes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        response
    }
}

/// One-off optimization with the default projector.
pub fn optimize(request: &Request, config: &SolverConfig, cache: Option<&MatrixCache>) -> Response {
    let mut optimizer = Optimizer::new(config.clone());
    if let Some(cache) = cache {
        optimizer = optimizer.with_cache(cache.clone());
    }
    optimizer.optimize(request)
}
