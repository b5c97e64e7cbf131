//! Per-request solver configuration.
//!
//! Fleet size, vehicle capacity and search limits travel with each
//! optimization call instead of living in globals, so concurrent requests
//! never share state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::models::Vehicle;

/// Index of the depot in every location list.
pub const DEPOT_INDEX: usize = 0;

/// Default number of shuttles.
pub const DEFAULT_VEHICLES: usize = 4;

/// Default seats per shuttle.
pub const DEFAULT_CAPACITY: i32 = 15;

/// Stop condition for the local search.
///
/// An iteration is one committed improving move. `None` disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_iterations: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Budget {
    /// No limits: search runs to a local optimum.
    pub const UNLIMITED: Budget = Budget {
        max_iterations: None,
        time_limit: None,
    };

    pub fn iterations(max: u64) -> Self {
        Self {
            max_iterations: Some(max),
            time_limit: None,
        }
    }

    pub fn time(limit: Duration) -> Self {
        Self {
            max_iterations: None,
            time_limit: Some(limit),
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_iterations: Some(10_000),
            time_limit: Some(Duration::from_secs(30)),
        }
    }
}

/// What the extractor does with vehicles whose route is depot-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusedVehicles {
    /// Leave them out of the plan.
    #[default]
    Omit,
    /// Keep them with `used: false`.
    Flag,
}

/// What happens when improvement stops on its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPolicy {
    /// Return the best feasible plan found as a normal result.
    #[default]
    ReturnBest,
    /// Return the best plan inside [`RoutingError::BudgetExceeded`].
    Flag,
}

/// Seeded perturb-and-climb restarts after the first local optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diversification {
    pub seed: u64,
    /// Number of perturbation rounds.
    pub restarts: u32,
    /// Random relocations applied per round.
    pub strength: u32,
}

impl Diversification {
    pub fn new(seed: u64, restarts: u32) -> Self {
        Self {
            seed,
            restarts,
            strength: 3,
        }
    }
}

/// Solver settings for one optimization request.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub budget: Budget,
    pub unused_vehicles: UnusedVehicles,
    pub budget_policy: BudgetPolicy,
    pub diversification: Option<Diversification>,
}

/// A homogeneous fleet written as `<count>x<capacity>`, e.g. `4x15`.
///
/// # Examples
///
/// ```
/// use commute_routing::config::FleetSpec;
///
/// let spec: FleetSpec = "4x15".parse().unwrap();
/// let fleet = spec.vehicles();
/// assert_eq!(fleet.len(), 4);
/// assert_eq!(fleet[3].id(), "3");
/// assert!(fleet.iter().all(|v| v.capacity() == 15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetSpec {
    pub count: usize,
    pub capacity: i32,
}

impl FleetSpec {
    pub fn uniform(count: usize, capacity: i32) -> Self {
        Self { count, capacity }
    }

    /// Vehicles named `0..count`.
    pub fn vehicles(&self) -> Vec<Vehicle> {
        (0..self.count)
            .map(|i| Vehicle::new(i.to_string(), self.capacity))
            .collect()
    }
}

impl Default for FleetSpec {
    fn default() -> Self {
        Self::uniform(DEFAULT_VEHICLES, DEFAULT_CAPACITY)
    }
}

impl FromStr for FleetSpec {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RoutingError::invalid(format!("fleet spec {s:?} is not <count>x<capacity>"));
        let (count, capacity) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let count: usize = count.trim().parse().map_err(|_| bad())?;
        let capacity: i32 = capacity.trim().parse().map_err(|_| bad())?;
        if count == 0 || capacity <= 0 {
            return Err(RoutingError::invalid(format!(
                "fleet spec {s:?} needs at least one vehicle with positive capacity"
            )));
        }
        Ok(Self { count, capacity })
    }
}

impl fmt::Display for FleetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.count, self.capacity)
    }
}
