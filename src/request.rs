//! Optimization request and response wire types.

use serde::{Deserialize, Serialize};

use crate::config::FleetSpec;
use crate::distance::TimeContext;
use crate::error::RoutingError;
use crate::extract::{Plan, PlanRoute};
use crate::models::{Node, Vehicle};

/// Which matrix the solver minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Great-circle kilometres.
    #[default]
    Distance,
    /// Projected minutes; needs a [`TimeContext`].
    Time,
}

/// One optimization request. `locations[0]` is the depot.
///
/// A missing `fleet` means the default 4 shuttles of 15 seats.
///
/// # Examples
///
/// ```
/// use commute_routing::request::{CostMode, Request};
///
/// let req: Request = serde_json::from_str(
///     r#"{
///         "locations": [
///             {"id": "OFFICE_DEPOT", "latitude": 12.97, "longitude": 77.59, "demand": 0},
///             {"id": "EMP_1", "latitude": 12.98, "longitude": 77.60}
///         ],
///         "cost_mode": "time",
///         "time_context": {"hour": 9, "weather_rain": 1}
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(req.cost_mode, CostMode::Time);
/// assert_eq!(req.fleet.len(), 4);
/// assert_eq!(req.locations[1].demand(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub locations: Vec<Node>,
    #[serde(default = "default_fleet")]
    pub fleet: Vec<Vehicle>,
    #[serde(default)]
    pub cost_mode: CostMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_context: Option<TimeContext>,
}

fn default_fleet() -> Vec<Vehicle> {
    FleetSpec::default().vehicles()
}

impl Request {
    /// Distance-mode request.
    pub fn new(locations: Vec<Node>, fleet: Vec<Vehicle>) -> Self {
        Self {
            locations,
            fleet,
            cost_mode: CostMode::Distance,
            time_context: None,
        }
    }

    /// Switches the request to time mode under `context`.
    pub fn with_time(mut self, context: TimeContext) -> Self {
        self.cost_mode = CostMode::Time;
        self.time_context = Some(context);
        self
    }

    /// Coordinates in location order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.locations.iter().map(Node::coordinates).collect()
    }
}

/// Outcome class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Infeasible,
    BudgetExceeded,
    Invalid,
}

/// Result of one optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub total_cost: f64,
    pub routes: Vec<PlanRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrouted: Vec<String>,
}

impl Response {
    pub fn ok(plan: Plan) -> Self {
        Self {
            status: Status::Ok,
            total_cost: plan.total_cost,
            routes: plan.routes,
            error: None,
            unrouted: Vec::new(),
        }
    }

    /// Best plan found before the improvement budget ran out.
    pub fn budget_exceeded(plan: Plan) -> Self {
        Self {
            status: Status::BudgetExceeded,
            ..Self::ok(plan)
        }
    }

    /// Maps a failed request onto a routeless response.
    pub fn from_error(err: RoutingError) -> Self {
        let message = err.to_string();
        match err {
            RoutingError::BudgetExceeded { plan } => Self {
                error: Some(message),
                ..Self::budget_exceeded(*plan)
            },
            RoutingError::CapacityInfeasible { unrouted, .. } => Self {
                status: Status::Infeasible,
                total_cost: 0.0,
                routes: Vec::new(),
                error: Some(message),
                unrouted,
            },
            RoutingError::InvalidInput { .. } | RoutingError::Projection { .. } => Self {
                status: Status::Invalid,
                total_cost: 0.0,
                routes: Vec::new(),
                error: Some(message),
                unrouted: Vec::new(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Plan {
        Plan {
            total_cost: 12.5,
            total_load: 3,
            vehicles_used: 1,
            routes: vec![PlanRoute {
                vehicle_id: "0".into(),
                sequence: vec![0, 1, 2, 0],
                cost: 12.5,
                load: 3,
                used: true,
            }],
        }
    }

    #[test]
    fn test_request_defaults() {
        let req: Request = serde_json::from_str(
            r#"{"locations": [{"id": "D", "latitude": 0.0, "longitude": 0.0, "demand": 0}]}"#,
        )
        .expect("valid json");
        assert_eq!(req.cost_mode, CostMode::Distance);
        assert!(req.time_context.is_none());
        assert_eq!(req.fleet.len(), 4);
        assert!(req.fleet.iter().all(|v| v.capacity() == 15));
    }

    #[test]
    fn test_request_rejects_unknown_mode() {
        let res: Result<Request, _> =
            serde_json::from_str(r#"{"locations": [], "cost_mode": "fuel"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_with_time_switches_mode() {
        let ctx = TimeContext::new(18, 0).expect("valid");
        let req = Request::new(Vec::new(), Vec::new()).with_time(ctx);
        assert_eq!(req.cost_mode, CostMode::Time);
        assert_eq!(req.time_context, Some(ctx));
    }

    #[test]
    fn test_ok_response_json_shape() {
        let json = serde_json::to_value(Response::ok(plan())).expect("serializable");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["total_cost"], 12.5);
        assert!(json.get("error").is_none());
        assert!(json.get("unrouted").is_none());
    }

    #[test]
    fn test_infeasible_response_has_no_routes() {
        let resp = Response::from_error(RoutingError::CapacityInfeasible {
            unrouted: vec!["E4".into(), "E5".into()],
            demand_deficit: 2,
        });
        assert_eq!(resp.status, Status::Infeasible);
        assert!(resp.routes.is_empty());
        assert_eq!(resp.unrouted, ["E4", "E5"]);
        let json = serde_json::to_value(&resp).expect("serializable");
        assert_eq!(json["status"], "infeasible");
    }

    #[test]
    fn test_budget_exceeded_keeps_plan() {
        let resp = Response::from_error(RoutingError::BudgetExceeded {
            plan: Box::new(plan()),
        });
        assert_eq!(resp.status, Status::BudgetExceeded);
        assert_eq!(resp.routes.len(), 1);
        assert_eq!(resp.total_cost, 12.5);
        assert!(resp.error.is_some());
    }

    #[test]
    fn test_invalid_input_response() {
        let resp = Response::from_error(RoutingError::invalid("empty location list"));
        assert_eq!(resp.status, Status::Invalid);
        assert!(!resp.is_ok());
        assert!(resp.error.as_deref().is_some_and(|e| e.contains("empty location list")));
    }
}
