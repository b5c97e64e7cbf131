//! Caller-facing view of a finished [`Solution`].

use serde::{Deserialize, Serialize};

use crate::config::UnusedVehicles;
use crate::models::{RoutingProblem, Solution};

/// One vehicle's tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRoute {
    pub vehicle_id: String,
    /// Node indices, starting and ending at the depot.
    pub sequence: Vec<usize>,
    pub cost: f64,
    pub load: i64,
    pub used: bool,
}

/// Extracted plan for every (or every used) vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub total_cost: f64,
    pub total_load: i64,
    pub vehicles_used: usize,
    pub routes: Vec<PlanRoute>,
}

/// Converts `solution` into a [`Plan`].
///
/// Cost and load come from each route's tracked values; nothing is
/// recomputed. Depot-only routes are dropped or kept with `used: false`
/// according to `unused`.
///
/// # Examples
///
/// ```
/// use commute_routing::config::UnusedVehicles;
/// use commute_routing::distance::CostMatrix;
/// use commute_routing::extract::extract;
/// use commute_routing::models::{Instance, Route, Solution};
///
/// let m = CostMatrix::from_data(2, vec![0.0, 3.0, 3.0, 0.0]).unwrap();
/// let inst = Instance::with_matrix(m, &[0, 1], &[1, 1]).unwrap();
/// let sol = Solution::from_routes(vec![Route::new(0), Route::with_nodes(1, vec![1], &inst)]);
///
/// let plan = extract(&inst, &sol, UnusedVehicles::Omit);
/// assert_eq!(plan.routes.len(), 1);
/// assert_eq!(plan.routes[0].vehicle_id, "1");
/// assert_eq!(plan.routes[0].sequence, vec![0, 1, 0]);
///
/// let plan = extract(&inst, &sol, UnusedVehicles::Flag);
/// assert_eq!(plan.routes.len(), 2);
/// assert!(!plan.routes[0].used);
/// ```
pub fn extract<P: RoutingProblem>(problem: &P, solution: &Solution, unused: UnusedVehicles) -> Plan {
    let depot = problem.depot();
    let routes: Vec<PlanRoute> = solution
        .routes()
        .iter()
        .filter(|r| !r.is_empty() || unused == UnusedVehicles::Flag)
        .map(|r| PlanRoute {
            vehicle_id: problem.vehicle_label(r.vehicle()),
            sequence: r.sequence(depot),
            cost: r.cost(),
            load: r.load(),
            used: !r.is_empty(),
        })
        .collect();

    Plan {
        total_cost: routes.iter().map(|r| r.cost).sum(),
        total_load: routes.iter().map(|r| r.load).sum(),
        vehicles_used: routes.iter().filter(|r| r.used).count(),
        routes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::CostMatrix;
    use crate::models::{Instance, Node, Route, Vehicle};

    fn instance() -> Instance {
        let nodes = vec![
            Node::depot("OFFICE_DEPOT", 0.0, 0.0),
            Node::new("E1", 0.0, 0.01, 2),
            Node::new("E2", 0.0, 0.02, 1),
        ];
        let costs = CostMatrix::from_nodes(&nodes).expect("valid");
        let fleet = vec![
            Vehicle::new("bus-a", 3),
            Vehicle::new("bus-b", 3),
            Vehicle::new("bus-c", 3),
        ];
        Instance::new(nodes, fleet, costs).expect("valid")
    }

    fn solution(inst: &Instance) -> Solution {
        Solution::from_routes(vec![
            Route::new(0),
            Route::with_nodes(1, vec![1, 2], inst),
            Route::new(2),
        ])
    }

    #[test]
    fn test_omit_drops_empty_routes() {
        let inst = instance();
        let sol = solution(&inst);
        let plan = extract(&inst, &sol, UnusedVehicles::Omit);

        assert_eq!(plan.routes.len(), 1);
        assert_eq!(plan.vehicles_used, 1);
        let r = &plan.routes[0];
        assert_eq!(r.vehicle_id, "bus-b");
        assert_eq!(r.sequence, vec![0, 1, 2, 0]);
        assert_eq!(r.load, 3);
        assert!(r.used);
        assert_eq!(r.cost, sol.route(1).cost());
        assert_eq!(plan.total_load, 3);
        assert!((plan.total_cost - sol.total_cost()).abs() < 1e-12);
    }

    #[test]
    fn test_flag_keeps_empty_routes() {
        let inst = instance();
        let sol = solution(&inst);
        let plan = extract(&inst, &sol, UnusedVehicles::Flag);

        let ids: Vec<&str> = plan.routes.iter().map(|r| r.vehicle_id.as_str()).collect();
        assert_eq!(ids, ["bus-a", "bus-b", "bus-c"]);
        assert_eq!(plan.vehicles_used, 1);
        for idle in [&plan.routes[0], &plan.routes[2]] {
            assert!(!idle.used);
            assert_eq!(idle.sequence, vec![0, 0]);
            assert_eq!(idle.cost, 0.0);
            assert_eq!(idle.load, 0);
        }
        assert!((plan.total_cost - sol.total_cost()).abs() < 1e-12);
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let inst = instance();
        let plan = extract(&inst, &solution(&inst), UnusedVehicles::Omit);
        let json = serde_json::to_value(&plan).expect("serializable");
        assert_eq!(json["routes"][0]["vehicle_id"], "bus-b");
        assert_eq!(json["routes"][0]["sequence"], serde_json::json!([0, 1, 2, 0]));
        assert_eq!(json["vehicles_used"], 1);
    }
}
