//! Routing problem trait and the concrete request-scoped instance.

use std::collections::HashSet;

use super::{Node, Vehicle};
use crate::config::DEPOT_INDEX;
use crate::distance::CostMatrix;
use crate::error::RoutingError;

/// Read-only view of a CVRP instance used by the solvers.
///
/// Costs and demands are plain functions of node indices; there is no
/// separate solver-internal index space. Costs may be asymmetric and need
/// not satisfy the triangle inequality.
///
/// # Examples
///
/// ```
/// use commute_routing::models::RoutingProblem;
///
/// struct Line;
///
/// impl RoutingProblem for Line {
///     fn num_nodes(&self) -> usize { 3 }
///     fn num_vehicles(&self) -> usize { 1 }
///     fn cost(&self, from: usize, to: usize) -> f64 { (from as f64 - to as f64).abs() }
///     fn demand(&self, node: usize) -> i32 { if node == 0 { 0 } else { 1 } }
///     fn capacity(&self, _vehicle: usize) -> i32 { 2 }
/// }
///
/// assert_eq!(Line.customers().collect::<Vec<_>>(), vec![1, 2]);
/// assert_eq!(Line.total_demand(), 2);
/// ```
pub trait RoutingProblem: Send + Sync {
    /// Number of nodes including the depot.
    fn num_nodes(&self) -> usize;

    /// Number of vehicles in the fleet.
    fn num_vehicles(&self) -> usize;

    /// Travel cost from node `from` to node `to`.
    fn cost(&self, from: usize, to: usize) -> f64;

    /// Demand of a node; zero for the depot.
    fn demand(&self, node: usize) -> i32;

    /// Capacity of the vehicle at fleet position `vehicle`.
    fn capacity(&self, vehicle: usize) -> i32;

    /// Index of the depot.
    fn depot(&self) -> usize {
        DEPOT_INDEX
    }

    /// Display label of a node, used in diagnostics.
    fn node_label(&self, node: usize) -> String {
        node.to_string()
    }

    /// Display label of a vehicle.
    fn vehicle_label(&self, vehicle: usize) -> String {
        vehicle.to_string()
    }

    /// All non-depot node indices in ascending order.
    fn customers(&self) -> impl Iterator<Item = usize> + '_
    where
        Self: Sized,
    {
        let depot = self.depot();
        (0..self.num_nodes()).filter(move |&i| i != depot)
    }

    fn total_demand(&self) -> i64
    where
        Self: Sized,
    {
        self.customers().map(|i| self.demand(i) as i64).sum()
    }

    fn total_capacity(&self) -> i64 {
        (0..self.num_vehicles())
            .map(|v| self.capacity(v) as i64)
            .sum()
    }
}

/// A validated problem instance built once per optimization request.
///
/// Owns the locations, the fleet, and the (distance or time) cost matrix.
/// Nothing is mutable after construction.
#[derive(Debug, Clone)]
pub struct Instance {
    nodes: Vec<Node>,
    fleet: Vec<Vehicle>,
    costs: CostMatrix,
}

impl Instance {
    /// Validates and assembles an instance.
    ///
    /// Node 0 is the depot. Fails with [`RoutingError::InvalidInput`] on an
    /// empty location list, a depot with non-zero demand, negative demand,
    /// duplicate node or vehicle ids, an empty fleet, non-positive capacity,
    /// or a matrix whose size differs from the number of nodes.
    pub fn new(
        nodes: Vec<Node>,
        fleet: Vec<Vehicle>,
        costs: CostMatrix,
    ) -> Result<Self, RoutingError> {
        validate_nodes(&nodes)?;
        validate_fleet(&fleet)?;
        if costs.size() != nodes.len() {
            return Err(RoutingError::invalid(format!(
                "cost matrix is {0}x{0} but there are {1} locations",
                costs.size(),
                nodes.len()
            )));
        }
        Ok(Self {
            nodes,
            fleet,
            costs,
        })
    }

    /// Builds an instance over an explicit matrix, naming nodes by index.
    ///
    /// Coordinates are left at the origin; only the matrix is consulted.
    ///
    /// # Examples
    ///
    /// ```
    /// use commute_routing::distance::CostMatrix;
    /// use commute_routing::models::{Instance, RoutingProblem};
    ///
    /// let m = CostMatrix::from_data(2, vec![0.0, 4.0, 4.0, 0.0]).unwrap();
    /// let inst = Instance::with_matrix(m, &[0, 1], &[3]).unwrap();
    /// assert_eq!(inst.cost(0, 1), 4.0);
    /// assert_eq!(inst.capacity(0), 3);
    /// ```
    pub fn with_matrix(
        costs: CostMatrix,
        demands: &[i32],
        capacities: &[i32],
    ) -> Result<Self, RoutingError> {
        let nodes = demands
            .iter()
            .enumerate()
            .map(|(i, &d)| Node::new(i.to_string(), 0.0, 0.0, d))
            .collect();
        let fleet = capacities
            .iter()
            .enumerate()
            .map(|(v, &c)| Vehicle::new(v.to_string(), c))
            .collect();
        Self::new(nodes, fleet, costs)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn fleet(&self) -> &[Vehicle] {
        &self.fleet
    }

    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Fails fast when the fleet cannot possibly carry the demand.
    ///
    /// Checks that total demand fits total capacity and that every node fits
    /// at least one vehicle on its own.
    pub fn check_capacity(&self) -> Result<(), RoutingError> {
        let demand = self.total_demand();
        let capacity = self.total_capacity();
        if demand > capacity {
            return Err(RoutingError::CapacityInfeasible {
                unrouted: self.customers().map(|i| self.node_label(i)).collect(),
                demand_deficit: demand - capacity,
            });
        }
        let largest = self.fleet.iter().map(Vehicle::capacity).max().unwrap_or(0);
        let oversized: Vec<usize> = self
            .customers()
            .filter(|&i| self.demand(i) > largest)
            .collect();
        if !oversized.is_empty() {
            let deficit = oversized
                .iter()
                .map(|&i| i64::from(self.demand(i)) - i64::from(largest))
                .sum();
            return Err(RoutingError::CapacityInfeasible {
                unrouted: oversized.into_iter().map(|i| self.node_label(i)).collect(),
                demand_deficit: deficit,
            });
        }
        Ok(())
    }
}

impl RoutingProblem for Instance {
    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn num_vehicles(&self) -> usize {
        self.fleet.len()
    }

    #[inline]
    fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs.get(from, to)
    }

    #[inline]
    fn demand(&self, node: usize) -> i32 {
        self.nodes[node].demand()
    }

    #[inline]
    fn capacity(&self, vehicle: usize) -> i32 {
        self.fleet[vehicle].capacity()
    }

    fn node_label(&self, node: usize) -> String {
        self.nodes[node].id().to_string()
    }

    fn vehicle_label(&self, vehicle: usize) -> String {
        self.fleet[vehicle].id().to_string()
    }
}

fn validate_nodes(nodes: &[Node]) -> Result<(), RoutingError> {
    let depot = nodes
        .get(DEPOT_INDEX)
        .ok_or_else(|| RoutingError::invalid("location list is empty"))?;
    if depot.demand() != 0 {
        return Err(RoutingError::invalid_node(
            format!("depot demand must be 0, got {}", depot.demand()),
            depot.id(),
        ));
    }
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if node.demand() < 0 {
            return Err(RoutingError::invalid_node(
                format!("demand {} is negative", node.demand()),
                node.id(),
            ));
        }
        if !seen.insert(node.id()) {
            return Err(RoutingError::invalid_node("duplicate node id", node.id()));
        }
    }
    Ok(())
}

fn validate_fleet(fleet: &[Vehicle]) -> Result<(), RoutingError> {
    if fleet.is_empty() {
        return Err(RoutingError::invalid("fleet is empty"));
    }
    let mut seen = HashSet::with_capacity(fleet.len());
    for vehicle in fleet {
        if vehicle.capacity() <= 0 {
            return Err(RoutingError::invalid(format!(
                "vehicle {} has non-positive capacity {}",
                vehicle.id(),
                vehicle.capacity()
            )));
        }
        if !seen.insert(vehicle.id()) {
            return Err(RoutingError::invalid(format!(
                "duplicate vehicle id {}",
                vehicle.id()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: usize) -> CostMatrix {
        let data = (0..n * n)
            .map(|k| if k / n == k % n { 0.0 } else { 1.0 })
            .collect();
        CostMatrix::from_data(n, data).expect("valid")
    }

    fn nodes() -> Vec<Node> {
        vec![
            Node::depot("HQ", 12.97, 77.59),
            Node::new("A", 12.98, 77.60, 1),
            Node::new("B", 12.96, 77.58, 2),
        ]
    }

    #[test]
    fn test_instance_new() {
        let inst = Instance::new(nodes(), vec![Vehicle::new("v", 3)], square(3)).expect("valid");
        assert_eq!(inst.num_nodes(), 3);
        assert_eq!(inst.num_vehicles(), 1);
        assert_eq!(inst.demand(2), 2);
        assert_eq!(inst.node_label(1), "A");
        assert_eq!(inst.vehicle_label(0), "v");
        assert_eq!(inst.customers().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(inst.total_demand(), 3);
    }

    #[test]
    fn test_rejects_depot_demand() {
        let mut ns = nodes();
        ns[0] = Node::new("HQ", 12.97, 77.59, 1);
        let err = Instance::new(ns, vec![Vehicle::new("v", 3)], square(3)).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidInput { node: Some(ref n), .. } if n == "HQ"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut ns = nodes();
        ns[2] = Node::new("A", 12.96, 77.58, 1);
        assert!(Instance::new(ns, vec![Vehicle::new("v", 3)], square(3)).is_err());

        let fleet = vec![Vehicle::new("v", 3), Vehicle::new("v", 3)];
        assert!(Instance::new(nodes(), fleet, square(3)).is_err());
    }

    #[test]
    fn test_rejects_bad_fleet() {
        assert!(Instance::new(nodes(), vec![], square(3)).is_err());
        assert!(Instance::new(nodes(), vec![Vehicle::new("v", 0)], square(3)).is_err());
        assert!(Instance::new(nodes(), vec![Vehicle::new("v", -4)], square(3)).is_err());
    }

    #[test]
    fn test_rejects_negative_demand_and_empty_list() {
        let mut ns = nodes();
        ns[1] = Node::new("A", 12.98, 77.60, -1);
        assert!(Instance::new(ns, vec![Vehicle::new("v", 3)], square(3)).is_err());
        assert!(Instance::new(vec![], vec![Vehicle::new("v", 3)], square(0)).is_err());
    }

    #[test]
    fn test_rejects_matrix_size_mismatch() {
        assert!(Instance::new(nodes(), vec![Vehicle::new("v", 3)], square(4)).is_err());
    }

    #[test]
    fn test_check_capacity_total() {
        let inst = Instance::new(nodes(), vec![Vehicle::new("v", 2)], square(3)).expect("valid");
        match inst.check_capacity() {
            Err(RoutingError::CapacityInfeasible { demand_deficit, .. }) => {
                assert_eq!(demand_deficit, 1)
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_check_capacity_oversized_node() {
        let fleet = vec![Vehicle::new("v0", 1), Vehicle::new("v1", 1), Vehicle::new("v2", 1)];
        let inst = Instance::new(nodes(), fleet, square(3)).expect("valid");
        match inst.check_capacity() {
            Err(RoutingError::CapacityInfeasible { unrouted, .. }) => {
                assert_eq!(unrouted, vec!["B".to_string()])
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_check_capacity_ok() {
        let inst = Instance::new(nodes(), vec![Vehicle::new("v", 3)], square(3)).expect("valid");
        assert!(inst.check_capacity().is_ok());
    }
}
