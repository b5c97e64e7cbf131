//! Domain model types for capacitated vehicle routing.
//!
//! Provides pickup nodes with demands, vehicles with capacities, routes as
//! ordered node sequences with derived cost and load, solutions holding one
//! route per vehicle, and the problem trait the solvers read from.

mod node;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use node::Node;
pub use problem::{Instance, RoutingProblem};
pub use route::Route;
pub use solution::{Solution, Violation, ViolationType};
pub use vehicle::Vehicle;
