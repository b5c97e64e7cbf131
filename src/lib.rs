//! # commute-routing
//!
//! Capacitated shuttle routing from a single depot. Pickup locations are
//! turned into a great-circle distance matrix (optionally projected to
//! travel minutes), a feasible plan is built by cheapest insertion, and the
//! plan is refined by a budgeted local search.
//!
//! ## Modules
//!
//! - [`config`] — Per-request solver settings (budget, fleet, policies)
//! - [`distance`] — Haversine cost matrix, time projection, matrix cache
//! - [`models`] — Domain model types (Node, Vehicle, Route, Solution, Problem trait)
//! - [`evaluation`] — Route cost evaluation and invariant checks
//! - [`constructive`] — Cheapest-insertion construction
//! - [`local_search`] — 2-opt, relocate and exchange under a budget
//! - [`extract`] — Per-vehicle plan extraction
//! - [`request`] — Request and response wire types
//! - [`pipeline`] — End-to-end optimization of one request
//!
//! ## Example
//!
//! ```
//! use commute_routing::config::{FleetSpec, SolverConfig};
//! use commute_routing::models::Node;
//! use commute_routing::pipeline::optimize;
//! use commute_routing::request::{Request, Status};
//!
//! let locations = vec![
//!     Node::depot("OFFICE_DEPOT", 12.9716, 77.5946),
//!     Node::new("EMP_1", 12.9352, 77.6245, 2),
//!     Node::new("EMP_2", 13.0358, 77.5970, 1),
//!     Node::new("EMP_3", 12.9279, 77.6271, 1),
//! ];
//! let request = Request::new(locations, FleetSpec::uniform(2, 3).vehicles());
//!
//! let response = optimize(&request, &SolverConfig::default(), None);
//! assert_eq!(response.status, Status::Ok);
//! assert!(response.routes.iter().all(|r| r.load <= 3));
//! ```

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod local_search;
pub mod models;
pub mod pipeline;
pub mod request;

pub use error::RoutingError;
