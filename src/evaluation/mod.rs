//! Route cost evaluation and feasibility checking.

mod evaluator;

pub use evaluator::{
    evaluate_solution, insertion_delta, is_feasible, removal_delta, route_cost, route_load,
};
