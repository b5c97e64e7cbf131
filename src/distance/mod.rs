//! Cost matrices.
//!
//! Provides the dense cost matrix, its great-circle builder, the
//! distance-to-time projection boundary, and an on-disk matrix cache.

mod cache;
mod matrix;
mod projection;

pub use cache::MatrixCache;
pub use matrix::CostMatrix;
pub(crate) use matrix::check_nodes;
pub use projection::{
    validate_projection, CongestionModel, CostProjector, EstimatorProjector, TimeContext,
    TravelEstimator,
};
