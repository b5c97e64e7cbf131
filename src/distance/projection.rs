//! Distance-to-time projection.
//!
//! Travel duration is supplied by an external estimator mapping
//! `(distance_km, hour, rain)` to minutes. The solver only sees the
//! projected matrix, which is validated before use: it must keep the shape
//! of the distance matrix, have a zero diagonal, and contain finite,
//! non-negative entries. It is allowed to violate the triangle inequality.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CostMatrix;
use crate::error::RoutingError;

/// Shift context the estimator is conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeContext {
    /// Hour of day, 0..=23.
    pub hour: u8,
    /// 1 when raining, 0 otherwise.
    pub weather_rain: u8,
}

impl TimeContext {
    /// Creates a validated context.
    pub fn new(hour: u8, weather_rain: u8) -> Result<Self, RoutingError> {
        let ctx = Self { hour, weather_rain };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Parses a shift start such as `"09:00"` into a context.
    ///
    /// Only the hour is used; minutes must still be a valid `00..=59`.
    pub fn from_shift_time(shift_time: &str, weather_rain: u8) -> Result<Self, RoutingError> {
        let bad = || RoutingError::invalid(format!("shift time {shift_time:?} is not HH:MM"));
        let (h, m) = shift_time.trim().split_once(':').ok_or_else(bad)?;
        let hour: u8 = h.parse().map_err(|_| bad())?;
        let minute: u8 = m.parse().map_err(|_| bad())?;
        if minute > 59 {
            return Err(bad());
        }
        Self::new(hour, weather_rain)
    }

    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.hour > 23 {
            return Err(RoutingError::invalid(format!(
                "hour {} is outside 0..=23",
                self.hour
            )));
        }
        if self.weather_rain > 1 {
            return Err(RoutingError::invalid(format!(
                "weather_rain must be 0 or 1, got {}",
                self.weather_rain
            )));
        }
        Ok(())
    }

    pub fn is_raining(&self) -> bool {
        self.weather_rain == 1
    }
}

/// Predicts the travel duration (minutes) of a single leg.
pub trait TravelEstimator: Send + Sync {
    fn estimate(&self, distance_km: f64, hour: u8, rain: bool) -> f64;
}

impl<F> TravelEstimator for F
where
    F: Fn(f64, u8, bool) -> f64 + Send + Sync,
{
    fn estimate(&self, distance_km: f64, hour: u8, rain: bool) -> f64 {
        self(distance_km, hour, rain)
    }
}

/// Turns a distance matrix into a time matrix.
pub trait CostProjector: Send + Sync {
    fn project(
        &self,
        distances: &CostMatrix,
        context: &TimeContext,
    ) -> Result<CostMatrix, RoutingError>;
}

/// Projects each off-diagonal cell independently through a [`TravelEstimator`].
///
/// # Examples
///
/// ```
/// use commute_routing::distance::{CostMatrix, CostProjector, EstimatorProjector, TimeContext};
///
/// let dm = CostMatrix::from_data(2, vec![0.0, 10.0, 10.0, 0.0]).unwrap();
/// let projector = EstimatorProjector::new(|km: f64, _hour: u8, _rain: bool| km * 3.0);
/// let tm = projector.project(&dm, &TimeContext::new(9, 0).unwrap()).unwrap();
/// assert_eq!(tm.get(0, 1), 30.0);
/// assert_eq!(tm.get(0, 0), 0.0);
/// ```
pub struct EstimatorProjector<E> {
    estimator: E,
}

impl<E: TravelEstimator> EstimatorProjector<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }
}

impl<E: TravelEstimator> CostProjector for EstimatorProjector<E> {
    fn project(
        &self,
        distances: &CostMatrix,
        context: &TimeContext,
    ) -> Result<CostMatrix, RoutingError> {
        context.validate()?;
        let rain = context.is_raining();
        let data = distances.map_off_diagonal(|km| self.estimator.estimate(km, context.hour, rain));
        let size = distances.size();
        debug!(size, hour = context.hour, rain, "projected distance matrix to time");
        // Bypasses `from_data` so that a bad estimate is reported as a projection error.
        let projected = CostMatrix::unchecked(size, data);
        validate_projection(distances, &projected)?;
        Ok(projected)
    }
}

/// Checks that a projected matrix is usable in place of `input`.
pub fn validate_projection(input: &CostMatrix, output: &CostMatrix) -> Result<(), RoutingError> {
    let expected = input.size();
    let found = (output.size(), output.as_slice().len() / output.size().max(1));
    if output.size() != expected || output.as_slice().len() != expected * expected {
        return Err(RoutingError::Projection {
            expected,
            found,
            reason: "shape mismatch".into(),
        });
    }
    if let Some((i, j, v)) = output.first_bad_cell() {
        return Err(RoutingError::Projection {
            expected,
            found,
            reason: format!("cell ({i}, {j}) = {v} is negative, non-finite or an off-zero diagonal"),
        });
    }
    Ok(())
}

/// Reference traffic estimator.
///
/// Free flow is 30 km/h (2 min/km). Morning and evening peaks (08–10, 17–19)
/// slow traffic by 80%, midday (11–16) by 20%, rain by a further 40%. A leg
/// never takes less than 1.5 min/km.
#[derive(Debug, Clone, Copy, Default)]
pub struct CongestionModel;

impl CongestionModel {
    const MINUTES_PER_KM: f64 = 2.0;
    const FLOOR_MINUTES_PER_KM: f64 = 1.5;
    const RAIN_FACTOR: f64 = 1.4;

    fn congestion(hour: u8) -> f64 {
        match hour {
            8..=10 | 17..=19 => 1.8,
            11..=16 => 1.2,
            _ => 1.0,
        }
    }
}

impl TravelEstimator for CongestionModel {
    fn estimate(&self, distance_km: f64, hour: u8, rain: bool) -> f64 {
        let weather = if rain { Self::RAIN_FACTOR } else { 1.0 };
        let minutes = distance_km * Self::MINUTES_PER_KM * Self::congestion(hour) * weather;
        minutes.max(distance_km * Self::FLOOR_MINUTES_PER_KM)
    }
}
