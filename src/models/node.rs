//! Pickup locations.

use serde::{Deserialize, Serialize};

fn default_demand() -> i32 {
    1
}

/// A pickup point (or the depot) in a routing problem.
///
/// Index 0 of a location list is the depot and carries zero demand. Every
/// other node asks for `demand` seats, one by default.
///
/// # Examples
///
/// ```
/// use commute_routing::models::Node;
///
/// let depot = Node::depot("OFFICE_DEPOT", 12.9716, 77.5946);
/// assert_eq!(depot.demand(), 0);
///
/// let n = Node::new("EMP_1000", 12.99, 77.61, 1);
/// assert_eq!(n.id(), "EMP_1000");
/// assert_eq!(n.demand(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_demand")]
    demand: i32,
}

impl Node {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, demand: i32) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            demand,
        }
    }

    /// Creates a depot node (demand 0).
    pub fn depot(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self::new(id, latitude, longitude, 0)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Seats requested at this stop.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// `(latitude, longitude)` pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}
