//! Vehicle type with a seat capacity.

use serde::{Deserialize, Serialize};

/// A vehicle that starts and ends its route at the depot.
///
/// # Examples
///
/// ```
/// use commute_routing::models::Vehicle;
///
/// let v = Vehicle::new("bus-1", 15);
/// assert_eq!(v.id(), "bus-1");
/// assert_eq!(v.capacity(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: String,
    capacity: i32,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    pub fn new(id: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }

    /// Vehicle ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
}
