//! Shops: the origin (and, for loop routes, destination) of every delivery.

use geo::Coord;

use crate::TimeWindow;

/// Unique shop identifier.
pub type ShopId = u64;

/// A pickup point that couriers depart from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shop {
    /// Unique identifier.
    pub id: ShopId,
    /// Geospatial position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Opening hours; `None` means always open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub work_hours: Option<TimeWindow>,
}

impl Shop {
    /// Construct an always-open shop.
    #[must_use]
    pub const fn new(id: ShopId, location: Coord<f64>) -> Self {
        Self {
            id,
            location,
            work_hours: None,
        }
    }

    /// Set the opening hours.
    #[must_use]
    pub const fn with_work_hours(mut self, hours: TimeWindow) -> Self {
        self.work_hours = Some(hours);
        self
    }
}
