//! Orders awaiting delivery.

use std::collections::BTreeSet;

use geo::Coord;

use crate::{Courier, ShopId, TimeWindow, VehicleTypeId};

/// Unique order identifier.
pub type OrderId = u64;

/// Lifecycle state of an order within a dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    /// Waiting for a courier; the only state the engine plans for.
    #[default]
    Pending,
    /// Already handed to a courier in an earlier cycle.
    Assigned,
    /// Delivered to the customer.
    Delivered,
    /// Withdrawn by the customer or the shop.
    Cancelled,
}

/// A customer order that must be delivered from its shop.
///
/// Orders are immutable for the duration of a computation cycle.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use courier_core::{Order, TimeWindow};
///
/// let order = Order::new(7, 1, Coord { x: 37.6, y: 55.7 }, TimeWindow::unbounded())
///     .with_weight(1_500)
///     .with_vehicle_types([2]);
/// assert!(order.accepts_vehicle(2));
/// assert!(!order.accepts_vehicle(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Shop the order is picked up from.
    pub shop_id: ShopId,
    /// Weight in grams.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weight: u32,
    /// Delivery address (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Window during which the order must be handed over.
    pub window: TimeWindow,
    /// Business priority; larger is more urgent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    /// Current lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: OrderStatus,
    /// Vehicle types allowed to carry the order. Empty means unrestricted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle_types: BTreeSet<VehicleTypeId>,
}

impl Order {
    /// Construct a pending, weightless order without vehicle restrictions.
    #[must_use]
    pub const fn new(
        id: OrderId,
        shop_id: ShopId,
        location: Coord<f64>,
        window: TimeWindow,
    ) -> Self {
        Self {
            id,
            shop_id,
            weight: 0,
            location,
            window,
            priority: 0,
            status: OrderStatus::Pending,
            vehicle_types: BTreeSet::new(),
        }
    }

    /// Set the order weight in grams.
    #[must_use]
    pub const fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the delivery window.
    #[must_use]
    pub const fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the business priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the lifecycle state.
    #[must_use]
    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Restrict the order to the given vehicle types.
    #[must_use]
    pub fn with_vehicle_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = VehicleTypeId>,
    {
        self.vehicle_types = types.into_iter().collect();
        self
    }

    /// Whether a vehicle of type `vehicle_type` may carry this order.
    #[must_use]
    pub fn accepts_vehicle(&self, vehicle_type: VehicleTypeId) -> bool {
        self.vehicle_types.is_empty() || self.vehicle_types.contains(&vehicle_type)
    }

    /// Whether the order still awaits a courier.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    /// Whether `courier` may be offered this order at all.
    ///
    /// Checks the vehicle type and the courier's per-order weight limit.
    #[must_use]
    pub fn is_eligible_for(&self, courier: &Courier) -> bool {
        self.accepts_vehicle(courier.vehicle_type) && self.weight <= courier.max_order_weight
    }
}
