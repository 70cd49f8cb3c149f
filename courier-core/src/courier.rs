//! Couriers: the bounded-capacity delivery units being scheduled.

use crate::{ShopId, TimeWindow};

/// Unique courier identifier.
pub type CourierId = u64;

/// Vehicle type identifier (foot, bike, car, ...).
pub type VehicleTypeId = u32;

/// Longest route, in stops, the engine ever plans.
pub const MAX_ROUTE_LEN: u8 = 8;

/// A concrete delivery unit of some vehicle type.
///
/// Durations are in seconds, distances in metres and weights in grams.
///
/// # Examples
///
/// ```
/// use courier_core::Courier;
///
/// let courier = Courier::new(1, 2, 12, 20_000).with_taxi(true);
/// assert_eq!(courier.capacity(), 8);
/// assert!(!courier.returns_to_shop());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Courier {
    /// Unique identifier.
    pub id: CourierId,
    /// Vehicle type of the courier.
    pub vehicle_type: VehicleTypeId,
    /// Shop the courier is bound to; `None` for couriers shared between shops.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shop_id: Option<ShopId>,
    /// Maximum number of orders on one route.
    pub max_order_count: u8,
    /// Maximum total weight of one route.
    pub max_weight: u32,
    /// Maximum weight of a single order.
    pub max_order_weight: u32,
    /// Maximum route length; `None` means unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_distance: Option<u32>,
    /// Time spent handing an order to the customer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hand_in_time: u32,
    /// Time spent collecting the orders at the shop.
    #[cfg_attr(feature = "serde", serde(default))]
    pub get_order_time: u32,
    /// Delay before the courier can start a new route.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_delay: u32,
    /// Taxi couriers finish at the last customer instead of returning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_taxi: bool,
    /// Shift; routes must finish before it ends.
    #[cfg_attr(feature = "serde", serde(default))]
    pub work_window: Option<TimeWindow>,
    /// Lunch break; routes must not overlap it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lunch_window: Option<TimeWindow>,
}

impl Courier {
    /// Construct a courier with no time costs, windows or distance limit.
    ///
    /// The per-order weight limit defaults to `max_weight`.
    #[must_use]
    pub const fn new(
        id: CourierId,
        vehicle_type: VehicleTypeId,
        max_order_count: u8,
        max_weight: u32,
    ) -> Self {
        Self {
            id,
            vehicle_type,
            shop_id: None,
            max_order_count,
            max_weight,
            max_order_weight: max_weight,
            max_distance: None,
            hand_in_time: 0,
            get_order_time: 0,
            start_delay: 0,
            is_taxi: false,
            work_window: None,
            lunch_window: None,
        }
    }

    /// Bind the courier to a shop.
    #[must_use]
    pub const fn with_shop(mut self, shop_id: ShopId) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    /// Set the per-order weight limit.
    #[must_use]
    pub const fn with_max_order_weight(mut self, weight: u32) -> Self {
        self.max_order_weight = weight;
        self
    }

    /// Set the route length limit in metres.
    #[must_use]
    pub const fn with_max_distance(mut self, metres: u32) -> Self {
        self.max_distance = Some(metres);
        self
    }

    /// Set hand-in, get-order and start-delay times in seconds.
    #[must_use]
    pub const fn with_time_costs(mut self, hand_in: u32, get_order: u32, start_delay: u32) -> Self {
        self.hand_in_time = hand_in;
        self.get_order_time = get_order;
        self.start_delay = start_delay;
        self
    }

    /// Mark the courier as a taxi (one-way routes).
    #[must_use]
    pub const fn with_taxi(mut self, is_taxi: bool) -> Self {
        self.is_taxi = is_taxi;
        self
    }

    /// Set the shift window.
    #[must_use]
    pub const fn with_work_window(mut self, window: TimeWindow) -> Self {
        self.work_window = Some(window);
        self
    }

    /// Set the lunch window.
    #[must_use]
    pub const fn with_lunch_window(mut self, window: TimeWindow) -> Self {
        self.lunch_window = Some(window);
        self
    }

    /// Route length the engine plans for, capped at [`MAX_ROUTE_LEN`].
    #[must_use]
    pub const fn capacity(&self) -> u8 {
        if self.max_order_count > MAX_ROUTE_LEN {
            MAX_ROUTE_LEN
        } else {
            self.max_order_count
        }
    }

    /// Whether routes end back at the shop.
    #[must_use]
    pub const fn returns_to_shop(&self) -> bool {
        !self.is_taxi
    }
}
