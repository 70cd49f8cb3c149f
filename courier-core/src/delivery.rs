//! Candidate deliveries: ordered routes produced by the solver.
//!
//! A [`Delivery`] is immutable once built. A better candidate for the same
//! order set replaces a prior one instead of mutating it.

use crate::{CourierId, Leg, OrderId, ShopId, TimeWindow, Timestamp, VehicleTypeId};

/// One stop of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryStop {
    /// Order handed over at this stop.
    pub order_id: OrderId,
    /// Weight of the order in grams.
    pub weight: u32,
    /// Edge travelled to reach this stop from the previous node.
    pub leg: Leg,
    /// Timestamp at which the order is handed over.
    pub delivered_at: Timestamp,
}

/// Raw parts of a [`Delivery`], as produced by an evaluator.
///
/// Aggregate weight and distance are derived when the draft is converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDraft {
    /// Shop the route starts from.
    pub shop_id: ShopId,
    /// Courier the route was planned for.
    pub courier_id: CourierId,
    /// Vehicle type of the courier.
    pub vehicle_type: VehicleTypeId,
    /// Stops in visiting order.
    pub stops: Vec<DeliveryStop>,
    /// Edge back to the shop for loop routes.
    pub return_leg: Option<Leg>,
    /// Route cost; lower is better.
    pub cost: u64,
    /// Departure from the shop.
    pub start: Timestamp,
    /// Arrival back at the shop, or the last hand-over for one-way routes.
    pub end: Timestamp,
    /// Dispatch cycle the candidate was computed for.
    pub calculated_at: Timestamp,
}

/// An ordered route assigned to a courier.
///
/// # Examples
///
/// ```
/// use courier_core::{Delivery, DeliveryDraft, DeliveryStop, Leg};
///
/// let delivery = Delivery::from(DeliveryDraft {
///     shop_id: 1,
///     courier_id: 2,
///     vehicle_type: 3,
///     stops: vec![
///         DeliveryStop { order_id: 9, weight: 500, leg: Leg::new(800, 120), delivered_at: 220 },
///         DeliveryStop { order_id: 4, weight: 700, leg: Leg::new(300, 60), delivered_at: 340 },
///     ],
///     return_leg: Some(Leg::new(900, 150)),
///     cost: 490,
///     start: 100,
///     end: 590,
///     calculated_at: 0,
/// });
/// assert_eq!(delivery.weight(), 1_200);
/// assert_eq!(delivery.distance(), 2_000);
/// assert_eq!(delivery.canonical_orders(), vec![4, 9]);
/// assert!(delivery.is_loop());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delivery {
    shop_id: ShopId,
    courier_id: CourierId,
    vehicle_type: VehicleTypeId,
    stops: Vec<DeliveryStop>,
    return_leg: Option<Leg>,
    weight: u32,
    distance: u32,
    cost: u64,
    start: Timestamp,
    end: Timestamp,
    calculated_at: Timestamp,
}

impl From<DeliveryDraft> for Delivery {
    fn from(draft: DeliveryDraft) -> Self {
        let weight = draft
            .stops
            .iter()
            .fold(0_u32, |acc, stop| acc.saturating_add(stop.weight));
        let distance = draft
            .stops
            .iter()
            .map(|stop| stop.leg)
            .chain(draft.return_leg)
            .fold(0_u32, |acc, leg| acc.saturating_add(leg.distance));
        Self {
            shop_id: draft.shop_id,
            courier_id: draft.courier_id,
            vehicle_type: draft.vehicle_type,
            stops: draft.stops,
            return_leg: draft.return_leg,
            weight,
            distance,
            cost: draft.cost,
            start: draft.start,
            end: draft.end,
            calculated_at: draft.calculated_at,
        }
    }
}

impl Delivery {
    /// Shop the route starts from.
    #[must_use]
    pub const fn shop_id(&self) -> ShopId {
        self.shop_id
    }

    /// Courier the route was planned for.
    #[must_use]
    pub const fn courier_id(&self) -> CourierId {
        self.courier_id
    }

    /// Vehicle type of the courier.
    #[must_use]
    pub const fn vehicle_type(&self) -> VehicleTypeId {
        self.vehicle_type
    }

    /// Stops in visiting order.
    #[must_use]
    pub fn stops(&self) -> &[DeliveryStop] {
        &self.stops
    }

    /// Order identifiers in visiting order.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.stops.iter().map(|stop| stop.order_id)
    }

    /// Order identifiers sorted ascending; equal for permutations of one set.
    #[must_use]
    pub fn canonical_orders(&self) -> Vec<OrderId> {
        let mut ids: Vec<OrderId> = self.order_ids().collect();
        ids.sort_unstable();
        ids
    }

    /// Whether the route serves `order_id`.
    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.stops.iter().any(|stop| stop.order_id == order_id)
    }

    /// Number of orders on the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the route has no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Total weight in grams.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    /// Total distance in metres, return leg included.
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }

    /// Route cost; lower is better.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// Departure from the shop.
    #[must_use]
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// End of the route.
    #[must_use]
    pub const fn end(&self) -> Timestamp {
        self.end
    }

    /// Start and end of the route as a window.
    #[must_use]
    pub const fn interval(&self) -> TimeWindow {
        TimeWindow {
            from: self.start,
            to: self.end,
        }
    }

    /// Edge back to the shop, present for loop routes.
    #[must_use]
    pub const fn return_leg(&self) -> Option<Leg> {
        self.return_leg
    }

    /// Whether the route returns to the shop.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        self.return_leg.is_some()
    }

    /// Dispatch cycle the candidate was computed for.
    ///
    /// This is the snapshot's cycle time, not the wall clock at planning.
    #[must_use]
    pub const fn calculated_at(&self) -> Timestamp {
        self.calculated_at
    }
}
