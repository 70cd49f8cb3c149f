//! Work contexts: one (shop, vehicle type) unit of outer scheduling.

use std::collections::BTreeMap;

use courier_core::{Courier, DispatchSnapshot, Order, OrderId, Shop, Timestamp, VehicleTypeId};

/// The orders of one shop that one vehicle type may serve, with the courier
/// that represents the type.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkContext {
    /// Route origin.
    pub shop: Shop,
    /// Representative courier of the vehicle type.
    pub courier: Courier,
    /// Eligible orders, sorted by identifier.
    pub orders: Vec<Order>,
    /// Dispatch cycle start.
    pub cycle_time: Timestamp,
}

impl WorkContext {
    /// Build a context, sorting `orders` by identifier.
    #[must_use]
    pub fn new(
        shop: Shop,
        courier: Courier,
        mut orders: Vec<Order>,
        cycle_time: Timestamp,
    ) -> Self {
        orders.sort_by_key(|order| order.id);
        Self {
            shop,
            courier,
            orders,
            cycle_time,
        }
    }

    /// Vehicle type the context plans for.
    #[must_use]
    pub const fn vehicle_type(&self) -> VehicleTypeId {
        self.courier.vehicle_type
    }

    /// Number of eligible orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Identifiers of the eligible orders.
    #[must_use]
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|order| order.id).collect()
    }
}

/// Ranking used to pick a representative courier: shop-bound first, then
/// larger capacity, then lower identifier.
fn outranks(candidate: &Courier, incumbent: &Courier, shop: &Shop) -> bool {
    let bound = |courier: &Courier| courier.shop_id == Some(shop.id);
    (bound(candidate), candidate.capacity(), std::cmp::Reverse(candidate.id))
        > (bound(incumbent), incumbent.capacity(), std::cmp::Reverse(incumbent.id))
}

/// Representative courier per vehicle type for `shop`.
fn representatives<'a>(
    shop: &Shop,
    couriers: &'a [Courier],
) -> BTreeMap<VehicleTypeId, &'a Courier> {
    let mut chosen: BTreeMap<VehicleTypeId, &Courier> = BTreeMap::new();
    let usable = couriers.iter().filter(|courier| {
        courier.capacity() > 0 && courier.shop_id.is_none_or(|id| id == shop.id)
    });
    for courier in usable {
        chosen
            .entry(courier.vehicle_type)
            .and_modify(|incumbent| {
                if outranks(courier, incumbent, shop) {
                    *incumbent = courier;
                }
            })
            .or_insert(courier);
    }
    chosen
}

/// One context per (shop, vehicle type) with at least one eligible order,
/// largest first.
///
/// Orders are eligible when pending, placed at the shop, open to the vehicle
/// type and within the representative courier's per-order weight limit.
/// Contexts with equal order counts keep shop then vehicle-type order.
#[must_use]
pub fn build_contexts(snapshot: &DispatchSnapshot) -> Vec<WorkContext> {
    let mut contexts = Vec::new();
    for shop in &snapshot.shops {
        for courier in representatives(shop, &snapshot.couriers).into_values() {
            let orders: Vec<Order> = snapshot
                .orders
                .iter()
                .filter(|order| {
                    order.is_pending() && order.shop_id == shop.id && order.is_eligible_for(courier)
                })
                .cloned()
                .collect();
            if orders.is_empty() {
                continue;
            }
            contexts.push(WorkContext::new(
                shop.clone(),
                courier.clone(),
                orders,
                snapshot.cycle_time,
            ));
        }
    }
    contexts.sort_by(|a, b| b.order_count().cmp(&a.order_count()));
    contexts
}
