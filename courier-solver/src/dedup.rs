//! Collapsing permutation-equivalent candidates.

use std::collections::{HashMap, hash_map::Entry};

use courier_core::{Delivery, OrderId, VehicleTypeId};

/// Identity of a candidate up to visiting order: vehicle type plus the sorted
/// order identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    vehicle_type: VehicleTypeId,
    orders: Vec<OrderId>,
}

impl CanonicalKey {
    /// Canonical key of `delivery`.
    #[must_use]
    pub fn of(delivery: &Delivery) -> Self {
        Self {
            vehicle_type: delivery.vehicle_type(),
            orders: delivery.canonical_orders(),
        }
    }
}

/// Keep only the cheapest candidate per [`CanonicalKey`].
///
/// Survivors stay at the position of the first candidate with their key; a
/// cheaper later candidate replaces it in place, ties keep the earlier one.
/// Running it twice changes nothing.
pub fn dedup(deliveries: &mut Vec<Delivery>) {
    if deliveries.len() < 2 {
        return;
    }
    let mut seen: HashMap<CanonicalKey, usize> = HashMap::with_capacity(deliveries.len());
    let mut kept: Vec<Delivery> = Vec::with_capacity(deliveries.len());
    for delivery in deliveries.drain(..) {
        match seen.entry(CanonicalKey::of(&delivery)) {
            Entry::Occupied(entry) => {
                if let Some(existing) = kept.get_mut(*entry.get()) {
                    if delivery.cost() < existing.cost() {
                        *existing = delivery;
                    }
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(kept.len());
                kept.push(delivery);
            }
        }
    }
    kept.shrink_to_fit();
    *deliveries = kept;
}
