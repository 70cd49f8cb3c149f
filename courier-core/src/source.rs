//! Dispatch snapshots and the sources that load them.

use thiserror::Error;

use crate::{Courier, Order, Shop, ShopId, Timestamp};

/// Everything a dispatch cycle needs: pending orders, free couriers and their
/// shops, taken at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchSnapshot {
    /// Start of the dispatch cycle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cycle_time: Timestamp,
    /// Shops referenced by orders and couriers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shops: Vec<Shop>,
    /// Couriers available in this cycle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub couriers: Vec<Courier>,
    /// Orders to be scheduled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub orders: Vec<Order>,
}

impl DispatchSnapshot {
    /// Whether there is nothing to schedule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() || self.couriers.is_empty()
    }

    /// Look up a shop by identifier.
    #[must_use]
    pub fn shop(&self, id: ShopId) -> Option<&Shop> {
        self.shops.iter().find(|shop| shop.id == id)
    }
}

/// Errors returned by [`DispatchSource::load`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing store could not be reached or read.
    #[error("dispatch source unavailable: {message}")]
    Unavailable {
        /// Human-readable failure description.
        message: String,
    },
    /// The data was read but could not be understood.
    #[error("malformed dispatch snapshot: {message}")]
    Malformed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Provides the snapshot for one dispatch cycle.
pub trait DispatchSource {
    /// Load the current snapshot.
    fn load(&self) -> Result<DispatchSnapshot, SourceError>;
}
