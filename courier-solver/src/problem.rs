//! A fixed order pool prepared for route construction.

use std::collections::HashMap;

use courier_core::{
    Courier, Order, OrderId, RoutePlanner, RouteRequest, Shop, Timestamp, TravelMatrix,
    TravelMatrixError,
};

/// Shop, courier, order pool and the travel matrix over that pool.
///
/// Stage inputs refer to orders by their index in `orders`, which is also
/// their node in `matrix`.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    /// Route origin.
    pub shop: &'a Shop,
    /// Representative courier.
    pub courier: &'a Courier,
    /// Order pool, sorted by identifier.
    pub orders: &'a [Order],
    /// Travel matrix over `orders` and the shop.
    pub matrix: &'a TravelMatrix,
    /// Dispatch cycle start.
    pub cycle_time: Timestamp,
}

impl<'a> Problem<'a> {
    /// Evaluation request for the orders at `subset`.
    #[must_use]
    pub const fn request<'s>(&self, subset: &'s [usize]) -> RouteRequest<'s>
    where
        'a: 's,
    {
        RouteRequest {
            shop: self.shop,
            courier: self.courier,
            orders: self.orders,
            subset,
            matrix: self.matrix,
            cycle_time: self.cycle_time,
        }
    }

    /// Planner for concrete sequences over the pool.
    pub fn planner(&self) -> Result<RoutePlanner<'a>, TravelMatrixError> {
        RoutePlanner::new(
            self.shop,
            self.courier,
            self.orders,
            self.matrix,
            self.cycle_time,
        )
    }

    /// Map from order identifier to pool index.
    #[must_use]
    pub fn index_map(&self) -> HashMap<OrderId, usize> {
        self.orders
            .iter()
            .enumerate()
            .map(|(index, order)| (order.id, index))
            .collect()
    }

    /// Courier capacity as a route length.
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::from(self.courier.capacity())
    }
}
