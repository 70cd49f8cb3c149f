//! Travel-matrix provider trait for a shop and its orders.

use crate::{Order, Shop, VehicleTypeId};

use super::error::TravelMatrixError;
use super::matrix::TravelMatrix;

/// Fetch directed travel distances and durations for a set of orders.
///
/// Implementers must return a matrix whose order nodes follow `orders`
/// position by position, with the shop as the final node.
///
/// # Examples
///
/// ```rust
/// use courier_core::{Leg, Order, Shop, TravelMatrix, TravelMatrixError, TravelMatrixProvider, VehicleTypeId};
///
/// struct FlatProvider;
///
/// impl TravelMatrixProvider for FlatProvider {
///     fn select(
///         &self,
///         _shop: &Shop,
///         orders: &[Order],
///         _vehicle_type: VehicleTypeId,
///     ) -> Result<TravelMatrix, TravelMatrixError> {
///         if orders.is_empty() {
///             return Err(TravelMatrixError::EmptyInput);
///         }
///         Ok(TravelMatrix::from_fn(orders.len(), |_, _| Leg::new(500, 120)))
///     }
/// }
///
/// let shop = Shop::new(1, geo::Coord { x: 0.0, y: 0.0 });
/// let err = FlatProvider.select(&shop, &[], 1).expect_err("empty input");
/// assert_eq!(err, TravelMatrixError::EmptyInput);
/// ```
pub trait TravelMatrixProvider: Send + Sync {
    /// Return the travel matrix for `orders` served from `shop` by vehicles of
    /// `vehicle_type`.
    ///
    /// Implementations must return `Err(TravelMatrixError::EmptyInput)` when
    /// `orders` is empty.
    fn select(
        &self,
        shop: &Shop,
        orders: &[Order],
        vehicle_type: VehicleTypeId,
    ) -> Result<TravelMatrix, TravelMatrixError>;
}
