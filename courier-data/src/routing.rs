//! Travel matrices estimated from great-circle distances.
//!
//! Street distance is approximated as the haversine distance scaled by a
//! detour factor; duration follows from a per-vehicle-type average speed.

use std::collections::BTreeMap;

use courier_core::{
    Leg, Order, Shop, TravelMatrix, TravelMatrixError, TravelMatrixProvider, VehicleTypeId,
    travel::haversine_metres,
};
use serde::{Deserialize, Serialize};

/// Default ratio of street distance to straight-line distance.
pub const DEFAULT_DETOUR_FACTOR: f64 = 1.3;

/// Default average speed in km/h for vehicle types without an override.
pub const DEFAULT_SPEED_KMH: f64 = 15.0;

/// Settings for [`GreatCircleMatrixProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Street-to-straight-line distance ratio; at least 1.
    pub detour_factor: f64,
    /// Average speed in km/h for vehicle types missing from `speeds_kmh`.
    pub default_speed_kmh: f64,
    /// Average speed in km/h per vehicle type.
    pub speeds_kmh: BTreeMap<VehicleTypeId, f64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            detour_factor: DEFAULT_DETOUR_FACTOR,
            default_speed_kmh: DEFAULT_SPEED_KMH,
            speeds_kmh: BTreeMap::new(),
        }
    }
}

/// [`TravelMatrixProvider`] that needs no routing backend.
///
/// # Examples
///
/// ```
/// use courier_core::{Order, Shop, TimeWindow, TravelMatrixProvider};
/// use courier_data::GreatCircleMatrixProvider;
/// use geo::Coord;
///
/// let provider = GreatCircleMatrixProvider::default().with_speed(1, 36.0);
/// let shop = Shop::new(1, Coord { x: 0.0, y: 0.0 });
/// let order = Order::new(1, 1, Coord { x: 0.0, y: 0.01 }, TimeWindow::unbounded());
/// let matrix = provider.select(&shop, &[order], 1).expect("matrix");
/// let leg = matrix.leg(1, 0).expect("shop to order");
/// assert!((1_440..1_450).contains(&leg.distance));
/// assert!((144..=145).contains(&leg.duration));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreatCircleMatrixProvider {
    config: RoutingConfig,
}

impl GreatCircleMatrixProvider {
    /// Provider using `config`.
    #[must_use]
    pub const fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Override the average speed of `vehicle_type`.
    #[must_use]
    pub fn with_speed(mut self, vehicle_type: VehicleTypeId, kmh: f64) -> Self {
        self.config.speeds_kmh.insert(vehicle_type, kmh);
        self
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &RoutingConfig {
        &self.config
    }

    fn speed_kmh(&self, vehicle_type: VehicleTypeId) -> f64 {
        self.config
            .speeds_kmh
            .get(&vehicle_type)
            .copied()
            .unwrap_or(self.config.default_speed_kmh)
    }
}

fn invalid_setting(message: String) -> TravelMatrixError {
    TravelMatrixError::ServiceError {
        code: "config".to_owned(),
        message,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "estimates are computed in floating point and clamped before the cast"
)]
fn estimate(straight_metres: f64, detour: f64, metres_per_second: f64) -> Leg {
    let metres = (straight_metres * detour).round().clamp(0.0, f64::from(u32::MAX));
    let seconds = (metres / metres_per_second)
        .round()
        .clamp(0.0, f64::from(u32::MAX));
    Leg::new(metres as u32, seconds as u32)
}

impl TravelMatrixProvider for GreatCircleMatrixProvider {
    #[expect(
        clippy::float_arithmetic,
        reason = "speed conversion is inherently floating-point"
    )]
    fn select(
        &self,
        shop: &Shop,
        orders: &[Order],
        vehicle_type: VehicleTypeId,
    ) -> Result<TravelMatrix, TravelMatrixError> {
        if orders.is_empty() {
            return Err(TravelMatrixError::EmptyInput);
        }
        let speed = self.speed_kmh(vehicle_type);
        if !(speed.is_finite() && speed > 0.0) {
            return Err(invalid_setting(format!(
                "vehicle type {vehicle_type} has no usable speed ({speed} km/h)"
            )));
        }
        let detour = self.config.detour_factor;
        if !(detour.is_finite() && detour >= 1.0) {
            return Err(invalid_setting(format!(
                "detour factor must be at least 1, got {detour}"
            )));
        }
        let metres_per_second = speed / 3.6;
        let location = |node: usize| {
            orders
                .get(node)
                .map_or(shop.location, |order| order.location)
        };
        Ok(TravelMatrix::from_fn(orders.len(), |from, to| {
            if from == to {
                return Leg::default();
            }
            estimate(
                haversine_metres(location(from), location(to)),
                detour,
                metres_per_second,
            )
        }))
    }
}
