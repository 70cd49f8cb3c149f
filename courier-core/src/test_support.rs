//! Deterministic collaborators and builders used by unit and behaviour tests.
//!
//! Coordinates are treated as a flat grid: one unit of `x` or `y` is
//! [`GRID_METRES`] metres and takes [`GRID_SECONDS`] seconds to travel.

use std::{
    panic::panic_any,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use geo::Coord;

use crate::{
    CloudError, CloudFinder, CloudRequest, Courier, Delivery, EvaluationError, Leg, Order,
    OrderId, RouteEvaluator, RoutePlanner, RouteRequest, Shop, ShopId, TimeWindow,
    TravelMatrix, TravelMatrixError, TravelMatrixProvider, VehicleTypeId,
};

/// Metres per grid unit.
pub const GRID_METRES: u32 = 1_000;

/// Seconds per grid unit.
pub const GRID_SECONDS: u32 = 60;

/// Pending, unrestricted 1 kg order at grid point `(x, y)`.
#[must_use]
pub fn grid_order(id: OrderId, shop_id: ShopId, x: i32, y: i32) -> Order {
    Order::new(
        id,
        shop_id,
        Coord {
            x: f64::from(x),
            y: f64::from(y),
        },
        TimeWindow::unbounded(),
    )
    .with_weight(1_000)
}

/// Shop at the grid origin.
#[must_use]
pub const fn grid_shop(id: ShopId) -> Shop {
    Shop::new(id, Coord { x: 0.0, y: 0.0 })
}

/// Shop-bound courier with generous weight limits.
#[must_use]
pub const fn bound_courier(
    id: u64,
    shop_id: ShopId,
    vehicle_type: VehicleTypeId,
    capacity: u8,
) -> Courier {
    Courier::new(id, vehicle_type, capacity, 1_000_000).with_shop(shop_id)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    reason = "grid coordinates in tests are small whole numbers"
)]
fn grid_units(a: Coord<f64>, b: Coord<f64>) -> u32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()).round() as u32
}

/// Manhattan-distance matrix provider over grid coordinates.
///
/// Every request is recorded as the list of order identifiers it covered.
#[derive(Debug, Default)]
pub struct GridMatrixProvider {
    requests: Mutex<Vec<Vec<OrderId>>>,
}

impl GridMatrixProvider {
    /// Identifier lists of every matrix requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<OrderId>> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Build the grid matrix for `orders` without recording the request.
    #[must_use]
    pub fn matrix(shop: &Shop, orders: &[Order]) -> TravelMatrix {
        let location = |node: usize| {
            orders
                .get(node)
                .map_or(shop.location, |order| order.location)
        };
        TravelMatrix::from_fn(orders.len(), |from, to| {
            let units = grid_units(location(from), location(to));
            Leg::new(
                units.saturating_mul(GRID_METRES),
                units.saturating_mul(GRID_SECONDS),
            )
        })
    }
}

impl TravelMatrixProvider for GridMatrixProvider {
    fn select(
        &self,
        shop: &Shop,
        orders: &[Order],
        _vehicle_type: VehicleTypeId,
    ) -> Result<TravelMatrix, TravelMatrixError> {
        if orders.is_empty() {
            return Err(TravelMatrixError::EmptyInput);
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(orders.iter().map(|order| order.id).collect());
        }
        Ok(Self::matrix(shop, orders))
    }
}

/// Matrix provider that always reports a service failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingMatrixProvider;

impl TravelMatrixProvider for FailingMatrixProvider {
    fn select(
        &self,
        _shop: &Shop,
        _orders: &[Order],
        _vehicle_type: VehicleTypeId,
    ) -> Result<TravelMatrix, TravelMatrixError> {
        Err(TravelMatrixError::ServiceError {
            code: "503".to_owned(),
            message: "routing backend unavailable".to_owned(),
        })
    }
}

/// Evaluator that plans the subset in ascending index order.
///
/// Counts how many subsets it was asked to evaluate.
#[derive(Debug, Default)]
pub struct SequentialEvaluator {
    calls: AtomicUsize,
}

impl SequentialEvaluator {
    /// Number of evaluations performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl RouteEvaluator for SequentialEvaluator {
    fn evaluate(&self, request: &RouteRequest<'_>) -> Result<Option<Delivery>, EvaluationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let len = request.orders.len();
        if let Some(&index) = request.subset.iter().find(|&&index| index >= len) {
            return Err(EvaluationError::InvalidIndex { index, len });
        }
        let planner = RoutePlanner::new(
            request.shop,
            request.courier,
            request.orders,
            request.matrix,
            request.cycle_time,
        )?;
        let mut sequence = request.subset.to_vec();
        sequence.sort_unstable();
        Ok(planner.plan(&sequence))
    }
}

/// How a [`FailingEvaluator`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Return an error.
    Error,
    /// Panic.
    Panic,
}

/// Evaluator that misbehaves on subsets containing a trigger order.
///
/// Other subsets are delegated to a [`SequentialEvaluator`].
#[derive(Debug)]
pub struct FailingEvaluator {
    trigger: OrderId,
    fault: Fault,
    inner: SequentialEvaluator,
}

impl FailingEvaluator {
    /// Misbehave whenever the subset contains order `trigger`.
    #[must_use]
    pub fn new(trigger: OrderId, fault: Fault) -> Self {
        Self {
            trigger,
            fault,
            inner: SequentialEvaluator::default(),
        }
    }
}

impl RouteEvaluator for FailingEvaluator {
    fn evaluate(&self, request: &RouteRequest<'_>) -> Result<Option<Delivery>, EvaluationError> {
        let triggered = request
            .subset
            .iter()
            .filter_map(|&index| request.orders.get(index))
            .any(|order| order.id == self.trigger);
        match (triggered, self.fault) {
            (false, _) => self.inner.evaluate(request),
            (true, Fault::Error) => Err(EvaluationError::Failed {
                message: format!("order {} cannot be evaluated", self.trigger),
            }),
            (true, Fault::Panic) => {
                panic_any(format!("evaluator crashed on order {}", self.trigger))
            }
        }
    }
}

/// Cloud finder returning the first `target_size` orders of the pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixCloudFinder;

impl CloudFinder for PrefixCloudFinder {
    fn find_cloud(&self, request: &CloudRequest<'_>) -> Result<Vec<usize>, CloudError> {
        if request.orders.is_empty() {
            return Err(CloudError::EmptyInput);
        }
        Ok((0..request.target_size.min(request.orders.len())).collect())
    }
}

/// Cloud finder returning a fixed answer regardless of the request.
#[derive(Debug, Clone)]
pub struct FixedCloudFinder {
    answer: Result<Vec<usize>, CloudError>,
}

impl FixedCloudFinder {
    /// Always return `indices`.
    #[must_use]
    pub const fn returning(indices: Vec<usize>) -> Self {
        Self {
            answer: Ok(indices),
        }
    }

    /// Always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            answer: Err(CloudError::Failed {
                message: "clustering backend unavailable".to_owned(),
            }),
        }
    }
}

impl CloudFinder for FixedCloudFinder {
    fn find_cloud(&self, _request: &CloudRequest<'_>) -> Result<Vec<usize>, CloudError> {
        self.answer.clone()
    }
}
