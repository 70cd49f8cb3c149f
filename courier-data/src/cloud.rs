//! Cloud selection by nearest-neighbour growth.

use courier_core::{CloudError, CloudFinder, CloudRequest, Order, Timestamp};

/// [`CloudFinder`] that grows a cloud around the most urgent order.
///
/// The seed is the order whose window closes first (lowest identifier on
/// ties). The cloud then repeatedly absorbs the order closest to any member,
/// as long as that distance stays within the distance bound and the spread of
/// window ends stays within the time bound. Growth stops at the target size
/// or when no order qualifies, so clouds may come out smaller than asked.
///
/// # Examples
///
/// ```
/// use courier_core::{CloudFinder, CloudRequest, DistanceMatrix, Order, TimeWindow};
/// use courier_data::NearestCloudFinder;
/// use geo::Coord;
///
/// let orders: Vec<Order> = [0.0, 0.001, 0.5]
///     .into_iter()
///     .zip(1..)
///     .map(|(y, id)| Order::new(id, 1, Coord { x: 0.0, y }, TimeWindow::unbounded()))
///     .collect();
/// let locations: Vec<_> = orders.iter().map(|order| order.location).collect();
/// let distances = DistanceMatrix::from_locations(&locations);
/// let request = CloudRequest {
///     orders: &orders,
///     target_size: 3,
///     distance_bound: 3_000,
///     time_bound_minutes: 60,
///     distances: &distances,
/// };
/// let cloud = NearestCloudFinder.find_cloud(&request).expect("cloud");
/// assert_eq!(cloud, vec![0, 1]);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NearestCloudFinder;

fn seed(orders: &[Order]) -> Option<usize> {
    orders
        .iter()
        .enumerate()
        .min_by_key(|(_, order)| (order.window.to, order.id))
        .map(|(index, _)| index)
}

/// Window ends of the cloud so far.
#[derive(Debug, Clone, Copy)]
struct Spread {
    earliest: Timestamp,
    latest: Timestamp,
}

impl Spread {
    const fn at(end: Timestamp) -> Self {
        Self {
            earliest: end,
            latest: end,
        }
    }

    fn admits(self, end: Timestamp, bound_seconds: i64) -> bool {
        let earliest = self.earliest.min(end);
        let latest = self.latest.max(end);
        latest.saturating_sub(earliest) <= bound_seconds
    }

    fn widen(&mut self, end: Timestamp) {
        self.earliest = self.earliest.min(end);
        self.latest = self.latest.max(end);
    }
}

impl CloudFinder for NearestCloudFinder {
    fn find_cloud(&self, request: &CloudRequest<'_>) -> Result<Vec<usize>, CloudError> {
        let orders = request.orders;
        let Some(first) = seed(orders) else {
            return Err(CloudError::EmptyInput);
        };
        if request.distances.len() != orders.len() {
            return Err(CloudError::Failed {
                message: format!(
                    "distance matrix covers {} orders but the pool has {}",
                    request.distances.len(),
                    orders.len()
                ),
            });
        }
        let bound_seconds = i64::from(request.time_bound_minutes).saturating_mul(60);
        let target = request.target_size.min(orders.len());

        let mut members = vec![false; orders.len()];
        let mut nearest: Vec<Option<u32>> = vec![None; orders.len()];
        let mut cloud = Vec::with_capacity(target);
        let mut spread = Spread::at(orders.get(first).map_or(0, |order| order.window.to));
        let mut joining = Some(first);

        while let Some(index) = joining {
            cloud.push(index);
            if let Some(member) = members.get_mut(index) {
                *member = true;
            }
            if let Some(order) = orders.get(index) {
                spread.widen(order.window.to);
            }
            if cloud.len() >= target {
                break;
            }
            for (other, distance) in nearest.iter_mut().enumerate() {
                let Some(metres) = request.distances.get(index, other) else {
                    continue;
                };
                *distance = Some(distance.map_or(metres, |known| known.min(metres)));
            }
            joining = orders
                .iter()
                .enumerate()
                .filter(|(other, _)| !members.get(*other).copied().unwrap_or(true))
                .filter_map(|(other, order)| {
                    let metres = nearest.get(other).copied().flatten()?;
                    (metres <= request.distance_bound
                        && spread.admits(order.window.to, bound_seconds))
                    .then_some((metres, order.id, other))
                })
                .min()
                .map(|(_, _, other)| other);
        }
        Ok(cloud)
    }
}
