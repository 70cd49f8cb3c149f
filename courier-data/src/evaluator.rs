//! Route evaluation by permutation search.

use courier_core::{
    Delivery, EvaluationError, RouteEvaluator, RoutePlanner, RouteRequest, TravelMatrix,
};

/// Subsets up to this many stops are searched over every visiting order.
pub const DEFAULT_PERMUTATION_LIMIT: usize = 6;

/// [`RouteEvaluator`] that returns the cheapest feasible visiting order.
///
/// Small subsets are planned in every order; larger ones are planned once in
/// nearest-neighbour order from the shop.
///
/// # Examples
///
/// ```
/// use courier_core::{Courier, Leg, Order, RouteEvaluator, RouteRequest, Shop, TimeWindow, TravelMatrix};
/// use courier_data::PermutationEvaluator;
/// use geo::Coord;
///
/// let shop = Shop::new(1, Coord { x: 0.0, y: 0.0 });
/// let courier = Courier::new(1, 1, 2, 10_000);
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let orders = vec![
///     Order::new(1, 1, origin, TimeWindow::unbounded()),
///     Order::new(2, 1, origin, TimeWindow::unbounded()),
/// ];
/// let matrix = TravelMatrix::from_fn(2, |from, to| {
///     if from == to { Leg::default() } else { Leg::new(100, 60) }
/// });
/// let request = RouteRequest {
///     shop: &shop,
///     courier: &courier,
///     orders: &orders,
///     subset: &[1, 0],
///     matrix: &matrix,
///     cycle_time: 0,
/// };
/// let delivery = PermutationEvaluator::default()
///     .evaluate(&request)
///     .expect("valid request")
///     .expect("feasible");
/// assert_eq!(delivery.cost(), 180);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationEvaluator {
    limit: usize,
}

impl Default for PermutationEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_PERMUTATION_LIMIT)
    }
}

impl PermutationEvaluator {
    /// Search every order of subsets with at most `limit` stops.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Largest subset searched exhaustively.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl RouteEvaluator for PermutationEvaluator {
    fn evaluate(&self, request: &RouteRequest<'_>) -> Result<Option<Delivery>, EvaluationError> {
        let len = request.orders.len();
        if let Some(&index) = request.subset.iter().find(|&&index| index >= len) {
            return Err(EvaluationError::InvalidIndex { index, len });
        }
        if request.subset.is_empty() {
            return Ok(None);
        }
        let planner = RoutePlanner::new(
            request.shop,
            request.courier,
            request.orders,
            request.matrix,
            request.cycle_time,
        )?;
        if request.subset.len() > self.limit {
            let sequence = nearest_neighbour(request.matrix, request.subset);
            return Ok(planner.plan(&sequence));
        }

        let mut sequence = request.subset.to_vec();
        sequence.sort_unstable();
        let mut best: Option<Delivery> = None;
        for_each_permutation(&mut sequence, |candidate| {
            let Some(delivery) = planner.plan(candidate) else {
                return;
            };
            if best
                .as_ref()
                .is_none_or(|current| delivery.cost() < current.cost())
            {
                best = Some(delivery);
            }
        });
        Ok(best)
    }
}

/// Visit every permutation of `items` (Heap's algorithm), starting with the
/// input order.
fn for_each_permutation<F>(items: &mut [usize], mut visit: F)
where
    F: FnMut(&[usize]),
{
    let mut counters = vec![0_usize; items.len()];
    visit(items);
    let mut level = 1;
    while level < items.len() {
        let Some(counter) = counters.get_mut(level) else {
            break;
        };
        if *counter < level {
            let other = if level.is_multiple_of(2) { 0 } else { *counter };
            items.swap(other, level);
            *counter += 1;
            visit(items);
            level = 1;
        } else {
            *counter = 0;
            level += 1;
        }
    }
}

/// Greedy order starting at the shop: always travel to the closest unvisited
/// stop by duration, then distance, then pool index.
fn nearest_neighbour(matrix: &TravelMatrix, subset: &[usize]) -> Vec<usize> {
    let mut remaining = subset.to_vec();
    remaining.sort_unstable();
    remaining.dedup();
    let mut sequence = Vec::with_capacity(remaining.len());
    let mut at = matrix.shop_node();
    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &node)| {
                let leg = matrix.leg(at, node).unwrap_or_default();
                (leg.duration, leg.distance, node)
            })
            .map(|(position, &node)| (position, node));
        let Some((position, node)) = next else {
            break;
        };
        remaining.remove(position);
        sequence.push(node);
        at = node;
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Courier, Leg, Order, Shop, TimeWindow};
    use geo::Coord;
    use rstest::{fixture, rstest};

    struct Pool {
        shop: Shop,
        courier: Courier,
        orders: Vec<Order>,
        matrix: TravelMatrix,
    }

    impl Pool {
        fn request<'a>(&'a self, subset: &'a [usize]) -> RouteRequest<'a> {
            RouteRequest {
                shop: &self.shop,
                courier: &self.courier,
                orders: &self.orders,
                subset,
                matrix: &self.matrix,
                cycle_time: 0,
            }
        }
    }

    /// Orders on a line east of the shop, one minute per unit.
    #[fixture]
    fn line() -> Pool {
        let positions = [3_u32, 1, 2, 5];
        let orders = positions
            .iter()
            .zip(1_u64..)
            .map(|(&x, id)| {
                Order::new(id, 1, Coord { x: f64::from(x), y: 0.0 }, TimeWindow::unbounded())
            })
            .collect();
        let position = |node: usize| positions.get(node).copied().unwrap_or(0);
        let matrix = TravelMatrix::from_fn(positions.len(), |from, to| {
            let units = position(from).abs_diff(position(to));
            Leg::new(units * 1_000, units * 60)
        });
        Pool {
            shop: Shop::new(1, Coord { x: 0.0, y: 0.0 }),
            courier: Courier::new(1, 1, 4, 100_000).with_taxi(true),
            orders,
            matrix,
        }
    }

    #[rstest]
    fn heap_visits_every_permutation_once() {
        let mut items = vec![0, 1, 2, 3];
        let mut seen = std::collections::HashSet::new();
        for_each_permutation(&mut items, |perm| {
            assert!(seen.insert(perm.to_vec()));
        });
        assert_eq!(seen.len(), 24);
    }

    #[rstest]
    fn picks_the_cheapest_order(line: Pool) {
        let delivery = PermutationEvaluator::default()
            .evaluate(&line.request(&[0, 1, 2]))
            .expect("valid")
            .expect("feasible");
        // Taxi route 0 -> 1 -> 2 -> 3 along the line.
        assert_eq!(delivery.order_ids().collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(delivery.cost(), 180);
    }

    #[rstest]
    fn large_subsets_fall_back_to_nearest_neighbour(line: Pool) {
        let delivery = PermutationEvaluator::new(2)
            .evaluate(&line.request(&[3, 0, 1, 2]))
            .expect("valid")
            .expect("feasible");
        assert_eq!(delivery.order_ids().collect::<Vec<_>>(), vec![2, 3, 1, 4]);
    }

    #[rstest]
    fn late_windows_change_the_best_order(mut line: Pool) {
        if let Some(order) = line.orders.get_mut(1) {
            order.window = TimeWindow {
                from: 250,
                to: i64::MAX,
            };
        }
        let delivery = PermutationEvaluator::default()
            .evaluate(&line.request(&[0, 1]))
            .expect("valid")
            .expect("feasible");
        assert_eq!(delivery.order_ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[rstest]
    fn infeasible_subsets_yield_nothing(mut line: Pool) {
        line.courier = Courier::new(1, 1, 1, 100_000);
        let outcome = PermutationEvaluator::default()
            .evaluate(&line.request(&[0, 1]))
            .expect("valid");
        assert!(outcome.is_none());
    }

    #[rstest]
    fn out_of_range_indices_are_errors(line: Pool) {
        let err = PermutationEvaluator::default()
            .evaluate(&line.request(&[0, 9]))
            .expect_err("invalid index");
        assert_eq!(err, EvaluationError::InvalidIndex { index: 9, len: 4 });
    }
}
