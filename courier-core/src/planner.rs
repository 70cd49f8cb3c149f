//! Exact timing and cost of an ordered stop sequence.
//!
//! The planner is the single place that decides whether a concrete visiting
//! order is legal for a courier. A stop is served at the later of the arrival
//! time and its window start and must not be served after its window end.
//! Hand-in time is spent after every stop; loop routes add the leg back to the
//! shop.

use crate::{
    Courier, Delivery, DeliveryDraft, DeliveryStop, Order, Shop, Timestamp, TravelMatrix,
    TravelMatrixError,
};

/// Moment the courier leaves the shop when dispatched at `cycle_time`.
///
/// The courier must be past its start delay, on shift and the shop open; the
/// get-order time is then spent collecting the parcels.
#[must_use]
pub fn departure_time(shop: &Shop, courier: &Courier, cycle_time: Timestamp) -> Timestamp {
    let ready = cycle_time.saturating_add(i64::from(courier.start_delay));
    let on_shift = courier
        .work_window
        .map_or(ready, |window| ready.max(window.from));
    let open = shop
        .work_hours
        .map_or(on_shift, |hours| on_shift.max(hours.from));
    open.saturating_add(i64::from(courier.get_order_time))
}

/// Plans concrete routes over a fixed order pool and its travel matrix.
///
/// Sequences are given as indices into the pool, which are also the matrix
/// nodes.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use courier_core::{Courier, Leg, Order, RoutePlanner, Shop, TimeWindow, TravelMatrix};
///
/// # fn main() -> Result<(), courier_core::TravelMatrixError> {
/// let shop = Shop::new(1, Coord { x: 0.0, y: 0.0 });
/// let courier = Courier::new(1, 1, 2, 10_000);
/// let orders = vec![
///     Order::new(10, 1, Coord { x: 0.0, y: 0.0 }, TimeWindow::unbounded()),
///     Order::new(11, 1, Coord { x: 0.0, y: 0.0 }, TimeWindow::unbounded()),
/// ];
/// let matrix = TravelMatrix::from_fn(2, |_, _| Leg::new(1_000, 100));
/// let planner = RoutePlanner::new(&shop, &courier, &orders, &matrix, 0)?;
///
/// let delivery = planner.plan(&[1, 0]).expect("feasible");
/// assert_eq!(delivery.order_ids().collect::<Vec<_>>(), vec![11, 10]);
/// assert_eq!(delivery.cost(), 300);
/// assert!(planner.plan(&[0, 1, 0]).is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RoutePlanner<'a> {
    shop: &'a Shop,
    courier: &'a Courier,
    orders: &'a [Order],
    matrix: &'a TravelMatrix,
    departure: Timestamp,
    /// Dispatch cycle every planned route is stamped with.
    calculated_at: Timestamp,
}

impl<'a> RoutePlanner<'a> {
    /// Construct a planner, checking that `matrix` covers `orders`.
    ///
    /// Routes are stamped with `cycle_time` rather than the wall clock, so
    /// replanning the same snapshot yields identical candidates.
    pub fn new(
        shop: &'a Shop,
        courier: &'a Courier,
        orders: &'a [Order],
        matrix: &'a TravelMatrix,
        cycle_time: Timestamp,
    ) -> Result<Self, TravelMatrixError> {
        matrix.ensure_covers(orders.len())?;
        Ok(Self {
            shop,
            courier,
            orders,
            matrix,
            departure: departure_time(shop, courier, cycle_time),
            calculated_at: cycle_time,
        })
    }

    /// Departure from the shop shared by every planned route.
    #[must_use]
    pub const fn departure(&self) -> Timestamp {
        self.departure
    }

    /// Courier the routes are planned for.
    #[must_use]
    pub const fn courier(&self) -> &'a Courier {
        self.courier
    }

    /// Order pool the sequences index into.
    #[must_use]
    pub const fn orders(&self) -> &'a [Order] {
        self.orders
    }

    /// Travel matrix over the pool and the shop.
    #[must_use]
    pub const fn matrix(&self) -> &'a TravelMatrix {
        self.matrix
    }

    /// Plan `sequence` in the given visiting order.
    ///
    /// Returns `None` when the sequence is empty, repeats an order, indexes
    /// outside the pool, or breaks any courier or time-window constraint.
    #[must_use]
    pub fn plan(&self, sequence: &[usize]) -> Option<Delivery> {
        if sequence.is_empty() || sequence.len() > usize::from(self.courier.capacity()) {
            return None;
        }
        if has_repeats(sequence) {
            return None;
        }

        let shop_node = self.matrix.shop_node();
        let mut previous = shop_node;
        let mut clock = self.departure;
        let mut weight = 0_u32;
        let mut distance = 0_u32;
        let mut stops = Vec::with_capacity(sequence.len());

        for &index in sequence {
            let order = self.orders.get(index)?;
            if order.weight > self.courier.max_order_weight {
                return None;
            }
            weight = weight.checked_add(order.weight)?;
            let leg = self.matrix.leg(previous, index)?;
            let arrival = clock.saturating_add(i64::from(leg.duration));
            let delivered_at = arrival.max(order.window.from);
            if delivered_at > order.window.to {
                return None;
            }
            distance = distance.saturating_add(leg.distance);
            stops.push(DeliveryStop {
                order_id: order.id,
                weight: order.weight,
                leg,
                delivered_at,
            });
            clock = delivered_at.saturating_add(i64::from(self.courier.hand_in_time));
            previous = index;
        }

        if weight > self.courier.max_weight {
            return None;
        }

        let return_leg = if self.courier.returns_to_shop() {
            Some(self.matrix.leg(previous, shop_node)?)
        } else {
            None
        };
        let end = return_leg.map_or(clock, |leg| clock.saturating_add(i64::from(leg.duration)));
        if let Some(leg) = return_leg {
            distance = distance.saturating_add(leg.distance);
        }

        if self
            .courier
            .max_distance
            .is_some_and(|limit| distance > limit)
        {
            return None;
        }
        if self.courier.work_window.is_some_and(|shift| end > shift.to) {
            return None;
        }
        if self
            .courier
            .lunch_window
            .is_some_and(|lunch| lunch.overlaps(self.departure, end))
        {
            return None;
        }

        let cost = u64::try_from(end.saturating_sub(self.departure)).unwrap_or(0);
        Some(Delivery::from(DeliveryDraft {
            shop_id: self.shop.id,
            courier_id: self.courier.id,
            vehicle_type: self.courier.vehicle_type,
            stops,
            return_leg,
            cost,
            start: self.departure,
            end,
            calculated_at: self.calculated_at,
        }))
    }
}

fn has_repeats(sequence: &[usize]) -> bool {
    sequence
        .iter()
        .enumerate()
        .any(|(pos, index)| sequence.iter().skip(pos.saturating_add(1)).any(|other| other == index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Leg, TimeWindow};
    use geo::Coord;
    use rstest::{fixture, rstest};

    struct Scenario {
        shop: Shop,
        orders: Vec<Order>,
        matrix: TravelMatrix,
    }

    #[fixture]
    fn scenario() -> Scenario {
        let origin = Coord { x: 0.0, y: 0.0 };
        let orders = vec![
            Order::new(1, 1, origin, TimeWindow::unbounded()).with_weight(3_000),
            Order::new(2, 1, origin, TimeWindow { from: 0, to: 500 }).with_weight(4_000),
            Order::new(3, 1, origin, TimeWindow { from: 1_000, to: 2_000 }).with_weight(5_000),
        ];
        Scenario {
            shop: Shop::new(1, origin),
            orders,
            matrix: TravelMatrix::from_fn(3, |from, to| {
                if from == to {
                    Leg::default()
                } else {
                    Leg::new(1_000, 200)
                }
            }),
        }
    }

    fn plan(scenario: &Scenario, courier: &Courier, sequence: &[usize]) -> Option<Delivery> {
        RoutePlanner::new(
            &scenario.shop,
            courier,
            &scenario.orders,
            &scenario.matrix,
            0,
        )
        .expect("matrix covers orders")
        .plan(sequence)
    }

    #[rstest]
    fn waits_for_window_start(scenario: Scenario) {
        let courier = Courier::new(1, 1, 3, 20_000).with_time_costs(60, 0, 0);
        let delivery = plan(&scenario, &courier, &[2]).expect("feasible");
        let stop = delivery.stops().first().expect("one stop");
        assert_eq!(stop.delivered_at, 1_000);
        assert_eq!(delivery.end(), 1_000 + 60 + 200);
    }

    #[rstest]
    fn routes_carry_the_cycle_stamp(scenario: Scenario) {
        let courier = Courier::new(1, 1, 3, 20_000).with_time_costs(60, 30, 120);
        let planner = RoutePlanner::new(
            &scenario.shop,
            &courier,
            &scenario.orders,
            &scenario.matrix,
            5_000,
        )
        .expect("matrix covers orders");
        let delivery = planner.plan(&[0]).expect("feasible");
        assert_eq!(delivery.calculated_at(), 5_000);
        assert_eq!(delivery.start(), 5_000 + 120 + 30);
        assert_eq!(planner.plan(&[0]), Some(delivery));
    }

    #[rstest]
    fn rejects_late_delivery(scenario: Scenario) {
        let courier = Courier::new(1, 1, 3, 20_000).with_time_costs(300, 0, 0);
        // Order 2 closes at 500: 200 + 300 + 200 = 700 when visited second.
        assert!(plan(&scenario, &courier, &[0, 1]).is_none());
        assert!(plan(&scenario, &courier, &[1, 0]).is_some());
    }

    #[rstest]
    #[case(7_000, &[0, 1], true)]
    #[case(6_999, &[0, 1], false)]
    fn enforces_max_weight(
        scenario: Scenario,
        #[case] max_weight: u32,
        #[case] sequence: &[usize],
        #[case] feasible: bool,
    ) {
        let courier = Courier::new(1, 1, 3, max_weight);
        assert_eq!(plan(&scenario, &courier, sequence).is_some(), feasible);
    }

    #[rstest]
    fn enforces_capacity(scenario: Scenario) {
        let courier = Courier::new(1, 1, 2, 20_000);
        assert!(plan(&scenario, &courier, &[0, 1, 2]).is_none());
    }

    #[rstest]
    fn taxi_skips_return_leg(scenario: Scenario) {
        let looping = Courier::new(1, 1, 3, 20_000);
        let taxi = looping.clone().with_taxi(true);
        let round = plan(&scenario, &looping, &[0]).expect("feasible");
        let one_way = plan(&scenario, &taxi, &[0]).expect("feasible");
        assert_eq!(round.distance(), 2_000);
        assert_eq!(one_way.distance(), 1_000);
        assert!(!one_way.is_loop());
    }

    #[rstest]
    fn enforces_max_distance(scenario: Scenario) {
        let courier = Courier::new(1, 1, 3, 20_000).with_max_distance(2_500);
        assert!(plan(&scenario, &courier, &[0]).is_some());
        assert!(plan(&scenario, &courier, &[0, 1]).is_none());
    }

    #[rstest]
    fn rejects_routes_overlapping_lunch(scenario: Scenario) {
        let courier =
            Courier::new(1, 1, 3, 20_000).with_lunch_window(TimeWindow { from: 500, to: 900 });
        assert!(plan(&scenario, &courier, &[0]).is_some());
        assert!(plan(&scenario, &courier, &[0, 1]).is_none());
    }

    #[rstest]
    fn departure_honours_delay_shift_and_opening_hours() {
        let shop = Shop::new(1, Coord { x: 0.0, y: 0.0 })
            .with_work_hours(TimeWindow { from: 500, to: 5_000 });
        let courier = Courier::new(1, 1, 3, 20_000)
            .with_time_costs(0, 90, 30)
            .with_work_window(TimeWindow { from: 100, to: 10_000 });
        assert_eq!(departure_time(&shop, &courier, 0), 590);
        assert_eq!(departure_time(&shop, &courier, 1_000), 1_120);
    }

    #[rstest]
    fn rejects_repeated_stops(scenario: Scenario) {
        let courier = Courier::new(1, 1, 3, 20_000);
        assert!(plan(&scenario, &courier, &[0, 0]).is_none());
    }
}
