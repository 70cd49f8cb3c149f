//! Route dilation: greedy insertion from a shallow depth up to capacity.
//!
//! Each step extends every route by one order. Every order not yet on the
//! route is tried at every position; cheap checks on weight, distance and
//! the backward time reserve of the route reject most insertions before the
//! planner computes the exact timing. Only the cheapest legal extension of a
//! route survives, and routes without one are dropped.

use std::collections::HashMap;

use courier_core::{Delivery, Leg, Order, OrderId, RoutePlanner, Timestamp, TravelMatrix};
use log::debug;

use crate::{SolveError, SolverConfig, Stage, pool::WorkerPool, problem::Problem};

/// Extends routes on the shared pool.
#[derive(Debug, Clone, Copy)]
pub struct DilationEngine<'a> {
    pool: &'a WorkerPool,
    config: &'a SolverConfig,
}

impl<'a> DilationEngine<'a> {
    /// Construct an engine over shared resources.
    #[must_use]
    pub const fn new(pool: &'a WorkerPool, config: &'a SolverConfig) -> Self {
        Self { pool, config }
    }

    /// Extend the routes of exactly `from_level` stops one order at a time up
    /// to `to_level` stops.
    ///
    /// `to_level` is capped at the courier capacity and the pool size. The
    /// result holds the surviving extensions of every step, shortest first;
    /// the input routes are not repeated.
    pub fn dilate(
        &self,
        problem: &Problem<'_>,
        routes: &[Delivery],
        from_level: usize,
        to_level: usize,
    ) -> Result<Vec<Delivery>, SolveError> {
        let target = to_level
            .min(problem.capacity())
            .min(problem.orders.len());
        if from_level == 0 || target <= from_level {
            return Ok(Vec::new());
        }
        let extender = Extender {
            planner: problem.planner()?,
            index: problem.index_map(),
        };

        let mut current: Vec<Delivery> = routes
            .iter()
            .filter(|route| route.len() == from_level)
            .cloned()
            .collect();
        let mut produced = Vec::new();
        for depth in from_level..target {
            if current.is_empty() {
                break;
            }
            let extended = self.step(&extender, &current)?;
            debug!(
                "dilation {depth} -> {}: {} of {} routes extended",
                depth.saturating_add(1),
                extended.len(),
                current.len()
            );
            produced.extend(extended.iter().cloned());
            current = extended;
        }
        Ok(produced)
    }

    fn step(
        &self,
        extender: &Extender<'_>,
        routes: &[Delivery],
    ) -> Result<Vec<Delivery>, SolveError> {
        let pool_len = extender.planner.orders().len();
        let workers = self
            .config
            .dilation_workers(routes.len().saturating_mul(pool_len));
        let tasks: Vec<_> = (0..workers)
            .map(|start| move || extender.extend_all(routes.iter().skip(start).step_by(workers)))
            .collect();
        let mut extended = Vec::with_capacity(routes.len());
        let mut failure = None;
        for (worker, outcome) in self.pool.join_all(tasks).into_iter().enumerate() {
            let stage = Stage::Dilation { worker };
            match outcome {
                Ok(Ok(batch)) => extended.extend(batch),
                Ok(Err(err)) => {
                    if failure.is_none() {
                        failure = Some(err.at(stage));
                    }
                }
                Err(panic) => {
                    if failure.is_none() {
                        failure = Some(SolveError::WorkerPanicked {
                            stage,
                            message: panic.message,
                        });
                    }
                }
            }
        }
        match failure {
            Some(err) => {
                debug!(
                    "discarding {} extended routes after a dilation failure",
                    extended.len()
                );
                Err(err)
            }
            None => Ok(extended),
        }
    }
}

/// Stop timings of a base route.
#[derive(Debug)]
struct RouteTiming {
    delivered: Vec<Timestamp>,
    /// Largest delay each stop can absorb without breaking any window from
    /// that stop onwards.
    reserve: Vec<i64>,
}

#[derive(Debug)]
struct Extender<'p> {
    planner: RoutePlanner<'p>,
    index: HashMap<OrderId, usize>,
}

impl Extender<'_> {
    fn orders(&self) -> &[Order] {
        self.planner.orders()
    }

    fn matrix(&self) -> &TravelMatrix {
        self.planner.matrix()
    }

    fn hand_in(&self) -> i64 {
        i64::from(self.planner.courier().hand_in_time)
    }

    fn extend_all<'r>(
        &self,
        routes: impl Iterator<Item = &'r Delivery>,
    ) -> Result<Vec<Delivery>, SolveError> {
        routes
            .filter_map(|route| self.extend(route).transpose())
            .collect()
    }

    fn sequence_of(&self, route: &Delivery) -> Result<Vec<usize>, SolveError> {
        route
            .order_ids()
            .map(|id| {
                self.index.get(&id).copied().ok_or_else(|| {
                    SolveError::invalid(format!("order {id} is not in the dilation pool"))
                })
            })
            .collect()
    }

    fn timing(&self, route: &Delivery, sequence: &[usize]) -> RouteTiming {
        let delivered: Vec<Timestamp> =
            route.stops().iter().map(|stop| stop.delivered_at).collect();
        let mut reserve = vec![0_i64; delivered.len()];
        let mut previous_departure = route.start();
        let mut waits = Vec::with_capacity(delivered.len());
        for (stop, &at) in route.stops().iter().zip(&delivered) {
            let arrival = previous_departure.saturating_add(i64::from(stop.leg.duration));
            waits.push(at.saturating_sub(arrival).max(0));
            previous_departure = at.saturating_add(self.hand_in());
        }
        let mut downstream: Option<i64> = None;
        for (position, slot) in reserve.iter_mut().enumerate().rev() {
            let closes = sequence
                .get(position)
                .and_then(|&index| self.orders().get(index))
                .map_or(Timestamp::MAX, |order| order.window.to);
            let at = delivered.get(position).copied().unwrap_or_default();
            let own = closes.saturating_sub(at);
            let bound = downstream.map_or(own, |next| own.min(next));
            *slot = bound;
            let wait = waits.get(position).copied().unwrap_or_default();
            downstream = Some(wait.saturating_add(bound));
        }
        RouteTiming { delivered, reserve }
    }

    fn extend(&self, route: &Delivery) -> Result<Option<Delivery>, SolveError> {
        let sequence = self.sequence_of(route)?;
        let timing = self.timing(route, &sequence);
        let courier = self.planner.courier();
        let mut best: Option<Delivery> = None;

        for (candidate, order) in self.orders().iter().enumerate() {
            if sequence.contains(&candidate) || order.weight > courier.max_order_weight {
                continue;
            }
            if route.weight().saturating_add(order.weight) > courier.max_weight {
                continue;
            }
            for position in 0..=sequence.len() {
                if !self.admits(route, &sequence, &timing, candidate, position) {
                    continue;
                }
                let mut extended = sequence.clone();
                extended.insert(position, candidate);
                let Some(delivery) = self.planner.plan(&extended) else {
                    continue;
                };
                if best.as_ref().is_none_or(|current| delivery.cost() < current.cost()) {
                    best = Some(delivery);
                }
            }
        }
        Ok(best)
    }

    /// Necessary conditions for inserting `candidate` before `position`.
    fn admits(
        &self,
        route: &Delivery,
        sequence: &[usize],
        timing: &RouteTiming,
        candidate: usize,
        position: usize,
    ) -> bool {
        let matrix = self.matrix();
        let shop = matrix.shop_node();
        let Some(order) = self.orders().get(candidate) else {
            return false;
        };
        let (previous, clock) = match position.checked_sub(1) {
            None => (shop, route.start()),
            Some(before) => match (sequence.get(before), timing.delivered.get(before)) {
                (Some(&node), Some(&at)) => (node, at.saturating_add(self.hand_in())),
                _ => return false,
            },
        };
        let Some(leg_in) = matrix.leg(previous, candidate) else {
            return false;
        };
        let served = clock
            .saturating_add(i64::from(leg_in.duration))
            .max(order.window.from);
        if served > order.window.to {
            return false;
        }

        let next = sequence.get(position).copied();
        let leg_out = match next {
            Some(node) => matrix.leg(candidate, node),
            None if route.is_loop() => matrix.leg(candidate, shop),
            None => Some(Leg::default()),
        };
        let Some(leg_out) = leg_out else {
            return false;
        };

        if let Some(node) = next {
            let (Some(next_order), Some(&was), Some(&slack)) = (
                self.orders().get(node),
                timing.delivered.get(position),
                timing.reserve.get(position),
            ) else {
                return false;
            };
            let now = served
                .saturating_add(self.hand_in())
                .saturating_add(i64::from(leg_out.duration))
                .max(next_order.window.from);
            if now.saturating_sub(was) > slack {
                return false;
            }
        }

        match self.planner.courier().max_distance {
            None => true,
            Some(limit) => {
                let replaced = match next {
                    Some(_) => route
                        .stops()
                        .get(position)
                        .map_or(0, |stop| stop.leg.distance),
                    None => route.return_leg().map_or(0, |leg| leg.distance),
                };
                let distance = route
                    .distance()
                    .saturating_sub(replaced)
                    .saturating_add(leg_in.distance)
                    .saturating_add(leg_out.distance);
                distance <= limit
            }
        }
    }
}
