//! Results harvested by the scheduler.

use std::{collections::HashSet, time::Duration};

use courier_core::{CourierId, Delivery, OrderId, RejectedOrder, ShopId, VehicleTypeId};

use crate::{SolveError, context::WorkContext};

/// How one work context ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOutcome {
    /// Shop of the context.
    pub shop_id: ShopId,
    /// Vehicle type of the context.
    pub vehicle_type: VehicleTypeId,
    /// Representative courier.
    pub courier_id: CourierId,
    /// Eligible orders of the context.
    pub order_ids: Vec<OrderId>,
    /// Number of candidates harvested, or the failure.
    pub result: Result<usize, SolveError>,
    /// Wall time spent solving the context.
    pub elapsed: Duration,
}

impl ContextOutcome {
    /// Outcome of `context` with `result`.
    #[must_use]
    pub fn new(
        context: &WorkContext,
        result: Result<usize, SolveError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            shop_id: context.shop.id,
            vehicle_type: context.vehicle_type(),
            courier_id: context.courier.id,
            order_ids: context.order_ids(),
            result,
            elapsed,
        }
    }

    /// Whether the context produced a candidate pool.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Candidate pool of a scheduling run and the outcome of each context, in
/// completion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleReport {
    /// Candidates from every successful context.
    pub deliveries: Vec<Delivery>,
    /// One outcome per context.
    pub outcomes: Vec<ContextOutcome>,
}

impl ScheduleReport {
    /// Outcomes of contexts that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ContextOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Number of contexts that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    /// Orders of failed contexts that no harvested candidate covers, with the
    /// failure as the reason.
    ///
    /// An order listed by several failed contexts is rejected once, with the
    /// reason of the first failure.
    #[must_use]
    pub fn rejections(&self) -> Vec<RejectedOrder> {
        let mut settled: HashSet<OrderId> =
            self.deliveries.iter().flat_map(Delivery::order_ids).collect();
        let mut rejected = Vec::new();
        for outcome in self.failures() {
            let Err(err) = &outcome.result else {
                continue;
            };
            for &order_id in &outcome.order_ids {
                if settled.insert(order_id) {
                    rejected.push(RejectedOrder {
                        order_id,
                        reason: format!(
                            "shop {} vehicle type {}: {err}",
                            outcome.shop_id, outcome.vehicle_type
                        ),
                    });
                }
            }
        }
        rejected
    }
}
