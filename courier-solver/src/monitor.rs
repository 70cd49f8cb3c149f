//! Observers of the admission window.

use log::{debug, info, warn};

use crate::{context::WorkContext, report::ContextOutcome};

/// Observes contexts entering and leaving the admission window.
///
/// Hooks run on the scheduling thread, between admissions.
pub trait ScheduleMonitor {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// `context` entered window slot `slot`.
    fn on_submit(&mut self, slot: usize, context: &WorkContext);

    /// The context in `slot` finished with `outcome`.
    fn on_complete(&mut self, slot: usize, outcome: &ContextOutcome);
}

impl std::fmt::Debug for dyn ScheduleMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScheduleMonitor({})", self.name())
    }
}

/// Monitor that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl ScheduleMonitor for NoopMonitor {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn on_submit(&mut self, _slot: usize, _context: &WorkContext) {}

    fn on_complete(&mut self, _slot: usize, _outcome: &ContextOutcome) {}
}

/// Monitor that logs every event through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMonitor;

impl ScheduleMonitor for LogMonitor {
    fn name(&self) -> &'static str {
        "log"
    }

    fn on_submit(&mut self, slot: usize, context: &WorkContext) {
        debug!(
            "slot {slot}: shop {} vehicle {} with {} orders",
            context.shop.id,
            context.vehicle_type(),
            context.order_count()
        );
    }

    fn on_complete(&mut self, slot: usize, outcome: &ContextOutcome) {
        match &outcome.result {
            Ok(count) => info!(
                "slot {slot}: shop {} vehicle {} produced {count} candidates in {:?}",
                outcome.shop_id, outcome.vehicle_type, outcome.elapsed
            ),
            Err(err) => warn!(
                "slot {slot}: shop {} vehicle {} failed with status {}: {err}",
                outcome.shop_id,
                outcome.vehicle_type,
                err.status_code()
            ),
        }
    }
}
