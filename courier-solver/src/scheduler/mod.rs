//! Outer admission scheduler.
//!
//! Contexts are sorted largest first and run on the shared pool with a fixed
//! number in flight. Each completion frees its slot for the next unstarted
//! context and the finished context's candidates are harvested on the
//! scheduling thread. A failed context is recorded and never stops the
//! others.

use std::time::{Duration, Instant};

use courier_core::{
    CloudFinder, Delivery, DispatchSnapshot, RouteEvaluator, TravelMatrixProvider,
};
use log::{info, warn};

use crate::{
    SolveError, SolverConfig, Stage,
    context::{WorkContext, build_contexts},
    monitor::{NoopMonitor, ScheduleMonitor},
    pool::{AdmissionEvent, PoolError, WorkerPool},
    refine::ContextSolver,
    report::{ContextOutcome, ScheduleReport},
};

/// External collaborators used by every context.
#[derive(Debug, Clone, Default)]
pub struct Collaborators<M, E, C> {
    /// Travel-matrix provider.
    pub matrices: M,
    /// Route evaluator.
    pub evaluator: E,
    /// Cloud finder.
    pub clouds: C,
}

/// Runs work contexts on a bounded pool.
#[derive(Debug)]
pub struct Scheduler<M, E, C> {
    pool: WorkerPool,
    config: SolverConfig,
    collaborators: Collaborators<M, E, C>,
}

impl<M, E, C> Scheduler<M, E, C>
where
    M: TravelMatrixProvider,
    E: RouteEvaluator,
    C: CloudFinder,
{
    /// Construct a scheduler with one worker per logical core.
    pub fn new(
        collaborators: Collaborators<M, E, C>,
        config: SolverConfig,
    ) -> Result<Self, PoolError> {
        let threads = config.logical_cores.unwrap_or(0);
        Ok(Self::with_pool(collaborators, config, WorkerPool::new(threads)?))
    }

    /// Construct a scheduler on an existing pool.
    #[must_use]
    pub const fn with_pool(
        collaborators: Collaborators<M, E, C>,
        config: SolverConfig,
        pool: WorkerPool,
    ) -> Self {
        Self {
            pool,
            config,
            collaborators,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Candidate pool for a single context, computed on the calling thread
    /// with inner stages on the pool.
    pub fn solve_context(&self, context: &WorkContext) -> Result<Vec<Delivery>, SolveError> {
        ContextSolver::new(
            &self.pool,
            &self.config,
            &self.collaborators.matrices,
            &self.collaborators.evaluator,
            &self.collaborators.clouds,
        )
        .solve(context)
    }

    /// Build the contexts of `snapshot` and run them.
    #[must_use]
    pub fn schedule(&self, snapshot: &DispatchSnapshot) -> ScheduleReport {
        self.run(build_contexts(snapshot), &mut NoopMonitor)
    }

    /// Run `contexts`, largest first, keeping at most
    /// [`SolverConfig::in_flight_limit`] in flight.
    pub fn run<Mon>(&self, mut contexts: Vec<WorkContext>, monitor: &mut Mon) -> ScheduleReport
    where
        Mon: ScheduleMonitor + ?Sized,
    {
        contexts.sort_by(|a, b| b.order_count().cmp(&a.order_count()));
        let window = self.config.in_flight_limit(contexts.len());
        info!(
            "scheduling {} contexts, {window} in flight on {} workers",
            contexts.len(),
            self.pool.threads()
        );
        let started = Instant::now();

        let tasks: Vec<_> = contexts
            .iter()
            .map(|context| {
                move || {
                    let began = Instant::now();
                    let result = self.solve_context(context);
                    (result, began.elapsed())
                }
            })
            .collect();

        let mut report = ScheduleReport::default();
        self.pool.admit(tasks, window, |event| match event {
            AdmissionEvent::Submitted { slot, task } => {
                if let Some(context) = contexts.get(task) {
                    monitor.on_submit(slot, context);
                }
            }
            AdmissionEvent::Completed(completion) => {
                let Some(context) = contexts.get(completion.task) else {
                    return;
                };
                let (result, elapsed) = completion.result.unwrap_or_else(|panic| {
                    (
                        Err(SolveError::WorkerPanicked {
                            stage: Stage::Context,
                            message: panic.message,
                        }),
                        Duration::ZERO,
                    )
                });
                let outcome = harvest(&mut report.deliveries, context, result, elapsed);
                monitor.on_complete(completion.slot, &outcome);
                report.outcomes.push(outcome);
            }
        });

        info!(
            "scheduled {} contexts in {:?}: {} succeeded, {} candidates",
            report.outcomes.len(),
            started.elapsed(),
            report.succeeded(),
            report.deliveries.len()
        );
        report
    }
}

fn harvest(
    pool: &mut Vec<Delivery>,
    context: &WorkContext,
    result: Result<Vec<Delivery>, SolveError>,
    elapsed: Duration,
) -> ContextOutcome {
    let result = match result {
        Ok(deliveries) => {
            let count = deliveries.len();
            pool.extend(deliveries);
            Ok(count)
        }
        Err(err) => {
            warn!(
                "shop {} vehicle {}: context failed with status {}: {err}",
                context.shop.id,
                context.vehicle_type(),
                err.status_code()
            );
            Err(err)
        }
    };
    ContextOutcome::new(context, result, elapsed)
}
