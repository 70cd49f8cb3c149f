//! Exhaustive partitioned solver.
//!
//! Every subset of the pool up to the requested depth is handed to the route
//! evaluator. The sorted key array is cut into contiguous slices, one per
//! worker; each worker returns one optional candidate per key, aligned with
//! its slice, and the slices are merged back by key position.

use courier_core::{Delivery, RouteEvaluator};
use log::{debug, warn};

use crate::{
    SolveError, SolverConfig, Stage,
    keys::{MAX_LEVEL, MAX_ORDERS, SubsetKey, enumerate_keys},
    pool::WorkerPool,
    problem::Problem,
};

/// Per-key candidates computed by one worker.
#[derive(Debug, Clone)]
pub struct PartialResult {
    /// Position of the worker's first key in the full key array.
    pub offset: usize,
    /// One optional candidate per key, starting at `offset`.
    pub candidates: Vec<Option<Delivery>>,
}

/// Merge worker output by key position, keeping the cheapest candidate when
/// several workers produced one for the same position.
///
/// Positions beyond `len` are ignored.
#[must_use]
pub fn merge_by_position(len: usize, partials: Vec<PartialResult>) -> Vec<Option<Delivery>> {
    let mut merged: Vec<Option<Delivery>> = std::iter::repeat_with(|| None).take(len).collect();
    for partial in partials {
        let slots = merged.iter_mut().skip(partial.offset);
        for (slot, candidate) in slots.zip(partial.candidates) {
            let Some(candidate) = candidate else {
                continue;
            };
            match slot {
                Some(existing) if existing.cost() <= candidate.cost() => {}
                _ => *slot = Some(candidate),
            }
        }
    }
    merged
}

/// Runs exhaustive searches on the shared pool.
#[derive(Debug, Clone, Copy)]
pub struct PartitionedSolver<'a, E: ?Sized> {
    pool: &'a WorkerPool,
    config: &'a SolverConfig,
    evaluator: &'a E,
}

impl<'a, E> PartitionedSolver<'a, E>
where
    E: RouteEvaluator + ?Sized,
{
    /// Construct a solver over shared resources.
    #[must_use]
    pub const fn new(pool: &'a WorkerPool, config: &'a SolverConfig, evaluator: &'a E) -> Self {
        Self {
            pool,
            config,
            evaluator,
        }
    }

    /// Evaluate every subset of `problem.orders` with 1 to `level` orders.
    ///
    /// Returns the feasible candidates in key order. When any worker fails,
    /// the output of the others is discarded and the first failure is
    /// returned, tagged with the worker's position.
    pub fn solve(&self, problem: &Problem<'_>, level: usize) -> Result<Vec<Delivery>, SolveError> {
        let order_count = problem.orders.len();
        if order_count == 0 || order_count > MAX_ORDERS {
            return Err(SolveError::invalid(format!(
                "exhaustive search needs 1 to {MAX_ORDERS} orders, got {order_count}"
            )));
        }
        if level == 0 || level > MAX_LEVEL {
            return Err(SolveError::invalid(format!(
                "search depth must be 1 to {MAX_LEVEL}, got {level}"
            )));
        }
        problem.matrix.ensure_covers(order_count)?;

        let keys = enumerate_keys(order_count, level);
        let workers = self.config.partition_workers(keys.len());
        debug!(
            "exhaustive search over {order_count} orders at depth {level}: {} keys, {workers} workers",
            keys.len()
        );

        let merged = self.solve_partitions(problem, &keys, workers)?;
        Ok(merged.into_iter().flatten().collect())
    }

    fn solve_partitions(
        &self,
        problem: &Problem<'_>,
        keys: &[SubsetKey],
        workers: usize,
    ) -> Result<Vec<Option<Delivery>>, SolveError> {
        let chunk = keys.len().div_ceil(workers).max(1);
        let tasks: Vec<_> = keys
            .chunks(chunk)
            .map(|slice| move || self.evaluate_slice(problem, slice))
            .collect();

        let mut partials = Vec::with_capacity(tasks.len());
        let mut failure = None;
        for (worker, outcome) in self.pool.join_all(tasks).into_iter().enumerate() {
            let stage = Stage::Partition { worker };
            match outcome {
                Ok(Ok(candidates)) => partials.push(PartialResult {
                    offset: worker.saturating_mul(chunk),
                    candidates,
                }),
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
        if let Some(err) = failure {
            debug!(
                "discarding output of {} partition workers after a failure",
                partials.len()
            );
            return Err(err);
        }
        Ok(merge_by_position(keys.len(), partials))
    }

    fn evaluate_slice(
        &self,
        problem: &Problem<'_>,
        keys: &[SubsetKey],
    ) -> Result<Vec<Option<Delivery>>, SolveError> {
        let capacity = problem.capacity();
        let mut subset = Vec::with_capacity(MAX_LEVEL);
        keys.iter()
            .map(|key| {
                subset.clear();
                subset.extend(key.indices());
                let candidate = self.evaluator.evaluate(&problem.request(&subset))?;
                Ok(candidate.filter(|delivery| {
                    let fits = !delivery.is_empty() && delivery.len() <= capacity;
                    if !fits {
                        warn!(
                            "dropping candidate for {key} with {} stops, courier capacity {capacity}",
                            delivery.len()
                        );
                    }
                    fits
                }))
            })
            .collect()
    }
}
