//! Solving one work context: directly when the whole pool fits the key
//! budget at full capacity, otherwise by cloud-bounded refinement.
//!
//! A refinement pass picks a bounded cloud of the remaining orders, searches
//! it exhaustively at a reduced depth, dilates the results up to capacity and
//! removes the consumed orders from the pool. Passes repeat until the pool is
//! empty or small enough to solve directly.

use std::collections::HashSet;

use courier_core::{
    CloudFinder, CloudRequest, Delivery, DistanceMatrix, Order, OrderId, RouteEvaluator,
    TravelMatrixProvider,
};
use log::{debug, warn};

use crate::{
    ConsumptionPolicy, SolveError, SolverConfig, Stage,
    context::WorkContext,
    dedup::dedup,
    dilation::DilationEngine,
    keys::level_for,
    partition::PartitionedSolver,
    pool::WorkerPool,
    problem::Problem,
};

/// Orders a pass removes from the pool under `policy`.
///
/// `attempted` is the subset the pass searched; `produced` are the candidates
/// it returned.
pub fn consumed_orders<'d>(
    policy: ConsumptionPolicy,
    attempted: &[Order],
    produced: impl IntoIterator<Item = &'d Delivery>,
) -> HashSet<OrderId> {
    let attempted_ids = || attempted.iter().map(|order| order.id).collect();
    match policy {
        ConsumptionPolicy::Attempted => attempted_ids(),
        ConsumptionPolicy::Covered => {
            let covered: HashSet<OrderId> = produced
                .into_iter()
                .flat_map(|delivery| delivery.order_ids())
                .collect();
            if covered.is_empty() {
                attempted_ids()
            } else {
                covered
            }
        }
    }
}

fn check_cloud(indices: &[usize], pool: usize, target: usize) -> Result<(), String> {
    if indices.is_empty() {
        return Err("empty cloud".to_owned());
    }
    if indices.len() > target {
        return Err(format!("{} orders exceed the target of {target}", indices.len()));
    }
    if let Some(index) = indices.iter().find(|&&index| index >= pool) {
        return Err(format!("index {index} is outside a pool of {pool}"));
    }
    let distinct: HashSet<usize> = indices.iter().copied().collect();
    if distinct.len() != indices.len() {
        return Err("duplicate indices".to_owned());
    }
    Ok(())
}

/// Solves single contexts with the shared pool and collaborators.
#[derive(Debug)]
pub struct ContextSolver<'a, M: ?Sized, E: ?Sized, C: ?Sized> {
    pool: &'a WorkerPool,
    config: &'a SolverConfig,
    matrices: &'a M,
    evaluator: &'a E,
    clouds: &'a C,
}

impl<'a, M, E, C> ContextSolver<'a, M, E, C>
where
    M: TravelMatrixProvider + ?Sized,
    E: RouteEvaluator + ?Sized,
    C: CloudFinder + ?Sized,
{
    /// Construct a solver over shared resources.
    #[must_use]
    pub const fn new(
        pool: &'a WorkerPool,
        config: &'a SolverConfig,
        matrices: &'a M,
        evaluator: &'a E,
        clouds: &'a C,
    ) -> Self {
        Self {
            pool,
            config,
            matrices,
            evaluator,
            clouds,
        }
    }

    /// Whether `order_count` orders can be searched exhaustively at full
    /// `capacity` within the key budget.
    #[must_use]
    pub fn admits_exhaustive(&self, order_count: usize, capacity: usize) -> bool {
        let depth = capacity.min(order_count);
        depth > 0 && level_for(order_count, self.config.key_budget) >= depth
    }

    /// Produce the deduplicated candidate pool for `context`.
    pub fn solve(&self, context: &WorkContext) -> Result<Vec<Delivery>, SolveError> {
        let capacity = usize::from(context.courier.capacity());
        if context.orders.is_empty() {
            return Err(SolveError::invalid("context has no orders"));
        }
        if capacity == 0 {
            return Err(SolveError::invalid(format!(
                "courier {} has no capacity",
                context.courier.id
            )));
        }
        if let Some(pair) = context
            .orders
            .windows(2)
            .find(|pair| matches!(pair, [first, second] if first.id == second.id))
            && let Some(order) = pair.first()
        {
            return Err(SolveError::invalid(format!(
                "order {} appears more than once",
                order.id
            )));
        }

        let mut deliveries = if self.admits_exhaustive(context.order_count(), capacity) {
            debug!(
                "shop {} vehicle {}: solving {} orders directly",
                context.shop.id,
                context.vehicle_type(),
                context.order_count()
            );
            let depth = capacity.min(context.order_count());
            self.solve_subset(context, &context.orders, depth)
                .map(|(base, _)| base)
                .map_err(|err| err.at(Stage::Direct))?
        } else {
            self.refine(context, capacity)?
        };
        dedup(&mut deliveries);
        Ok(deliveries)
    }

    fn refine(&self, context: &WorkContext, capacity: usize) -> Result<Vec<Delivery>, SolveError> {
        let (start_level, start_count) = self.config.start_params(capacity);
        let budget = self.config.key_budget;
        let mut remaining = context.orders.clone();
        let mut accumulated = Vec::new();
        let mut iteration = 0_usize;

        while !remaining.is_empty() {
            let stage = Stage::Refine { iteration };
            if self.admits_exhaustive(remaining.len(), capacity) {
                let depth = capacity.min(remaining.len());
                let (base, _) = self
                    .solve_subset(context, &remaining, depth)
                    .map_err(|err| err.at(stage))?;
                debug!(
                    "pass {iteration}: {} remaining orders solved directly, {} candidates",
                    remaining.len(),
                    base.len()
                );
                accumulated.extend(base);
                break;
            }

            let (subset, depth) = if remaining.len() > start_count {
                let cloud = self.pick_cloud(&remaining, start_count);
                let depth = start_level.max(level_for(cloud.len(), budget)).min(capacity);
                (cloud, depth)
            } else {
                (remaining.clone(), level_for(remaining.len(), budget).min(capacity))
            };
            if depth == 0 {
                return Err(SolveError::invalid(format!(
                    "no search depth fits {} orders within a budget of {budget} keys",
                    subset.len()
                ))
                .at(stage));
            }

            let (base, dilated) = self
                .solve_subset(context, &subset, depth)
                .map_err(|err| err.at(stage))?;
            let consumed =
                consumed_orders(self.config.consumption, &subset, base.iter().chain(&dilated));
            debug!(
                "pass {iteration}: {} of {} orders at depth {depth}, {} candidates, {} dilated, {} consumed",
                subset.len(),
                remaining.len(),
                base.len(),
                dilated.len(),
                consumed.len()
            );
            accumulated.extend(base);
            accumulated.extend(dilated);
            remaining.retain(|order| !consumed.contains(&order.id));
            iteration = iteration.saturating_add(1);
        }
        Ok(accumulated)
    }

    /// Search `orders` exhaustively at `depth`, then dilate up to capacity
    /// when `depth` falls short of it.
    ///
    /// Returns the exhaustive candidates and the dilated extensions.
    fn solve_subset(
        &self,
        context: &WorkContext,
        orders: &[Order],
        depth: usize,
    ) -> Result<(Vec<Delivery>, Vec<Delivery>), SolveError> {
        let matrix = self
            .matrices
            .select(&context.shop, orders, context.vehicle_type())
            .and_then(|matrix| matrix.ensure_covers(orders.len()).map(|()| matrix))
            .map_err(|err| SolveError::from(err).at(Stage::FetchMatrix))?;
        let problem = Problem {
            shop: &context.shop,
            courier: &context.courier,
            orders,
            matrix: &matrix,
            cycle_time: context.cycle_time,
        };
        let base = PartitionedSolver::new(self.pool, self.config, self.evaluator)
            .solve(&problem, depth)?;
        let target = problem.capacity().min(orders.len());
        let dilated = if depth < target {
            DilationEngine::new(self.pool, self.config).dilate(&problem, &base, depth, target)?
        } else {
            Vec::new()
        };
        Ok((base, dilated))
    }

    /// Cloud of at most `target` orders from `remaining`, sorted by
    /// identifier.
    ///
    /// Falls back to the first `target` remaining orders when the finder
    /// fails or returns an unusable cloud.
    fn pick_cloud(&self, remaining: &[Order], target: usize) -> Vec<Order> {
        let locations: Vec<_> = remaining.iter().map(|order| order.location).collect();
        let distances = DistanceMatrix::from_locations(&locations);
        let request = CloudRequest {
            orders: remaining,
            target_size: target,
            distance_bound: self.config.cloud_distance_bound,
            time_bound_minutes: self.config.cloud_time_bound_minutes,
            distances: &distances,
        };
        let picked = match self.clouds.find_cloud(&request) {
            Ok(indices) => match check_cloud(&indices, remaining.len(), target) {
                Ok(()) => Some(indices),
                Err(reason) => {
                    warn!("unusable cloud ({reason}); using the first {target} orders");
                    None
                }
            },
            Err(err) => {
                warn!("cloud selection failed ({err}); using the first {target} orders");
                None
            }
        };
        let mut cloud: Vec<Order> = match picked {
            Some(indices) => indices
                .iter()
                .filter_map(|&index| remaining.get(index).cloned())
                .collect(),
            None => remaining.iter().take(target).cloned().collect(),
        };
        cloud.sort_by_key(|order| order.id);
        cloud
    }
}

#[cfg(test)]
mod tests;
