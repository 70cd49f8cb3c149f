//! Solver tunables.

use crate::keys::{MAX_LEVEL, max_orders_for_level};

/// Which orders a refinement pass removes from the remaining pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ConsumptionPolicy {
    /// Remove every order of the attempted subset, covered or not.
    #[default]
    Attempted,
    /// Remove only orders that appear in a candidate; when nothing was
    /// covered, remove the attempted subset instead.
    Covered,
}

/// Tunables for every solver stage.
///
/// # Examples
///
/// ```
/// use courier_solver::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.start_params(3), (3, 133));
/// assert_eq!(config.start_params(6), (4, 45));
/// assert_eq!(config.start_params(12), (4, 30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SolverConfig {
    /// Largest key count searched exhaustively in one pass.
    pub key_budget: u64,
    /// Keys assigned to each partition worker.
    pub keys_per_worker: usize,
    /// Upper bound on partition workers per exhaustive solve.
    pub max_partition_workers: usize,
    /// Route-times-pool work units assigned to each dilation worker.
    pub dilation_work_per_worker: usize,
    /// Upper bound on dilation workers per step.
    pub max_dilation_workers: usize,
    /// Lower bound on contexts in flight.
    pub min_in_flight: usize,
    /// Upper bound on contexts in flight.
    pub max_in_flight: usize,
    /// Contexts in flight per logical core before clamping.
    pub in_flight_per_core: usize,
    /// Logical core count; detected when `None`.
    pub logical_cores: Option<usize>,
    /// Cloud sizes for couriers of capacity 5, 6, 7 and 8 or more.
    pub cloud_order_counts: [usize; 4],
    /// Neighbour distance bound passed to the cloud finder, in metres.
    pub cloud_distance_bound: u32,
    /// Window-end spread bound passed to the cloud finder, in minutes.
    pub cloud_time_bound_minutes: u32,
    /// Orders removed from the pool after each refinement pass.
    pub consumption: ConsumptionPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            key_budget: 400_000,
            keys_per_worker: 1_000,
            max_partition_workers: 8,
            dilation_work_per_worker: 100_000,
            max_dilation_workers: 8,
            min_in_flight: 8,
            max_in_flight: 16,
            in_flight_per_core: 2,
            logical_cores: None,
            cloud_order_counts: [55, 45, 35, 30],
            cloud_distance_bound: 3_000,
            cloud_time_bound_minutes: 60,
            consumption: ConsumptionPolicy::Attempted,
        }
    }
}

impl SolverConfig {
    /// Starting depth and cloud size for a courier of `capacity`.
    ///
    /// Small couriers search at full capacity over the largest pool the key
    /// budget allows; larger ones start at depth 4 over a fixed cloud size.
    #[must_use]
    pub fn start_params(&self, capacity: usize) -> (usize, usize) {
        let capacity = capacity.min(MAX_LEVEL);
        if capacity <= 4 {
            return (capacity, max_orders_for_level(capacity, self.key_budget));
        }
        let slot = capacity.saturating_sub(5).min(3);
        let orders = self.cloud_order_counts.get(slot).copied().unwrap_or(30);
        (4, orders.max(1))
    }

    /// Number of contexts to keep in flight for `contexts` pending contexts.
    #[must_use]
    pub fn in_flight_limit(&self, contexts: usize) -> usize {
        let cores = self.logical_cores.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        });
        let lower = self.min_in_flight.max(1);
        let upper = self.max_in_flight.max(lower);
        cores
            .saturating_mul(self.in_flight_per_core)
            .clamp(lower, upper)
            .min(contexts)
    }

    /// Number of workers for an exhaustive solve over `key_count` keys.
    #[must_use]
    pub fn partition_workers(&self, key_count: usize) -> usize {
        key_count
            .div_ceil(self.keys_per_worker.max(1))
            .clamp(1, self.max_partition_workers.max(1))
    }

    /// Number of workers for a dilation step over `work` units.
    #[must_use]
    pub fn dilation_workers(&self, work: usize) -> usize {
        work.div_ceil(self.dilation_work_per_worker.max(1))
            .clamp(1, self.max_dilation_workers.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 8)]
    #[case(4, 8)]
    #[case(6, 12)]
    #[case(32, 16)]
    fn in_flight_clamps_to_bounds(#[case] cores: usize, #[case] expected: usize) {
        let config = SolverConfig {
            logical_cores: Some(cores),
            ..SolverConfig::default()
        };
        assert_eq!(config.in_flight_limit(100), expected);
        assert_eq!(config.in_flight_limit(3), 3);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(1_000, 1)]
    #[case(1_001, 2)]
    #[case(1_000_000, 8)]
    fn partition_workers_follow_key_count(#[case] keys: usize, #[case] expected: usize) {
        assert_eq!(SolverConfig::default().partition_workers(keys), expected);
    }

    #[rstest]
    #[case(5, (4, 55))]
    #[case(7, (4, 35))]
    #[case(8, (4, 30))]
    #[case(1, (1, 256))]
    #[case(4, (4, 56))]
    fn start_params_follow_capacity(#[case] capacity: usize, #[case] expected: (usize, usize)) {
        assert_eq!(SolverConfig::default().start_params(capacity), expected);
    }
}
