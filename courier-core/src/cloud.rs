//! Cloud finding: choosing a compact sub-pool of orders to plan over.

use thiserror::Error;

use crate::{DistanceMatrix, Order};

/// Parameters for selecting a cloud of nearby orders.
#[derive(Debug, Clone, Copy)]
pub struct CloudRequest<'a> {
    /// Pool to select from.
    pub orders: &'a [Order],
    /// Desired number of orders in the cloud.
    pub target_size: usize,
    /// Maximum distance in metres between a cloud member and its nearest
    /// neighbour already in the cloud.
    pub distance_bound: u32,
    /// Maximum spread, in minutes, between delivery window ends in the cloud.
    pub time_bound_minutes: u32,
    /// Pairwise straight-line distances between the pool's orders.
    pub distances: &'a DistanceMatrix,
}

/// Errors returned by [`CloudFinder::find_cloud`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    /// The pool held no orders.
    #[error("cannot build a cloud from an empty pool")]
    EmptyInput,
    /// Selection failed for another reason.
    #[error("cloud selection failed: {message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Selects at most `target_size` indices into the request's pool.
///
/// Callers validate the returned indices and fall back to a prefix of the
/// pool when the result is unusable.
pub trait CloudFinder: Send + Sync {
    /// Select a cloud for `request`.
    fn find_cloud(&self, request: &CloudRequest<'_>) -> Result<Vec<usize>, CloudError>;
}
