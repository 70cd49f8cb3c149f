//! Route evaluation: turning an unordered subset into its best delivery.

use thiserror::Error;

use crate::{Courier, Delivery, Order, Shop, Timestamp, TravelMatrix, TravelMatrixError};

/// One evaluation request: a subset of an order pool for a given courier.
///
/// `subset` holds indices into `orders`; the travel matrix uses the same
/// indices with the shop as its final node.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    /// Shop the route starts from.
    pub shop: &'a Shop,
    /// Courier the route is built for.
    pub courier: &'a Courier,
    /// Pool the subset indexes into.
    pub orders: &'a [Order],
    /// Indices of the orders to visit, in no particular order.
    pub subset: &'a [usize],
    /// Travel matrix over `orders` and the shop.
    pub matrix: &'a TravelMatrix,
    /// Dispatch cycle start.
    pub cycle_time: Timestamp,
}

/// Errors returned by [`RouteEvaluator::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The subset referenced an order outside the pool.
    #[error("subset index {index} is outside an order pool of {len}")]
    InvalidIndex {
        /// Offending index.
        index: usize,
        /// Pool size.
        len: usize,
    },
    /// The travel matrix did not match the pool.
    #[error(transparent)]
    Matrix(#[from] TravelMatrixError),
    /// Evaluation failed for another reason.
    #[error("route evaluation failed: {message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Computes the best feasible visiting order for a subset of orders.
///
/// Returns `Ok(None)` when no ordering of the subset is feasible. Evaluators
/// are shared between worker threads and must be `Send + Sync`.
///
/// # Examples
///
/// ```
/// use courier_core::{Delivery, EvaluationError, RouteEvaluator, RouteRequest};
///
/// struct NeverFeasible;
///
/// impl RouteEvaluator for NeverFeasible {
///     fn evaluate(&self, _request: &RouteRequest<'_>) -> Result<Option<Delivery>, EvaluationError> {
///         Ok(None)
///     }
/// }
/// ```
pub trait RouteEvaluator: Send + Sync {
    /// Evaluate `request`, returning the cheapest feasible delivery if any.
    fn evaluate(&self, request: &RouteRequest<'_>) -> Result<Option<Delivery>, EvaluationError>;
}
