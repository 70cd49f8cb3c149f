use thiserror::Error;

/// Errors from [`crate::travel::TravelMatrixProvider::select`] and matrix
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelMatrixError {
    /// No orders were provided.
    ///
    /// A matrix always needs at least one order besides the shop. Callers
    /// should pre-filter input to avoid this condition.
    #[error("at least one order is required")]
    EmptyInput,
    /// The matrix does not match the number of orders it was requested for.
    #[error("travel matrix covers {found} nodes but {expected} were expected")]
    DimensionMismatch {
        /// Number of nodes (orders plus shop) required.
        expected: usize,
        /// Number of nodes actually present.
        found: usize,
    },
    /// The routing backend reported an error.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Backend-specific error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}
