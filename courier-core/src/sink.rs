//! Result sinks receiving accepted deliveries and rejected orders.

use thiserror::Error;

use crate::{Delivery, OrderId};

/// An order the dispatch cycle could not place, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RejectedOrder {
    /// Rejected order.
    pub order_id: OrderId,
    /// Short machine-readable reason.
    pub reason: String,
}

/// Errors raised while writing results.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("failed to write dispatch results: {0}")]
    Io(#[source] std::io::Error),
    /// Results could not be encoded.
    #[error("failed to encode dispatch results: {message}")]
    Encode {
        /// Human-readable failure description.
        message: String,
    },
}

/// Receives the results of a dispatch cycle.
pub trait DeliverySink {
    /// Record accepted candidate deliveries.
    fn accept(&mut self, deliveries: &[Delivery]) -> Result<(), SinkError>;

    /// Record orders that could not be placed.
    fn reject(&mut self, orders: &[RejectedOrder]) -> Result<(), SinkError>;

    /// Flush buffered results.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
