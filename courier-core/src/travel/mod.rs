//! Travel distances and durations between orders and their shop.
//!
//! The `TravelMatrixProvider` trait abstracts the retrieval of a directed
//! travel matrix for a shop and a slice of orders. Callers receive a
//! [`TravelMatrix`] indexed `0..n` for the orders plus index `n` for the shop.
//!
//! [`DistanceMatrix`] holds plain great-circle distances between orders and is
//! used to pick clouds before any matrix is fetched.

mod distance;
mod error;
mod matrix;
mod provider;

pub use distance::{DistanceMatrix, haversine_metres};
pub use error::TravelMatrixError;
pub use matrix::{Leg, TravelMatrix};
pub use provider::TravelMatrixProvider;
