//! Concrete collaborators for the courier dispatch engine.
//!
//! Responsibilities:
//! - Load dispatch snapshots from JSON documents.
//! - Estimate travel matrices without a routing backend.
//! - Evaluate order subsets by permutation search.
//! - Pick order clouds by nearest-neighbour growth.
//! - Write candidate pools and rejected orders as JSON.
//!
//! Boundaries:
//! - Do not encode scheduling rules (live in `courier-solver`).
//! - Route feasibility and cost always come from
//!   [`courier_core::RoutePlanner`].
//!
//! Invariants:
//! - Every type here is `Send + Sync` where its trait requires it.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod cloud;
pub mod evaluator;
pub mod report;
pub mod routing;
pub mod snapshot;

pub use cloud::NearestCloudFinder;
pub use evaluator::{DEFAULT_PERMUTATION_LIMIT, PermutationEvaluator};
pub use report::{DispatchReport, JsonReportSink};
pub use routing::{
    DEFAULT_DETOUR_FACTOR, DEFAULT_SPEED_KMH, GreatCircleMatrixProvider, RoutingConfig,
};
pub use snapshot::{JsonSnapshotSource, parse_snapshot, read_snapshot};
