//! Facade crate for the courier dispatch engine.
//!
//! This crate re-exports the core domain types and exposes the scheduler and
//! the JSON/estimation collaborators behind feature flags.

#![forbid(unsafe_code)]

pub use courier_core::{
    CloudFinder, Courier, Delivery, DeliverySink, DispatchSnapshot, DispatchSource, Order,
    RejectedOrder, RouteEvaluator, RoutePlanner, Shop, TimeWindow, TravelMatrix,
    TravelMatrixProvider,
};

#[cfg(feature = "solver")]
pub use courier_solver::{
    Collaborators, ContextOutcome, ScheduleReport, Scheduler, SolveError, SolverConfig, Stage,
    WorkContext,
};

#[cfg(feature = "data")]
pub use courier_data::{
    GreatCircleMatrixProvider, JsonReportSink, JsonSnapshotSource, NearestCloudFinder,
    PermutationEvaluator,
};
