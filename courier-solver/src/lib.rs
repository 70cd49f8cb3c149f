//! Parallel route-construction scheduler for courier dispatch.
//!
//! For every (shop, vehicle type) pair the solver builds a pool of candidate
//! deliveries:
//!
//! - [`keys`] enumerates order subsets as packed, sortable [`SubsetKey`]s.
//! - [`PartitionedSolver`] evaluates every subset up to a depth, split across
//!   the [`WorkerPool`] and merged by key position.
//! - [`ContextSolver`] searches the whole pool directly when the key budget
//!   allows, and otherwise refines cloud by cloud, dilating shallow routes up
//!   to capacity with the [`DilationEngine`].
//! - [`dedup`] keeps the cheapest candidate per vehicle type and order set.
//! - [`Scheduler`] runs the contexts of a dispatch cycle with a bounded number
//!   in flight.
//!
//! Route feasibility and cost, travel matrices and cloud selection are
//! supplied by the collaborators defined in `courier-core`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod context;
pub mod dedup;
pub mod dilation;
pub mod error;
pub mod keys;
pub mod monitor;
pub mod partition;
pub mod pool;
pub mod problem;
pub mod refine;
pub mod report;
pub mod scheduler;

pub use config::{ConsumptionPolicy, SolverConfig};
pub use context::{WorkContext, build_contexts};
pub use dedup::{CanonicalKey, dedup};
pub use dilation::DilationEngine;
pub use error::{STAGE_FACTOR, SolveError, Stage};
pub use keys::{
    MAX_LEVEL, MAX_ORDERS, SubsetKey, enumerate_keys, key_count, level_for, max_orders_for_level,
};
pub use monitor::{LogMonitor, NoopMonitor, ScheduleMonitor};
pub use partition::{PartialResult, PartitionedSolver, merge_by_position};
pub use pool::{
    AdmissionEvent, Completion, CompletionQueue, CompletionSignal, PoolError, WorkerPanic,
    WorkerPool,
};
pub use problem::Problem;
pub use refine::{ContextSolver, consumed_orders};
pub use report::{ContextOutcome, ScheduleReport};
pub use scheduler::{Collaborators, Scheduler};
