//! Staged solver errors.
//!
//! Every failure carries the chain of stages it passed through on its way
//! out, outermost first, replacing the composed integer status codes legacy
//! dispatch tooling expects. [`SolveError::status_code`] still renders that
//! integer form for callers that need it.

use std::fmt;

use courier_core::{EvaluationError, TravelMatrixError};
use thiserror::Error;

/// Multiplier applied per wrapping stage in [`SolveError::status_code`].
pub const STAGE_FACTOR: u64 = 100_000;

/// A step of the solver at which an error was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetching the travel matrix for a set of orders.
    FetchMatrix,
    /// One worker of the exhaustive partitioned solver.
    Partition {
        /// Worker position within the partition.
        worker: usize,
    },
    /// One worker of a dilation step.
    Dilation {
        /// Worker position within the step.
        worker: usize,
    },
    /// One pass of the cloud-bounded refinement loop.
    Refine {
        /// Zero-based pass number.
        iteration: usize,
    },
    /// Solving a whole context exhaustively at full capacity.
    Direct,
    /// Running a work context on the pool.
    Context,
}

impl Stage {
    /// Numeric identifier of the stage in legacy status codes.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::FetchMatrix => 1,
            Self::Partition { .. } => 2,
            Self::Dilation { .. } => 3,
            Self::Refine { .. } => 4,
            Self::Direct => 5,
            Self::Context => 6,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchMatrix => f.write_str("travel matrix fetch"),
            Self::Partition { worker } => write!(f, "partition worker {worker}"),
            Self::Dilation { worker } => write!(f, "dilation worker {worker}"),
            Self::Refine { iteration } => write!(f, "refinement pass {iteration}"),
            Self::Direct => f.write_str("direct exhaustive solve"),
            Self::Context => f.write_str("work context"),
        }
    }
}

/// Errors returned by the solver stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Arguments were empty, out of range or inconsistent.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },
    /// The travel matrix could not be obtained or did not fit the orders.
    #[error(transparent)]
    TravelMatrix(#[from] TravelMatrixError),
    /// The route evaluator failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// A worker panicked.
    #[error("worker panicked during {stage}: {message}")]
    WorkerPanicked {
        /// Stage the worker was running.
        stage: Stage,
        /// Panic payload rendered as text.
        message: String,
    },
    /// A wrapped failure from an inner stage.
    #[error("{stage} failed: {source}")]
    Failed {
        /// Stage that observed the failure.
        stage: Stage,
        /// Failure reported by the inner stage.
        #[source]
        source: Box<SolveError>,
    },
}

impl SolveError {
    /// Build an [`SolveError::InvalidInput`] from a reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Wrap the error as having failed during `stage`.
    #[must_use]
    pub fn at(self, stage: Stage) -> Self {
        Self::Failed {
            stage,
            source: Box::new(self),
        }
    }

    /// Stages the error passed through, outermost first.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_solver::{SolveError, Stage};
    ///
    /// let err = SolveError::invalid("empty pool")
    ///     .at(Stage::Partition { worker: 1 })
    ///     .at(Stage::Refine { iteration: 0 });
    /// assert_eq!(
    ///     err.breadcrumb(),
    ///     vec![Stage::Refine { iteration: 0 }, Stage::Partition { worker: 1 }]
    /// );
    /// assert_eq!(err.status_code(), 4 * 100_000 + 2 * 100_000 + 1);
    /// ```
    #[must_use]
    pub fn breadcrumb(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::Failed { stage, source } => {
                    stages.push(*stage);
                    current = source;
                }
                Self::WorkerPanicked { stage, .. } => {
                    stages.push(*stage);
                    return stages;
                }
                _ => return stages,
            }
        }
    }

    /// Innermost error of the chain.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Failed { source, .. } = current {
            current = source;
        }
        current
    }

    /// Legacy integer status: `stage * 100000 + inner` per wrapping stage,
    /// saturating at `u64::MAX`. Never zero.
    #[must_use]
    pub fn status_code(&self) -> u64 {
        match self {
            Self::InvalidInput { .. } => 1,
            Self::TravelMatrix(_) => 11,
            Self::Evaluation(_) => 12,
            Self::WorkerPanicked { stage, .. } => stage.code(),
            Self::Failed { stage, source } => stage
                .code()
                .saturating_mul(STAGE_FACTOR)
                .saturating_add(source.status_code()),
        }
    }
}
