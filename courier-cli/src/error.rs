//! Error types emitted by the courier CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use courier_core::{SinkError, SourceError};
use courier_solver::PoolError;
use thiserror::Error;

/// Errors emitted by the courier CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A numeric option was set to zero.
    #[error("--{field} must be greater than zero")]
    ZeroValue {
        /// Argument name.
        field: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The directory meant to hold the report does not exist.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory {
        /// Offending directory.
        path: Utf8PathBuf,
    },
    /// The snapshot could not be loaded.
    #[error("failed to load snapshot: {0}")]
    LoadSnapshot(#[source] SourceError),
    /// The worker pool could not be started.
    #[error(transparent)]
    StartWorkers(#[from] PoolError),
    /// Writing the report failed.
    #[error(transparent)]
    WriteReport(#[from] SinkError),
    /// Writing the summary line failed.
    #[error("failed to write plan summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
