//! Plan command implementation for the courier CLI.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use courier_core::{DeliverySink, DispatchSource};
use courier_data::{
    GreatCircleMatrixProvider, JsonReportSink, JsonSnapshotSource, NearestCloudFinder,
    PermutationEvaluator,
};
use courier_solver::{Collaborators, ScheduleReport, Scheduler, SolverConfig};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_PLAN_KEY_BUDGET, ARG_PLAN_MAX_IN_FLIGHT, ARG_PLAN_OUTPUT, ARG_PLAN_SNAPSHOT,
    ARG_PLAN_THREADS, CliError, ENV_PLAN_SNAPSHOT,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a dispatch snapshot, build one work context per shop \
                 and vehicle type, and write every candidate delivery plus \
                 the orders that could not be planned as JSON.",
    about = "Build the candidate delivery pool for a snapshot"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON dispatch snapshot.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot_path: Option<Utf8PathBuf>,
    /// Write the report here instead of standard output.
    #[arg(long = ARG_PLAN_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Worker threads; defaults to the logical core count.
    #[arg(long = ARG_PLAN_THREADS, value_name = "count")]
    #[serde(default)]
    pub(crate) threads: Option<usize>,
    /// Upper bound on contexts solved at once.
    #[arg(long = ARG_PLAN_MAX_IN_FLIGHT, value_name = "count")]
    #[serde(default)]
    pub(crate) max_in_flight: Option<usize>,
    /// Largest key count searched exhaustively in one pass.
    #[arg(long = ARG_PLAN_KEY_BUDGET, value_name = "keys")]
    #[serde(default)]
    pub(crate) key_budget: Option<u64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON snapshot.
    pub(crate) snapshot_path: Utf8PathBuf,
    /// Report destination; standard output when absent.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Solver tunables with command-line overrides applied.
    pub(crate) solver: SolverConfig,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.snapshot_path, ARG_PLAN_SNAPSHOT)?;
        if let Some(parent) = self
            .output
            .as_deref()
            .and_then(Utf8Path::parent)
            .filter(|parent| !parent.as_str().is_empty())
            && !parent.is_dir()
        {
            return Err(CliError::OutputDirectoryNotDirectory {
                path: parent.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match path.metadata() {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn positive<T>(value: Option<T>, field: &'static str) -> Result<Option<T>, CliError>
where
    T: Default + PartialEq,
{
    match value {
        Some(zero) if zero == T::default() => Err(CliError::ZeroValue { field }),
        other => Ok(other),
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let snapshot_path = args.snapshot_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_SNAPSHOT,
            env: ENV_PLAN_SNAPSHOT,
        })?;

        let mut solver = SolverConfig::default();
        if let Some(threads) = positive(args.threads, ARG_PLAN_THREADS)? {
            solver.logical_cores = Some(threads);
        }
        if let Some(limit) = positive(args.max_in_flight, ARG_PLAN_MAX_IN_FLIGHT)? {
            solver.max_in_flight = limit;
            solver.min_in_flight = solver.min_in_flight.min(limit);
        }
        if let Some(budget) = positive(args.key_budget, ARG_PLAN_KEY_BUDGET)? {
            solver.key_budget = budget;
        }

        Ok(Self {
            snapshot_path,
            output: args.output,
            solver,
        })
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    run_plan_with(args, &mut stdout)
}

pub(crate) fn run_plan_with(args: PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let report = execute_plan(&config)?;
    match &config.output {
        Some(path) => {
            let mut sink = JsonReportSink::create(path)?;
            emit(&mut sink, &report)?;
            writeln!(
                writer,
                "wrote {} deliveries and {} rejected orders to {path}",
                sink.report().deliveries.len(),
                sink.report().rejected.len()
            )
            .map_err(CliError::WriteSummary)
        }
        None => emit(&mut JsonReportSink::new(writer), &report),
    }
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_plan(config: &PlanConfig) -> Result<ScheduleReport, CliError> {
    let snapshot = JsonSnapshotSource::new(config.snapshot_path.clone())
        .load()
        .map_err(CliError::LoadSnapshot)?;
    let collaborators = Collaborators {
        matrices: GreatCircleMatrixProvider::default(),
        evaluator: PermutationEvaluator::default(),
        clouds: NearestCloudFinder,
    };
    let scheduler = Scheduler::new(collaborators, config.solver.clone())?;
    let report = scheduler.schedule(&snapshot);
    let rejected = report.rejections().len();
    if rejected > 0 {
        warn!("{rejected} orders belong only to contexts that failed");
    }
    info!(
        "planned {} of {} contexts from {}",
        report.succeeded(),
        report.outcomes.len(),
        config.snapshot_path
    );
    Ok(report)
}

fn emit<S: DeliverySink>(sink: &mut S, report: &ScheduleReport) -> Result<(), CliError> {
    sink.accept(&report.deliveries)?;
    sink.reject(&report.rejections())?;
    sink.finish()?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
