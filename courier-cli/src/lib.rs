//! Command-line interface for the courier dispatch engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;

pub use error::CliError;

use plan::PlanArgs;

const ARG_PLAN_SNAPSHOT: &str = "snapshot";
const ARG_PLAN_OUTPUT: &str = "output";
const ARG_PLAN_THREADS: &str = "threads";
const ARG_PLAN_MAX_IN_FLIGHT: &str = "max-in-flight";
const ARG_PLAN_KEY_BUDGET: &str = "key-budget";
const ENV_PLAN_SNAPSHOT: &str = "COURIER_CMDS_PLAN_SNAPSHOT_PATH";

/// Run the courier CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => plan::run_plan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Candidate route construction for courier dispatch",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the candidate delivery pool for a dispatch snapshot.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
