//! Behaviour-driven step definitions driving the plan CLI scenarios.

use super::helpers::{SNAPSHOT, Workspace, write_utf8};
use super::*;
use crate::plan::run_plan_with;
use camino::Utf8PathBuf;
use courier_data::DispatchReport;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Debug)]
struct PlanWorld {
    workspace: Workspace,
    snapshot_path: Utf8PathBuf,
    include_snapshot: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl PlanWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let snapshot_path = workspace.path("snapshot.json");
        Self {
            workspace,
            snapshot_path,
            include_snapshot: RefCell::new(true),
            cli_args: RefCell::new(vec!["--threads".to_owned(), "2".to_owned()]),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn report_path(&self) -> Utf8PathBuf {
        self.workspace.path("report.json")
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["courier".to_owned(), "plan".to_owned()];
        if *self.include_snapshot.borrow() {
            argv.push(self.snapshot_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> CliError {
        let outcome = self.result.replace(None).expect("result recorded");
        outcome.expect_err("expected error")
    }

    fn stdout_text(&self) -> String {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        if let Err(err) = result {
            panic!("expected success, found {err}");
        }
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::new()
}

#[given("a dispatch snapshot exists on disk")]
fn snapshot_exists(#[from(world)] world: &PlanWorld) {
    write_utf8(&world.snapshot_path, SNAPSHOT.as_bytes());
}

#[given("I omit the snapshot path")]
fn omit_snapshot_path(#[from(world)] world: &PlanWorld) {
    *world.include_snapshot.borrow_mut() = false;
}

#[given("the snapshot contains invalid JSON")]
fn snapshot_contains_invalid_json(#[from(world)] world: &PlanWorld) {
    write_utf8(&world.snapshot_path, b"{ not valid json");
}

#[given("I request the report in a file")]
fn request_report_file(#[from(world)] world: &PlanWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_PLAN_OUTPUT}"),
        world.report_path().as_str().to_owned(),
    ]);
}

#[given("I ask for {threads} worker threads")]
fn ask_for_threads(#[from(world)] world: &PlanWorld, threads: usize) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_PLAN_THREADS}"),
        threads.to_string(),
    ]);
}

#[when("I run the plan command")]
fn run_plan_command(#[from(world)] world: &PlanWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Plan(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_plan_with(args, &mut *buffer)
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints {count} deliveries")]
fn command_prints_deliveries(#[from(world)] world: &PlanWorld, count: usize) {
    let report: DispatchReport =
        serde_json::from_str(&world.stdout_text()).expect("stdout should be a JSON report");
    assert_eq!(report.deliveries.len(), count);
    assert!(report.rejected.is_empty());
}

#[then("the command prints a summary of {count} deliveries")]
fn command_prints_summary(#[from(world)] world: &PlanWorld, count: usize) {
    let summary = world.stdout_text();
    assert!(
        summary.starts_with(&format!("wrote {count} deliveries")),
        "unexpected summary {summary:?}"
    );
}

#[then("the report file lists {count} deliveries")]
fn report_file_lists(#[from(world)] world: &PlanWorld, count: usize) {
    let text = std::fs::read_to_string(world.report_path().as_std_path()).expect("report file");
    let report: DispatchReport = serde_json::from_str(&text).expect("report file is JSON");
    assert_eq!(report.deliveries.len(), count);
}

#[then("the command fails because the snapshot path is missing")]
fn command_fails_missing_snapshot(#[from(world)] world: &PlanWorld) {
    match world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(field, ARG_PLAN_SNAPSHOT),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the snapshot is malformed")]
fn command_fails_malformed_snapshot(#[from(world)] world: &PlanWorld) {
    match world.error() {
        CliError::LoadSnapshot(courier_core::SourceError::Malformed { message }) => {
            assert!(message.contains("snapshot.json"));
        }
        other => panic!("expected a malformed snapshot, found {other:?}"),
    }
}

#[then("the command fails because threads is zero")]
fn command_fails_zero_threads(#[from(world)] world: &PlanWorld) {
    match world.error() {
        CliError::ZeroValue { field } => assert_eq!(field, ARG_PLAN_THREADS),
        other => panic!("expected ZeroValue, found {other:?}"),
    }
}

macro_rules! register_plan_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/plan_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PlanWorld) {
            let _ = world;
        }
    };
}

register_plan_scenario!(plan_to_stdout, "planning a snapshot to standard output");
register_plan_scenario!(plan_to_file, "writing the report to a file");
register_plan_scenario!(plan_missing_snapshot, "rejecting missing snapshot paths");
register_plan_scenario!(plan_malformed_snapshot, "rejecting malformed snapshots");
register_plan_scenario!(plan_zero_threads, "rejecting a zero thread count");
