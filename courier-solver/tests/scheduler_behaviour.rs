//! Behavioural tests for the admission scheduler using rstest-bdd.

use std::cell::{Cell, RefCell};

use courier_core::{
    OrderId, ShopId,
    test_support::{
        FailingEvaluator, Fault, GridMatrixProvider, PrefixCloudFinder, bound_courier, grid_order,
        grid_shop,
    },
};
use courier_solver::{
    Collaborators, ContextOutcome, ScheduleMonitor, ScheduleReport, Scheduler, SolveError,
    SolverConfig, Stage, WorkContext,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Tracks how many contexts are open and which shop went first.
#[derive(Debug, Default)]
struct WindowMonitor {
    open: usize,
    peak: usize,
    first: Option<ShopId>,
}

impl ScheduleMonitor for WindowMonitor {
    fn name(&self) -> &'static str {
        "window"
    }

    fn on_submit(&mut self, _slot: usize, context: &WorkContext) {
        self.open += 1;
        self.peak = self.peak.max(self.open);
        self.first.get_or_insert(context.shop.id);
    }

    fn on_complete(&mut self, _slot: usize, _outcome: &ContextOutcome) {
        self.open = self.open.saturating_sub(1);
    }
}

#[derive(Debug)]
struct SchedulerWorld {
    contexts: RefCell<Vec<WorkContext>>,
    in_flight: Cell<usize>,
    fault: Cell<Option<(OrderId, Fault)>>,
    monitor: RefCell<WindowMonitor>,
    report: RefCell<Option<ScheduleReport>>,
}

impl SchedulerWorld {
    fn new() -> Self {
        Self {
            contexts: RefCell::new(Vec::new()),
            in_flight: Cell::new(1),
            fault: Cell::new(None),
            monitor: RefCell::new(WindowMonitor::default()),
            report: RefCell::new(None),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn report(&self) -> ScheduleReport {
        self.report
            .borrow()
            .clone()
            .expect("contexts should be scheduled before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn outcome(&self, shop: ShopId) -> ContextOutcome {
        self.report()
            .outcomes
            .into_iter()
            .find(|outcome| outcome.shop_id == shop)
            .expect("shop should have an outcome")
    }
}

#[fixture]
fn world() -> SchedulerWorld {
    SchedulerWorld::new()
}

#[given("four shops with one to four orders each")]
fn given_four_shops(world: &SchedulerWorld) {
    let contexts = (1_u64..=4)
        .map(|shop| {
            let orders = (1_u64..=shop)
                .zip(1_i32..)
                .map(|(n, x)| grid_order(shop * 100 + n, shop, x, 0))
                .collect();
            WorkContext::new(grid_shop(shop), bound_courier(shop, shop, 1, 2), orders, 0)
        })
        .collect();
    world.contexts.replace(contexts);
}

#[given("at most {limit} contexts in flight")]
fn given_in_flight(world: &SchedulerWorld, limit: usize) {
    world.in_flight.set(limit);
}

#[given("the evaluator rejects order {order}")]
fn given_rejecting_evaluator(world: &SchedulerWorld, order: OrderId) {
    world.fault.set(Some((order, Fault::Error)));
}

#[given("the evaluator panics on order {order}")]
fn given_panicking_evaluator(world: &SchedulerWorld, order: OrderId) {
    world.fault.set(Some((order, Fault::Panic)));
}

#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
#[when("the contexts are scheduled")]
fn when_scheduled(world: &SchedulerWorld) {
    let (trigger, fault) = world.fault.get().unwrap_or((OrderId::MAX, Fault::Error));
    let collaborators = Collaborators {
        matrices: GridMatrixProvider::default(),
        evaluator: FailingEvaluator::new(trigger, fault),
        clouds: PrefixCloudFinder,
    };
    let limit = world.in_flight.get();
    let config = SolverConfig {
        min_in_flight: limit,
        max_in_flight: limit,
        logical_cores: Some(2),
        ..SolverConfig::default()
    };
    let scheduler = Scheduler::new(collaborators, config).expect("pool starts");
    let contexts = world.contexts.replace(Vec::new());
    let report = scheduler.run(contexts, &mut *world.monitor.borrow_mut());
    world.report.replace(Some(report));
}

#[then("every shop is reported exactly once")]
fn then_each_shop_once(world: &SchedulerWorld) {
    let mut shops: Vec<ShopId> = world
        .report()
        .outcomes
        .iter()
        .map(|outcome| outcome.shop_id)
        .collect();
    shops.sort_unstable();
    assert_eq!(shops, vec![1, 2, 3, 4]);
}

#[then("no more than {limit} contexts were in flight")]
fn then_window_respected(world: &SchedulerWorld, limit: usize) {
    assert!(world.monitor.borrow().peak <= limit);
}

#[then("the largest shop was submitted first")]
fn then_largest_first(world: &SchedulerWorld) {
    assert_eq!(world.monitor.borrow().first, Some(4));
}

#[then("shop {shop} is reported as failed during the direct search")]
fn then_failed_direct(world: &SchedulerWorld, shop: ShopId) {
    let outcome = world.outcome(shop);
    let Err(err) = outcome.result else {
        panic!("shop {shop} should have failed");
    };
    assert_eq!(
        err.breadcrumb(),
        vec![Stage::Direct, Stage::Partition { worker: 0 }]
    );
    assert!(matches!(err.root_cause(), SolveError::Evaluation(_)));
}

#[then("shop {shop} is reported as a contained worker panic")]
fn then_failed_panic(world: &SchedulerWorld, shop: ShopId) {
    let outcome = world.outcome(shop);
    let Err(err) = outcome.result else {
        panic!("shop {shop} should have failed");
    };
    assert_eq!(
        err.breadcrumb(),
        vec![Stage::Direct, Stage::Partition { worker: 0 }]
    );
    assert!(matches!(
        err.root_cause(),
        SolveError::WorkerPanicked { .. }
    ));
}

#[then("the other {count} shops produced candidates")]
fn then_others_succeed(world: &SchedulerWorld, count: usize) {
    let report = world.report();
    assert_eq!(report.succeeded(), count);
    let failed: Vec<ShopId> = report.failures().map(|outcome| outcome.shop_id).collect();
    assert!(
        report
            .deliveries
            .iter()
            .all(|delivery| !failed.contains(&delivery.shop_id()))
    );
    assert!(!report.deliveries.is_empty());
}

#[scenario(path = "tests/features/scheduler.feature", index = 0)]
fn contexts_run_within_the_window(world: SchedulerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scheduler.feature", index = 1)]
fn failing_context_is_isolated(world: SchedulerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scheduler.feature", index = 2)]
fn panicking_context_is_contained(world: SchedulerWorld) {
    let _ = world;
}
