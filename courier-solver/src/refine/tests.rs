//! Tests for `ContextSolver`.

use super::*;
use courier_core::{
    Courier,
    test_support::{
        FailingEvaluator, FailingMatrixProvider, Fault, FixedCloudFinder, GridMatrixProvider,
        PrefixCloudFinder, SequentialEvaluator, bound_courier, grid_order, grid_shop,
    },
};
use rstest::rstest;

fn context(order_count: u64, courier: Courier) -> WorkContext {
    let orders = (1..=order_count)
        .map(|id| {
            let offset = i32::try_from(id).unwrap_or(0);
            grid_order(id, 1, offset, offset % 2)
        })
        .collect();
    WorkContext::new(grid_shop(1), courier, orders, 0)
}

fn budget(key_budget: u64) -> SolverConfig {
    SolverConfig {
        key_budget,
        ..SolverConfig::default()
    }
}

#[rstest]
fn small_pool_is_solved_directly() {
    let pool = WorkerPool::new(2).expect("pool starts");
    let config = SolverConfig::default();
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &PrefixCloudFinder);

    let deliveries = solver
        .solve(&context(5, bound_courier(1, 1, 1, 3)))
        .expect("solve succeeds");

    assert_eq!(evaluator.calls(), 25);
    assert!(!deliveries.is_empty() && deliveries.len() <= 25);
    assert!(deliveries.iter().all(|delivery| delivery.len() <= 3));
    assert_eq!(matrices.requests(), vec![vec![1, 2, 3, 4, 5]]);
}

#[rstest]
#[case(Box::new(PrefixCloudFinder))]
#[case(Box::new(FixedCloudFinder::failing()))]
#[case(Box::new(FixedCloudFinder::returning(vec![0, 99])))]
#[case(Box::new(FixedCloudFinder::returning(Vec::new())))]
fn clouds_consume_the_pool_in_passes(#[case] clouds: Box<dyn CloudFinder>) {
    let pool = WorkerPool::new(2).expect("pool starts");
    let config = budget(20);
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, clouds.as_ref());

    let deliveries = solver
        .solve(&context(10, bound_courier(1, 1, 1, 3)))
        .expect("solve succeeds");

    assert_eq!(
        matrices.requests(),
        vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10]]
    );
    assert!(deliveries.iter().all(|delivery| delivery.len() <= 3));
}

#[rstest]
fn chosen_cloud_is_searched_in_id_order() {
    let pool = WorkerPool::new(2).expect("pool starts");
    let config = budget(20);
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let clouds = FixedCloudFinder::returning(vec![9, 2, 5]);
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &clouds);

    solver
        .solve(&context(10, bound_courier(1, 1, 1, 3)))
        .expect("solve succeeds");

    let first = matrices.requests().into_iter().next();
    assert_eq!(first, Some(vec![3, 6, 10]));
}

#[rstest]
fn shallow_clouds_are_dilated_to_capacity() {
    let pool = WorkerPool::new(2).expect("pool starts");
    let config = SolverConfig {
        cloud_order_counts: [6, 6, 6, 6],
        ..budget(60)
    };
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &PrefixCloudFinder);

    let deliveries = solver
        .solve(&context(8, bound_courier(1, 1, 1, 5)))
        .expect("solve succeeds");

    assert_eq!(
        matrices.requests(),
        vec![vec![1, 2, 3, 4, 5, 6], vec![7, 8]]
    );
    assert!(deliveries.iter().any(|delivery| delivery.len() == 5));
    assert!(deliveries.iter().all(|delivery| delivery.len() <= 5));
}

#[rstest]
fn matrix_failure_carries_its_stages() {
    let pool = WorkerPool::new(2).expect("pool starts");
    let evaluator = SequentialEvaluator::default();
    let direct = SolverConfig::default();
    let solver = ContextSolver::new(
        &pool,
        &direct,
        &FailingMatrixProvider,
        &evaluator,
        &PrefixCloudFinder,
    );
    let err = solver
        .solve(&context(5, bound_courier(1, 1, 1, 3)))
        .expect_err("matrix fetch fails");
    assert_eq!(err.breadcrumb(), vec![Stage::Direct, Stage::FetchMatrix]);

    let clouds = budget(20);
    let solver = ContextSolver::new(
        &pool,
        &clouds,
        &FailingMatrixProvider,
        &evaluator,
        &PrefixCloudFinder,
    );
    let err = solver
        .solve(&context(10, bound_courier(1, 1, 1, 3)))
        .expect_err("matrix fetch fails");
    assert_eq!(
        err.breadcrumb(),
        vec![Stage::Refine { iteration: 0 }, Stage::FetchMatrix]
    );
}

#[rstest]
fn evaluator_failure_aborts_the_context() {
    let pool = WorkerPool::new(2).expect("pool starts");
    let config = budget(20);
    let matrices = GridMatrixProvider::default();
    let evaluator = FailingEvaluator::new(6, Fault::Error);
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &PrefixCloudFinder);
    let err = solver
        .solve(&context(10, bound_courier(1, 1, 1, 3)))
        .expect_err("order 6 fails");
    assert_eq!(
        err.breadcrumb(),
        vec![Stage::Refine { iteration: 1 }, Stage::Partition { worker: 0 }]
    );
}

#[rstest]
fn invalid_contexts_are_rejected() {
    let pool = WorkerPool::new(1).expect("pool starts");
    let config = SolverConfig::default();
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &PrefixCloudFinder);
    let empty = WorkContext::new(grid_shop(1), bound_courier(1, 1, 1, 3), Vec::new(), 0);
    assert!(matches!(
        solver.solve(&empty),
        Err(SolveError::InvalidInput { .. })
    ));
    assert!(matches!(
        solver.solve(&context(3, bound_courier(1, 1, 1, 0))),
        Err(SolveError::InvalidInput { .. })
    ));
    assert!(matrices.requests().is_empty());
}

#[rstest]
fn repeated_order_ids_are_rejected() {
    let pool = WorkerPool::new(1).expect("pool starts");
    let config = SolverConfig::default();
    let matrices = GridMatrixProvider::default();
    let evaluator = SequentialEvaluator::default();
    let solver = ContextSolver::new(&pool, &config, &matrices, &evaluator, &PrefixCloudFinder);
    let orders = vec![grid_order(5, 1, 0, 1), grid_order(5, 1, 1, 0), grid_order(6, 1, 1, 1)];
    let repeated = WorkContext::new(grid_shop(1), bound_courier(1, 1, 1, 2), orders, 0);

    let err = solver.solve(&repeated).expect_err("repeated ids");
    assert!(matches!(err, SolveError::InvalidInput { .. }), "{err}");
    assert!(err.to_string().contains("order 5"));
    assert!(matrices.requests().is_empty());
}

#[rstest]
fn covered_policy_keeps_unserved_orders() {
    let attempted = vec![grid_order(1, 1, 0, 1), grid_order(2, 1, 0, 2)];
    let matrix = GridMatrixProvider::matrix(&grid_shop(1), &attempted);
    let courier = bound_courier(1, 1, 1, 2);
    let shop = grid_shop(1);
    let problem = Problem {
        shop: &shop,
        courier: &courier,
        orders: &attempted,
        matrix: &matrix,
        cycle_time: 0,
    };
    let served = problem
        .planner()
        .expect("matrix covers pool")
        .plan(&[0])
        .expect("feasible");

    let covered = consumed_orders(ConsumptionPolicy::Covered, &attempted, [&served]);
    assert_eq!(covered, HashSet::from([1]));
    let all = consumed_orders(ConsumptionPolicy::Attempted, &attempted, [&served]);
    assert_eq!(all, HashSet::from([1, 2]));
    let fallback = consumed_orders(ConsumptionPolicy::Covered, &attempted, []);
    assert_eq!(fallback, HashSet::from([1, 2]));
}
