// tests/parallel_batch.rs

use std::fs;
use std::time::Duration;

use pf::errors::PfError;
use pf::orchestrator::{DEFAULT_MAX_WORKERS, execute_batch, run_bounded};
use pf::orchestrator::parallel::Unit;
use pf_test_utils::builders::RequestBuilder;
use tempfile::TempDir;

fn unit(code: i32, delay_ms: u64) -> Unit {
    Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(code)
    })
}

fn failing_unit() -> Unit {
    Box::pin(async move {
        Err(PfError::Environment("connection refused".to_string()))
    })
}

#[tokio::test]
async fn all_zero_outcomes_aggregate_to_zero() {
    pf_test_utils::init_tracing();

    let units = vec![unit(0, 30), unit(0, 5), unit(0, 15)];
    assert_eq!(run_bounded(units, DEFAULT_MAX_WORKERS).await, 0);
}

#[tokio::test]
async fn any_nonzero_outcome_makes_the_batch_fail() {
    pf_test_utils::init_tracing();

    // The failure completes last; aggregation must not depend on
    // completion order.
    let units = vec![unit(0, 5), unit(0, 10), unit(7, 40)];
    assert_ne!(run_bounded(units, DEFAULT_MAX_WORKERS).await, 0);
}

#[tokio::test]
async fn failing_sibling_does_not_cancel_the_rest() {
    pf_test_utils::init_tracing();

    // Fast failure first; slower successes must still complete and the
    // batch must still report failure.
    let units = vec![unit(3, 1), unit(0, 40), unit(0, 40)];
    assert_ne!(run_bounded(units, DEFAULT_MAX_WORKERS).await, 0);
}

#[tokio::test]
async fn unit_errors_count_as_failures() {
    pf_test_utils::init_tracing();

    let units = vec![unit(0, 1), failing_unit()];
    assert_eq!(run_bounded(units, DEFAULT_MAX_WORKERS).await, 1);
}

#[tokio::test]
async fn empty_batch_is_a_successful_no_op() {
    assert_eq!(run_bounded(Vec::new(), DEFAULT_MAX_WORKERS).await, 0);
}

#[tokio::test]
async fn pool_size_of_one_still_completes_all_units() {
    pf_test_utils::init_tracing();

    let units = vec![unit(0, 5), unit(0, 5), unit(2, 5), unit(0, 5)];
    assert_ne!(run_bounded(units, 1).await, 0);
}

#[tokio::test]
async fn batch_of_requests_runs_each_task() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    let ok_marker = dir.path().join("ok.marker");
    fs::write(
        &root,
        format!(
            "task ok:\n    touch {}\ntask bad:\n    false\n",
            ok_marker.display()
        ),
    )
    .unwrap();

    let requests = vec![
        RequestBuilder::new("ok").file(root.to_str().unwrap()).build(),
        RequestBuilder::new("bad").file(root.to_str().unwrap()).build(),
    ];

    let rc = execute_batch(requests, DEFAULT_MAX_WORKERS).await;
    assert_ne!(rc, 0, "batch with a failing task must fail");
    assert!(ok_marker.exists(), "sibling task must still have run");
}

#[tokio::test]
async fn batch_with_unknown_task_reports_failure_without_crashing() {
    pf_test_utils::init_tracing();

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Pfyfile.pf");
    fs::write(&root, "task ok:\n    true\n").unwrap();

    let requests = vec![
        RequestBuilder::new("ok").file(root.to_str().unwrap()).build(),
        RequestBuilder::new("ghost").file(root.to_str().unwrap()).build(),
    ];

    assert_eq!(execute_batch(requests, DEFAULT_MAX_WORKERS).await, 1);
}
