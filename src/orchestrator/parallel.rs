// src/orchestrator/parallel.rs

//! Bounded parallel execution of independent units.
//!
//! Units are submitted all at once, run under a semaphore-bounded worker
//! pool, and collected as they complete (unordered). Outcomes aggregate by
//! logical OR over non-zero-ness: any failing unit makes the batch report
//! failure, but no unit cancels its siblings (best-effort fan-out, not
//! fail-fast).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::errors::{PfError, Result, format_for_user};
use crate::orchestrator::run::{ExecutionRequest, run_task};

/// Default worker-pool size for parallel batches.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// One unit of parallel work producing an exit code.
pub type Unit = Pin<Box<dyn Future<Output = Result<i32>> + Send + 'static>>;

/// Run all units under a pool of at most `max_workers` concurrent workers
/// and aggregate their exit codes.
///
/// A unit that returns an error has its message printed to stderr and
/// counts as exit code 1; the first non-zero code observed becomes the
/// batch result.
pub async fn run_bounded(units: Vec<Unit>, max_workers: usize) -> i32 {
    if units.is_empty() {
        return 0;
    }

    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut set = JoinSet::new();

    debug!(units = units.len(), max_workers, "submitting parallel batch");

    for unit in units {
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| PfError::Other(anyhow!("worker pool closed: {e}")))?;
            unit.await
        });
    }

    let mut rc_total = 0;
    while let Some(joined) = set.join_next().await {
        let rc = match joined {
            Ok(Ok(rc)) => rc,
            Ok(Err(err)) => {
                eprintln!("{}", format_for_user(&err));
                1
            }
            Err(join_err) => {
                error!(error = %join_err, "parallel unit panicked or was aborted");
                1
            }
        };

        if rc_total == 0 {
            rc_total = rc;
        }
    }

    rc_total
}

/// Execute a batch of independent task-execution requests in parallel.
pub async fn execute_batch(requests: Vec<ExecutionRequest>, max_workers: usize) -> i32 {
    let units: Vec<Unit> = requests
        .into_iter()
        .map(|req| Box::pin(run_task(req)) as Unit)
        .collect();

    run_bounded(units, max_workers).await
}
