//! Parallel chain execution.
//!
//! Spawns one task per checker and collects failures asynchronously.

use crate::{CheckFailure, HealthCheckError, HealthChecker};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Runs every checker concurrently against `host`.
///
/// All checkers always run, even with `require_all`. Failures flow through a
/// channel drained by a dedicated aggregator task so workers never wait on
/// each other.
pub async fn check_parallel(
    checkers: &[Arc<dyn HealthChecker>],
    host: &str,
    require_all: bool,
) -> Result<(), HealthCheckError> {
    let (err_tx, mut err_rx) = mpsc::channel::<CheckFailure>(1);

    let aggregator = tokio::spawn(async move {
        let mut failures = Vec::new();
        while let Some(failure) = err_rx.recv().await {
            trace!(failure = %failure, "Collected health check failure");
            failures.push(failure);
        }
        failures
    });

    let mut workers = Vec::with_capacity(checkers.len());
    for checker in checkers {
        let checker = Arc::clone(checker);
        let name = checker.to_string();
        let host = host.to_string();
        let err_tx = err_tx.clone();
        let worker = tokio::spawn(async move {
            if let Err(err) = checker.check(&host).await {
                debug!(checker = %checker, host, error = %err, "Health check failed");
                // The aggregator only stops once every sender is gone.
                let _ = err_tx.send(CheckFailure::new(checker.to_string(), err)).await;
            }
        });
        workers.push((name, worker));
    }

    for (name, worker) in workers {
        if let Err(join_err) = worker.await {
            warn!(checker = %name, error = %join_err, "Health check task did not complete");
            let failure = CheckFailure::new(name, HealthCheckError::Panicked(join_err.to_string()));
            let _ = err_tx.send(failure).await;
        }
    }
    drop(err_tx);

    let failures = aggregator
        .await
        .map_err(|e| HealthCheckError::Internal(format!("failure aggregator stopped: {}", e)))?;

    let failed = failures.len();
    if failed > 0 && (require_all || failed == checkers.len()) {
        return Err(HealthCheckError::Aggregate {
            host: host.to_string(),
            failures,
        });
    }
    Ok(())
}
