//! Serial chain execution.
//!
//! Runs one checker at a time, in list order.

use crate::{CheckFailure, HealthCheckError, HealthChecker};
use std::sync::Arc;
use tracing::{debug, trace};

/// Runs `checkers` one after the other against `host`.
///
/// With `require_all`, the first failure is returned at once and the
/// remaining checkers never run. Otherwise every checker runs and the chain
/// passes as soon as one of them passed.
pub async fn check_serial(
    checkers: &[Arc<dyn HealthChecker>],
    host: &str,
    require_all: bool,
) -> Result<(), HealthCheckError> {
    let mut failures = Vec::new();
    let mut one_succeeded = false;

    for checker in checkers {
        trace!(checker = %checker, host, "Running health check");
        match checker.check(host).await {
            Ok(()) => {
                one_succeeded = true;
            }
            Err(err) if require_all => {
                debug!(checker = %checker, host, error = %err, "Health check failed, stopping chain");
                return Err(HealthCheckError::CheckFailed {
                    name: checker.to_string(),
                    host: host.to_string(),
                    source: Box::new(err),
                });
            }
            Err(err) => {
                debug!(checker = %checker, host, error = %err, "Health check failed");
                failures.push(CheckFailure::new(checker.to_string(), err));
            }
        }
    }

    if !one_succeeded {
        return Err(HealthCheckError::Aggregate {
            host: host.to_string(),
            failures,
        });
    }
    Ok(())
}
