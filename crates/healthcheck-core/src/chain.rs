//! Combinator running several health checks under one policy.

use crate::execution::{check_parallel, check_serial};
use crate::{HealthCheckError, HealthChecker};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Ordered set of checkers with a concurrency mode and a success policy.
///
/// | mode     | require_all | passes when                         |
/// |----------|-------------|-------------------------------------|
/// | serial   | true        | every checker passes (stops early)  |
/// | serial   | false       | at least one checker passes         |
/// | parallel | true        | every checker passes (all run)      |
/// | parallel | false       | at least one checker passes         |
///
/// An empty chain always passes.
#[derive(Clone)]
pub struct Chain {
    checkers: Vec<Arc<dyn HealthChecker>>,
    parallel: bool,
    require_all: bool,
}

impl Chain {
    pub fn new(parallel: bool, require_all: bool, checkers: Vec<Arc<dyn HealthChecker>>) -> Self {
        Self {
            checkers,
            parallel,
            require_all,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn requires_all(&self) -> bool {
        self.require_all
    }

    pub fn checkers(&self) -> &[Arc<dyn HealthChecker>] {
        &self.checkers
    }
}

#[async_trait]
impl HealthChecker for Chain {
    async fn check(&self, host: &str) -> Result<(), HealthCheckError> {
        if self.checkers.is_empty() {
            return Ok(());
        }
        debug!(
            host,
            checkers = self.checkers.len(),
            parallel = self.parallel,
            require_all = self.require_all,
            "Running health check chain"
        );
        if self.parallel {
            check_parallel(&self.checkers, host, self.require_all).await
        } else {
            check_serial(&self.checkers, host, self.require_all).await
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chain")
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.checkers.iter().map(|c| c.to_string()).collect();
        f.debug_struct("Chain")
            .field("checkers", &names)
            .field("parallel", &self.parallel)
            .field("require_all", &self.require_all)
            .finish()
    }
}
