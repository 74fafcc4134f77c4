//! Health check that always passes.

use crate::{HealthCheckError, HealthChecker};
use async_trait::async_trait;
use std::fmt;

/// Checker that never fails, for endpoints that must not be probed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHealthCheck;

impl NoHealthCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthChecker for NoHealthCheck {
    async fn check(&self, _host: &str) -> Result<(), HealthCheckError> {
        Ok(())
    }
}

impl fmt::Display for NoHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoHealthCheck")
    }
}
