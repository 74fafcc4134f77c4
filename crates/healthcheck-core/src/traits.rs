//! Core trait for health checker implementations.

use crate::HealthCheckError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Core trait for health checks (ICMP, UDP, TCP, chains, ...).
///
/// Each protocol implements this trait so checkers can be composed without
/// knowing each other's concrete types. The `Display` form is the checker's
/// identity and is used in every error a chain reports.
#[async_trait]
pub trait HealthChecker: fmt::Display + Send + Sync {
    /// Runs one probe against `host` (`host[:port]`).
    ///
    /// Implementations must be safe to call concurrently against different
    /// hosts and must release every socket they opened before returning.
    async fn check(&self, host: &str) -> Result<(), HealthCheckError>;
}

#[async_trait]
impl<T: HealthChecker + ?Sized> HealthChecker for Arc<T> {
    async fn check(&self, host: &str) -> Result<(), HealthCheckError> {
        (**self).check(host).await
    }
}
