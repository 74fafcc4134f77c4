//! Core types, traits, and error handling for endpoint health checks.
//!
//! This crate provides the fundamental abstractions shared by every checker:
//!
//! - [`HealthChecker`] trait for protocol implementations
//! - [`Chain`] to combine checkers serially or in parallel
//! - [`HealthCheckError`] for error handling
//! - host, payload and seed helpers used by the probes

pub mod chain;
pub mod error;
pub mod execution;
pub mod host;
pub mod noop;
pub mod payload;
pub mod seed;
pub mod traits;
pub mod types;

pub use chain::Chain;
pub use error::{CheckFailure, HealthCheckError, HealthCheckResult};
pub use host::{
    format_host, join_host_port, resolve_first, resolve_host, split_host_port,
    split_host_port_required,
};
pub use noop::NoHealthCheck;
pub use payload::{payload_or, Payload};
pub use seed::SeedCounter;
pub use traits::HealthChecker;
pub use types::{IcmpFamily, UnreachableReason};
