//! Error types for health check operations.

use crate::types::UnreachableReason;
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// Main error type for health check operations.
#[derive(Error, Debug)]
pub enum HealthCheckError {
    // Address errors
    #[error("fail to split host and port '{host}': {reason}")]
    InvalidAddress { host: String, reason: &'static str },

    #[error("no ip found for {host}")]
    NoAddressFound { host: String },

    #[error("failed to resolve {host}: {source}")]
    ResolutionFailed {
        host: String,
        #[source]
        source: std::io::Error,
    },

    // Socket/IO errors
    #[error("failed to create socket: {0}")]
    SocketCreation(#[source] std::io::Error),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", timeout_message(.previous))]
    Timeout { previous: Option<String> },

    // Protocol errors
    #[error("received invalid ICMP Echo Reply message")]
    InvalidEchoReply,

    #[error("malformed ICMP message: {0}")]
    MalformedPacket(String),

    #[error("host {ip}, {reason}")]
    Unreachable {
        ip: IpAddr,
        reason: UnreachableReason,
    },

    #[error("failed to read {expected} bytes: {source}")]
    ReadFailed {
        expected: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("expected {expected}, got {received}")]
    PayloadMismatch { expected: String, received: String },

    // Wrapping errors
    #[error("ping {ip} failed: {source}")]
    Ping {
        ip: IpAddr,
        #[source]
        source: Box<HealthCheckError>,
    },

    #[error("icmp check failed: {0}")]
    IcmpPrecheck(#[source] Box<HealthCheckError>),

    #[error("error on healthcheck '{name}' for host '{host}': {source}")]
    CheckFailed {
        name: String,
        host: String,
        #[source]
        source: Box<HealthCheckError>,
    },

    #[error("{}", aggregate_message(.host, .failures))]
    Aggregate {
        host: String,
        failures: Vec<CheckFailure>,
    },

    #[error("health check panicked: {0}")]
    Panicked(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HealthCheckError {
    /// Returns true if this error is an expired probe deadline, possibly wrapped.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Ping { source, .. }
            | Self::IcmpPrecheck(source)
            | Self::CheckFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Failures collected by a chain, empty for any other error.
    pub fn failures(&self) -> &[CheckFailure] {
        match self {
            Self::Aggregate { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// A single failed check inside an aggregated chain error.
#[derive(Debug)]
pub struct CheckFailure {
    /// Identity of the checker that failed.
    pub name: String,
    /// Error it returned.
    pub error: HealthCheckError,
}

impl CheckFailure {
    pub fn new(name: impl Into<String>, error: HealthCheckError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

fn timeout_message(previous: &Option<String>) -> String {
    match previous {
        Some(previous) => format!("timeout, previous error message is {}", previous),
        None => "timeout".to_string(),
    }
}

fn aggregate_message(host: &str, failures: &[CheckFailure]) -> String {
    let mut message = format!("errors on healthchecks for host '{}':\n", host);
    for failure in failures {
        message.push_str("- ");
        message.push_str(&failure.to_string());
        message.push('\n');
    }
    message
}

/// Result type alias for health check operations.
pub type HealthCheckResult<T> = Result<T, HealthCheckError>;
