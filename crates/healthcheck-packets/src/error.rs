//! Packet-level errors.

use healthcheck_core::HealthCheckError;
use thiserror::Error;

/// Errors raised while decoding ICMP messages.
///
/// Every variant describes a packet that should be skipped: a probe keeps
/// listening after any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },

    #[error("Failed to parse {layer} layer: {reason}")]
    PacketParseFailed { layer: &'static str, reason: String },
}

impl From<PacketError> for HealthCheckError {
    fn from(err: PacketError) -> Self {
        HealthCheckError::MalformedPacket(err.to_string())
    }
}
