//! TCP check options.

use healthcheck_core::Payload;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connect and read deadline when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options of [`crate::TcpHealthCheck`].
///
/// Without `send` and `receive` the check is connect-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpOptions {
    /// Bytes written once connected.
    pub send: Option<Payload>,
    /// Expected responses, read back in order.
    pub receive: Vec<Payload>,
    /// Deadline of the connection and of each read. Zero means 5s.
    pub timeout: Duration,
    /// Port used instead of the one in the checked address.
    pub alt_port: Option<u16>,
}

impl TcpOptions {
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}
