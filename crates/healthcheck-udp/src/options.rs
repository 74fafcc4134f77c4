//! UDP check options.

use healthcheck_core::Payload;
use healthcheck_icmp::{or_default, IcmpOptions, DEFAULT_DELAY, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Datagram sent when no payload is configured.
pub const DEFAULT_UDP_SEND: &str = "test-gohc";

/// Options of [`crate::UdpHealthCheck`].
///
/// Zero durations select the defaults (5s timeouts, 1s delay).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpOptions {
    /// Datagram to send, [`DEFAULT_UDP_SEND`] when absent or empty.
    pub send: Option<Payload>,
    /// Expected responses, in order. When empty the check relies on ICMP
    /// Destination Unreachable messages instead.
    pub receive: Vec<Payload>,
    /// How long to watch for an unreachable message, or the deadline of
    /// each read when expecting responses.
    pub timeout: Duration,
    /// Timeout of the ICMP echo precheck.
    pub ping_timeout: Duration,
    /// Delay between two ICMP read attempts.
    pub delay: Duration,
    /// Port used instead of the one in the checked address.
    pub alt_port: Option<u16>,
}

impl UdpOptions {
    pub fn timeout(&self) -> Duration {
        or_default(self.timeout, DEFAULT_TIMEOUT)
    }

    pub fn ping_timeout(&self) -> Duration {
        or_default(self.ping_timeout, DEFAULT_TIMEOUT)
    }

    pub fn delay(&self) -> Duration {
        or_default(self.delay, DEFAULT_DELAY)
    }

    /// Options of the ICMP precheck.
    pub fn icmp_options(&self) -> IcmpOptions {
        IcmpOptions::new(self.ping_timeout, self.delay)
    }
}
