//! ICMP check options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overall deadline of an echo exchange when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read poll granularity when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Options of [`crate::IcmpHealthCheck`].
///
/// A zero duration selects the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpOptions {
    /// Time allowed for the echo reply to arrive.
    pub timeout: Duration,
    /// Delay between two reply read attempts.
    pub delay: Duration,
}

impl IcmpOptions {
    pub fn new(timeout: Duration, delay: Duration) -> Self {
        Self { timeout, delay }
    }

    pub fn timeout(&self) -> Duration {
        or_default(self.timeout, DEFAULT_TIMEOUT)
    }

    pub fn delay(&self) -> Duration {
        or_default(self.delay, DEFAULT_DELAY)
    }
}

/// `value`, or `default` when `value` is zero.
pub fn or_default(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}
