//! ICMP echo health check.
//!
//! Sends a single Echo Request over an unprivileged datagram socket when the
//! platform allows it, a raw socket otherwise, and waits for the reply that
//! carries the same identifier.

mod checker;
mod options;

pub use checker::{IcmpHealthCheck, ECHO_PAYLOAD, ECHO_SEQUENCE};
pub use options::{or_default, IcmpOptions, DEFAULT_DELAY, DEFAULT_TIMEOUT};
