//! UDP reachability health check.
//!
//! UDP has no handshake, so reachability is inferred either from expected
//! responses or from the absence of ICMP Destination Unreachable messages.

mod checker;
mod options;
mod unreachable;

pub use checker::UdpHealthCheck;
pub use options::{UdpOptions, DEFAULT_UDP_SEND};
pub use unreachable::match_unreachable;
