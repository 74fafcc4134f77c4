//! Composable endpoint health checks.
//!
//! Every checker implements [`HealthChecker`] and reports success or a
//! [`HealthCheckError`] for a `host[:port]` address:
//!
//! - [`IcmpHealthCheck`] pings the host.
//! - [`UdpHealthCheck`] probes a UDP service.
//! - [`TcpHealthCheck`] connects to a TCP service.
//! - [`NoHealthCheck`] always succeeds.
//! - [`Chain`] runs other checkers serially or in parallel, requiring all or
//!   only one of them to succeed.
//!
//! ```no_run
//! use healthcheck::{Chain, HealthChecker, IcmpHealthCheck, IcmpOptions, TcpHealthCheck, TcpOptions};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), healthcheck::HealthCheckError> {
//! let ping: Arc<dyn HealthChecker> = Arc::new(IcmpHealthCheck::new(IcmpOptions::default()));
//! let connect: Arc<dyn HealthChecker> = Arc::new(TcpHealthCheck::new(TcpOptions::default()));
//! let chain = Chain::new(true, true, vec![ping, connect]);
//! chain.check("127.0.0.1:8080").await?;
//! # Ok(())
//! # }
//! ```

pub use healthcheck_core::*;
pub use healthcheck_icmp::{IcmpHealthCheck, IcmpOptions};
pub use healthcheck_packets::{IcmpMessage, IcmpSocket, OriginalDatagram, PacketError, SocketKind};
pub use healthcheck_tcp::{TcpHealthCheck, TcpOptions};
pub use healthcheck_udp::{UdpHealthCheck, UdpOptions, DEFAULT_UDP_SEND};
