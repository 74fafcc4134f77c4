//! UDP health check.

use crate::options::{UdpOptions, DEFAULT_UDP_SEND};
use crate::unreachable::match_unreachable;
use async_trait::async_trait;
use healthcheck_core::{
    format_host, payload_or, resolve_first, split_host_port_required, HealthCheckError,
    HealthChecker, IcmpFamily, SeedCounter,
};
use healthcheck_icmp::IcmpHealthCheck;
use healthcheck_packets::{parse_icmp, unspecified_addr, IcmpMessage, IcmpSocket, PacketReceiver};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

/// Checks that a UDP service is reachable.
///
/// Without expected responses the host must first answer a ping, then a
/// datagram is sent and the check fails only if an ICMP Destination
/// Unreachable message about it arrives before the timeout. With expected
/// responses the check reads them back from the service instead.
pub struct UdpHealthCheck {
    options: UdpOptions,
    icmp: IcmpHealthCheck,
}

impl UdpHealthCheck {
    /// Creates a checker whose ping precheck is seeded from the process-wide
    /// [`SeedCounter`].
    pub fn new(options: UdpOptions) -> Self {
        Self::with_seed_counter(options, &SeedCounter::global())
    }

    /// Creates a checker whose ping precheck is seeded from `seeds`.
    pub fn with_seed_counter(options: UdpOptions, seeds: &SeedCounter) -> Self {
        let icmp = IcmpHealthCheck::with_seed_counter(options.icmp_options(), seeds);
        Self { options, icmp }
    }

    pub fn options(&self) -> &UdpOptions {
        &self.options
    }

    fn send_payload(&self) -> &[u8] {
        payload_or(self.options.send.as_ref(), DEFAULT_UDP_SEND.as_bytes())
    }

    async fn target(&self, host: &str) -> Result<SocketAddr, HealthCheckError> {
        let host = format_host(host, self.options.alt_port)?;
        let (name, port) = split_host_port_required(&host)?;
        let ip = resolve_first(&name).await?;
        Ok(SocketAddr::new(ip, port))
    }

    async fn check_with_receive(&self, host: &str) -> Result<(), HealthCheckError> {
        let target = self.target(host).await?;
        let family = IcmpFamily::from(target.ip());
        let socket = UdpSocket::bind(SocketAddr::new(unspecified_addr(family), 0))
            .await
            .map_err(HealthCheckError::SocketCreation)?;
        socket.connect(target).await.map_err(|source| HealthCheckError::Io {
            context: "failed to connect UDP socket",
            source,
        })?;

        socket
            .send(self.send_payload())
            .await
            .map_err(|source| HealthCheckError::Io {
                context: "failed to send UDP datagram",
                source,
            })?;
        debug!(%target, "Sent UDP datagram, waiting for responses");

        for expected in &self.options.receive {
            let expected = expected.data();
            let mut buf = vec![0u8; expected.len()];
            let n = match timeout(self.options.timeout(), socket.recv(&mut buf)).await {
                Ok(Ok(n)) => n,
                Ok(Err(source)) => {
                    return Err(HealthCheckError::ReadFailed {
                        expected: expected.len(),
                        source,
                    })
                }
                Err(_) => {
                    return Err(HealthCheckError::ReadFailed {
                        expected: expected.len(),
                        source: io::Error::new(io::ErrorKind::TimedOut, "i/o timeout"),
                    })
                }
            };

            let received = &buf[..n];
            if received != expected {
                return Err(HealthCheckError::PayloadMismatch {
                    expected: String::from_utf8_lossy(expected).into_owned(),
                    received: String::from_utf8_lossy(received).into_owned(),
                });
            }
            trace!(%target, len = n, "UDP response matched");
        }

        Ok(())
    }

    async fn check_icmp_udp(&self, host: &str) -> Result<(), HealthCheckError> {
        // The ping and the datagram must reach the same resolved address.
        let target = self.target(host).await?;
        let ip = target.ip();
        self.icmp.ping(ip).await.map_err(|err| {
            HealthCheckError::IcmpPrecheck(Box::new(HealthCheckError::Ping {
                ip,
                source: Box::new(err),
            }))
        })?;

        let family = IcmpFamily::from(target.ip());
        let listener = Arc::new(IcmpSocket::open_listener(family)?);
        let mut receiver = PacketReceiver::spawn(Arc::clone(&listener), self.options.delay());

        let result = match self.send_datagram(target).await {
            Ok(()) => self.watch_unreachable(&mut receiver, family, target).await,
            Err(err) => Err(err),
        };

        receiver.stop().await;
        result
    }

    /// Sends the datagram from a short-lived socket, closed on return.
    async fn send_datagram(&self, target: SocketAddr) -> Result<(), HealthCheckError> {
        let family = IcmpFamily::from(target.ip());
        let socket = UdpSocket::bind(SocketAddr::new(unspecified_addr(family), 0))
            .await
            .map_err(HealthCheckError::SocketCreation)?;
        socket
            .send_to(self.send_payload(), target)
            .await
            .map_err(|source| HealthCheckError::Io {
                context: "failed to send UDP datagram",
                source,
            })?;
        debug!(%target, "Sent UDP datagram, watching for unreachable messages");
        Ok(())
    }

    async fn watch_unreachable(
        &self,
        receiver: &mut PacketReceiver,
        family: IcmpFamily,
        target: SocketAddr,
    ) -> Result<(), HealthCheckError> {
        let deadline = sleep(self.options.timeout());
        tokio::pin!(deadline);

        loop {
            let packet = tokio::select! {
                _ = &mut deadline => {
                    trace!(%target, "No unreachable message received");
                    return Ok(());
                }
                packet = receiver.recv() => packet,
            };

            let packet = match packet {
                Some(Ok(packet)) => packet,
                Some(Err(source)) => {
                    return Err(HealthCheckError::Io {
                        context: "failed to read ICMP message",
                        source,
                    })
                }
                None => {
                    return Err(HealthCheckError::Internal(
                        "ICMP receive loop ended unexpectedly".to_string(),
                    ))
                }
            };

            match parse_icmp(family, packet.bytes()) {
                Ok(IcmpMessage::DestinationUnreachable {
                    reason,
                    original: Some(original),
                }) => {
                    if let Some(err) = match_unreachable(target, reason, &original) {
                        debug!(%target, %reason, "Received matching Destination Unreachable");
                        return Err(err);
                    }
                    trace!(
                        %target,
                        destination = %original.destination,
                        "Ignored Destination Unreachable for another datagram"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    trace!(peer = %packet.peer, error = %err, "Failed to parse ICMP message");
                }
            }
        }
    }
}

impl fmt::Display for UdpHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UdpHealthCheck")
    }
}

impl fmt::Debug for UdpHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpHealthCheck")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HealthChecker for UdpHealthCheck {
    async fn check(&self, host: &str) -> Result<(), HealthCheckError> {
        if self.options.receive.is_empty() {
            self.check_icmp_udp(host).await
        } else {
            self.check_with_receive(host).await
        }
    }
}
