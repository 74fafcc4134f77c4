//! ICMP echo health check.

use crate::options::IcmpOptions;
use async_trait::async_trait;
use healthcheck_core::{
    resolve_first, split_host_port, HealthCheckError, HealthChecker, IcmpFamily, SeedCounter,
};
use healthcheck_packets::{
    build_echo_request, parse_icmp, IcmpMessage, IcmpSocket, PacketReceiver,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{debug, trace};

/// Sequence number of the single echo request sent per check.
pub const ECHO_SEQUENCE: u16 = 1;

/// Payload of the echo request.
pub const ECHO_PAYLOAD: &[u8] = b"ping";

/// Checks that a host answers an ICMP Echo Request.
///
/// Any port in the checked address is ignored. Each check uses its own socket
/// and a fresh identifier drawn from a random source private to this checker.
pub struct IcmpHealthCheck {
    options: IcmpOptions,
    rng: Mutex<StdRng>,
}

impl IcmpHealthCheck {
    /// Creates a checker seeded from the process-wide [`SeedCounter`].
    pub fn new(options: IcmpOptions) -> Self {
        Self::with_seed_counter(options, &SeedCounter::global())
    }

    /// Creates a checker seeded from `seeds`.
    pub fn with_seed_counter(options: IcmpOptions, seeds: &SeedCounter) -> Self {
        Self {
            options,
            rng: Mutex::new(StdRng::seed_from_u64(seeds.next_seed())),
        }
    }

    pub fn options(&self) -> &IcmpOptions {
        &self.options
    }

    fn next_identifier(&self) -> u16 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..u16::MAX)
    }

    /// Sends one echo request to `ip` and waits for the matching reply.
    pub async fn ping(&self, ip: IpAddr) -> Result<(), HealthCheckError> {
        let family = IcmpFamily::from(ip);
        let (socket, identifier) = IcmpSocket::open_echo(family, self.next_identifier())?;
        let socket = Arc::new(socket);

        let request = build_echo_request(family, identifier, ECHO_SEQUENCE, ECHO_PAYLOAD);
        let mut receiver = PacketReceiver::spawn(Arc::clone(&socket), self.options.delay());

        debug!(%ip, identifier, kind = ?socket.kind(), "Sending ICMP Echo Request");
        let result = match socket.send_to(&request, ip).await {
            Ok(_) => self.wait_for_reply(&mut receiver, family, ip, identifier).await,
            Err(source) => Err(HealthCheckError::Io {
                context: "failed to send ICMP Echo Request",
                source,
            }),
        };

        receiver.stop().await;
        result
    }

    async fn wait_for_reply(
        &self,
        receiver: &mut PacketReceiver,
        family: IcmpFamily,
        ip: IpAddr,
        identifier: u16,
    ) -> Result<(), HealthCheckError> {
        let deadline = sleep(self.options.timeout());
        tokio::pin!(deadline);
        let mut previous: Option<HealthCheckError> = None;

        loop {
            let packet = tokio::select! {
                _ = &mut deadline => {
                    return Err(HealthCheckError::Timeout {
                        previous: previous.map(|err| err.to_string()),
                    });
                }
                packet = receiver.recv() => packet,
            };

            let packet = match packet {
                Some(Ok(packet)) => packet,
                Some(Err(source)) => {
                    return Err(HealthCheckError::Io {
                        context: "failed to read ICMP reply",
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
                Ok(IcmpMessage::EchoReply {
                    identifier: id,
                    sequence,
                }) => {
                    if packet.peer == ip && id == identifier {
                        trace!(%ip, identifier, sequence, "Received matching ICMP Echo Reply");
                        return Ok(());
                    }
                    trace!(
                        peer = %packet.peer,
                        expected = identifier,
                        actual = id,
                        "Ignored ICMP Echo Reply for another probe"
                    );
                    previous = Some(HealthCheckError::InvalidEchoReply);
                }
                Ok(other) => {
                    trace!(peer = %packet.peer, message = ?other, "Ignored ICMP message");
                }
                Err(err) => {
                    trace!(peer = %packet.peer, error = %err, "Failed to parse ICMP message");
                    previous = Some(err.into());
                }
            }
        }
    }
}

impl fmt::Display for IcmpHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IcmpHealthCheck")
    }
}

impl fmt::Debug for IcmpHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcmpHealthCheck")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HealthChecker for IcmpHealthCheck {
    async fn check(&self, host: &str) -> Result<(), HealthCheckError> {
        let (host, _) = split_host_port(host)?;
        let ip = resolve_first(&host).await?;

        self.ping(ip).await.map_err(|err| HealthCheckError::Ping {
            ip,
            source: Box::new(err),
        })
    }
}
