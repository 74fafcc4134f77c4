//! ICMP sockets for sending probes and listening for replies.

use healthcheck_core::{HealthCheckError, IcmpFamily};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// How an ICMP socket was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    /// Unprivileged "ping" socket (`SOCK_DGRAM`, `IPPROTO_ICMP`).
    Datagram,
    /// Raw socket, sees every ICMP message reaching the host.
    Raw,
}

/// ICMP socket registered with the tokio reactor.
///
/// Closed when the last owner drops it.
#[derive(Debug)]
pub struct IcmpSocket {
    inner: UdpSocket,
    family: IcmpFamily,
    kind: SocketKind,
}

impl IcmpSocket {
    /// Opens an ICMP socket of the given kind.
    pub fn open(family: IcmpFamily, kind: SocketKind) -> Result<Self, HealthCheckError> {
        let socket = new_socket(family, kind).map_err(HealthCheckError::SocketCreation)?;
        Self::register(socket, family, kind)
    }

    /// Opens a socket for an echo exchange using `identifier`.
    ///
    /// Tries an unprivileged datagram socket first and falls back to a raw
    /// socket. Some kernels rewrite the echo identifier of datagram sockets,
    /// so the identifier that replies will carry is returned alongside.
    pub fn open_echo(family: IcmpFamily, identifier: u16) -> Result<(Self, u16), HealthCheckError> {
        match new_socket(family, SocketKind::Datagram) {
            Ok(socket) => {
                let identifier = bind_identifier(&socket, family, identifier)
                    .map_err(HealthCheckError::SocketCreation)?;
                let socket = Self::register(socket, family, SocketKind::Datagram)?;
                Ok((socket, identifier))
            }
            Err(err) => {
                debug!(%family, error = %err, "Datagram ICMP socket unavailable, using raw socket");
                Ok((Self::open(family, SocketKind::Raw)?, identifier))
            }
        }
    }

    /// Opens a raw socket that receives ICMP control messages, such as
    /// Destination Unreachable, for any traffic of the host.
    pub fn open_listener(family: IcmpFamily) -> Result<Self, HealthCheckError> {
        Self::open(family, SocketKind::Raw)
    }

    fn register(socket: Socket, family: IcmpFamily, kind: SocketKind) -> Result<Self, HealthCheckError> {
        let std_socket: std::net::UdpSocket = socket.into();
        let inner = UdpSocket::from_std(std_socket).map_err(HealthCheckError::SocketCreation)?;
        trace!(%family, ?kind, "Opened ICMP socket");
        Ok(Self {
            inner,
            family,
            kind,
        })
    }

    pub fn family(&self) -> IcmpFamily {
        self.family
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    /// Sends one ICMP message to `ip`.
    pub async fn send_to(&self, buf: &[u8], ip: IpAddr) -> io::Result<usize> {
        self.inner.send_to(buf, SocketAddr::new(ip, 0)).await
    }

    /// Receives one ICMP message and the address of its sender.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        let (n, peer) = self.inner.recv_from(buf).await?;
        Ok((n, peer.ip()))
    }
}

fn new_socket(family: IcmpFamily, kind: SocketKind) -> io::Result<Socket> {
    let (domain, protocol) = match family {
        IcmpFamily::V4 => (Domain::IPV4, Protocol::ICMPV4),
        IcmpFamily::V6 => (Domain::IPV6, Protocol::ICMPV6),
    };
    let ty = match kind {
        SocketKind::Datagram => Type::DGRAM,
        SocketKind::Raw => Type::RAW,
    };
    let socket = Socket::new(domain, ty, Some(protocol))?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Binds a datagram ICMP socket so the kernel uses `identifier` as the echo
/// identifier, and returns the identifier actually in effect.
fn bind_identifier(socket: &Socket, family: IcmpFamily, identifier: u16) -> io::Result<u16> {
    let unspecified = unspecified_addr(family);
    match socket.bind(&SocketAddr::new(unspecified, identifier).into()) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
            trace!(identifier, "Echo identifier in use, letting the kernel pick one");
            socket.bind(&SocketAddr::new(unspecified, 0).into())?;
        }
        Err(err) => return Err(err),
    }

    let bound = socket
        .local_addr()?
        .as_socket()
        .map(|addr| addr.port())
        .unwrap_or(0);
    Ok(if bound == 0 { identifier } else { bound })
}

/// Wildcard address of a family.
pub fn unspecified_addr(family: IcmpFamily) -> IpAddr {
    match family {
        IcmpFamily::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IcmpFamily::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    }
}
