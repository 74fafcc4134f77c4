//! Correlation of Destination Unreachable messages with a sent datagram.

use healthcheck_core::{HealthCheckError, UnreachableReason};
use healthcheck_packets::OriginalDatagram;
use std::net::SocketAddr;

/// Returns the failure reported by an unreachable message about `target`.
///
/// Net, host and protocol unreachable only need the embedded destination IP
/// to match. Any other reason also needs the embedded UDP destination port.
pub fn match_unreachable(
    target: SocketAddr,
    reason: UnreachableReason,
    original: &OriginalDatagram,
) -> Option<HealthCheckError> {
    if original.destination != target.ip() {
        return None;
    }

    let port_matches = original
        .udp
        .map_or(false, |udp| udp.dst_port == target.port());
    if reason.is_host_level() || port_matches {
        Some(HealthCheckError::Unreachable {
            ip: original.destination,
            reason,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck_packets::UdpInfo;
    use std::net::{IpAddr, Ipv4Addr};

    fn target() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)), 5353)
    }

    fn original(destination: Ipv4Addr, dst_port: Option<u16>) -> OriginalDatagram {
        OriginalDatagram {
            destination: IpAddr::V4(destination),
            udp: dst_port.map(|dst_port| UdpInfo {
                src_port: 40000,
                dst_port,
                length: 17,
                checksum: 0,
            }),
        }
    }

    #[test]
    fn test_port_unreachable_matches() {
        let err = match_unreachable(
            target(),
            UnreachableReason::Port,
            &original(Ipv4Addr::new(10, 0, 0, 9), Some(5353)),
        )
        .unwrap();
        assert_eq!(err.to_string(), "host 10.0.0.9, port unreachable");
    }

    #[test]
    fn test_port_unreachable_for_other_port_is_ignored() {
        assert!(match_unreachable(
            target(),
            UnreachableReason::Port,
            &original(Ipv4Addr::new(10, 0, 0, 9), Some(53)),
        )
        .is_none());
    }

    #[test]
    fn test_other_destination_is_ignored() {
        assert!(match_unreachable(
            target(),
            UnreachableReason::Host,
            &original(Ipv4Addr::new(10, 0, 0, 8), Some(5353)),
        )
        .is_none());
    }

    #[test]
    fn test_host_level_reason_ignores_port() {
        let err = match_unreachable(
            target(),
            UnreachableReason::Host,
            &original(Ipv4Addr::new(10, 0, 0, 9), None),
        )
        .unwrap();
        assert_eq!(err.to_string(), "host 10.0.0.9, host unreachable");

        let err = match_unreachable(
            target(),
            UnreachableReason::Protocol,
            &original(Ipv4Addr::new(10, 0, 0, 9), Some(1)),
        )
        .unwrap();
        assert_eq!(err.to_string(), "host 10.0.0.9, protocol unreachable");
    }

    #[test]
    fn test_unknown_code_needs_port() {
        assert!(match_unreachable(
            target(),
            UnreachableReason::Other(13),
            &original(Ipv4Addr::new(10, 0, 0, 9), None),
        )
        .is_none());

        let err = match_unreachable(
            target(),
            UnreachableReason::Other(13),
            &original(Ipv4Addr::new(10, 0, 0, 9), Some(5353)),
        )
        .unwrap();
        assert_eq!(err.to_string(), "host 10.0.0.9, unreachable (code 13)");
    }
}
