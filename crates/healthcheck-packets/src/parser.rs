//! ICMP message building and parsing using etherparse.

use crate::PacketError;
use etherparse::{
    IcmpEchoHeader, Icmpv4Header, Icmpv4Slice, Icmpv4Type, Icmpv6Header, Icmpv6Slice, Icmpv6Type,
    IpNumber, Ipv4HeaderSlice, Ipv6HeaderSlice,
};
use healthcheck_core::{IcmpFamily, UnreachableReason};
use std::net::IpAddr;

const IPV6_HEADER_LEN: usize = 40;

/// UDP header info parsed from an ICMP payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpInfo {
    /// Source port.
    pub src_port: u16,
    /// Destination port.
    pub dst_port: u16,
    /// UDP length.
    pub length: u16,
    /// UDP checksum.
    pub checksum: u16,
}

/// Leading headers of the datagram that triggered an ICMP error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalDatagram {
    /// Destination of the original IP packet.
    pub destination: IpAddr,
    /// UDP header of the original packet, when it carried UDP.
    pub udp: Option<UdpInfo>,
}

/// ICMP message kinds the probes care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcmpMessage {
    EchoReply {
        identifier: u16,
        sequence: u16,
    },
    DestinationUnreachable {
        reason: UnreachableReason,
        /// `None` when the embedded IP header could not be decoded.
        original: Option<OriginalDatagram>,
    },
    Other {
        icmp_type: u8,
        code: u8,
    },
}

/// Parse the first 8 bytes of a UDP header from an ICMP payload.
pub fn parse_udp_first_bytes(buf: &[u8]) -> Result<UdpInfo, PacketError> {
    if buf.len() < 8 {
        return Err(PacketError::PacketTooShort {
            expected: 8,
            actual: buf.len(),
        });
    }

    Ok(UdpInfo {
        src_port: u16::from_be_bytes([buf[0], buf[1]]),
        dst_port: u16::from_be_bytes([buf[2], buf[3]]),
        length: u16::from_be_bytes([buf[4], buf[5]]),
        checksum: u16::from_be_bytes([buf[6], buf[7]]),
    })
}

/// Builds an Echo Request message (without IP header).
///
/// The ICMPv4 checksum is computed here; the kernel fills in the ICMPv6 one.
pub fn build_echo_request(
    family: IcmpFamily,
    identifier: u16,
    sequence: u16,
    payload: &[u8],
) -> Vec<u8> {
    let echo = IcmpEchoHeader {
        id: identifier,
        seq: sequence,
    };
    let mut packet = match family {
        IcmpFamily::V4 => {
            Icmpv4Header::with_checksum(Icmpv4Type::EchoRequest(echo), payload)
                .to_bytes()
                .to_vec()
        }
        IcmpFamily::V6 => Icmpv6Header::new(Icmpv6Type::EchoRequest(echo))
            .to_bytes()
            .to_vec(),
    };
    packet.extend_from_slice(payload);
    packet
}

/// Parses an ICMP message read from a socket of the given family.
///
/// Raw IPv4 sockets (and datagram sockets on some platforms) hand over the
/// IPv4 header too; it is skipped when present.
pub fn parse_icmp(family: IcmpFamily, data: &[u8]) -> Result<IcmpMessage, PacketError> {
    match family {
        IcmpFamily::V4 => parse_icmpv4(strip_ipv4_header(data)?),
        IcmpFamily::V6 => parse_icmpv6(data),
    }
}

/// No ICMP type has 4 in its high nibble, so such a first byte is an IPv4
/// header.
fn strip_ipv4_header(data: &[u8]) -> Result<&[u8], PacketError> {
    match data.first() {
        Some(first) if first >> 4 == 4 => {
            let header = Ipv4HeaderSlice::from_slice(data).map_err(|e| {
                PacketError::PacketParseFailed {
                    layer: "IPv4",
                    reason: e.to_string(),
                }
            })?;
            Ok(&data[header.slice().len()..])
        }
        _ => Ok(data),
    }
}

fn parse_icmpv4(data: &[u8]) -> Result<IcmpMessage, PacketError> {
    let icmp = Icmpv4Slice::from_slice(data).map_err(|e| PacketError::PacketParseFailed {
        layer: "ICMPv4",
        reason: e.to_string(),
    })?;

    Ok(match icmp.icmp_type() {
        Icmpv4Type::EchoReply(echo) => IcmpMessage::EchoReply {
            identifier: echo.id,
            sequence: echo.seq,
        },
        Icmpv4Type::DestinationUnreachable(_) => IcmpMessage::DestinationUnreachable {
            reason: UnreachableReason::from_icmpv4_code(icmp.code_u8()),
            original: parse_original_ipv4(icmp.payload()),
        },
        _ => IcmpMessage::Other {
            icmp_type: icmp.type_u8(),
            code: icmp.code_u8(),
        },
    })
}

fn parse_icmpv6(data: &[u8]) -> Result<IcmpMessage, PacketError> {
    let icmp = Icmpv6Slice::from_slice(data).map_err(|e| PacketError::PacketParseFailed {
        layer: "ICMPv6",
        reason: e.to_string(),
    })?;

    Ok(match icmp.icmp_type() {
        Icmpv6Type::EchoReply(echo) => IcmpMessage::EchoReply {
            identifier: echo.id,
            sequence: echo.seq,
        },
        Icmpv6Type::DestinationUnreachable(_) => IcmpMessage::DestinationUnreachable {
            reason: UnreachableReason::from_icmpv6_code(icmp.code_u8()),
            original: parse_original_ipv6(icmp.payload()),
        },
        _ => IcmpMessage::Other {
            icmp_type: icmp.type_u8(),
            code: icmp.code_u8(),
        },
    })
}

fn parse_original_ipv4(payload: &[u8]) -> Option<OriginalDatagram> {
    let header = Ipv4HeaderSlice::from_slice(payload).ok()?;
    let udp = if header.protocol() == IpNumber::UDP {
        parse_udp_first_bytes(&payload[header.slice().len()..]).ok()
    } else {
        None
    };
    Some(OriginalDatagram {
        destination: IpAddr::V4(header.destination_addr()),
        udp,
    })
}

fn parse_original_ipv6(payload: &[u8]) -> Option<OriginalDatagram> {
    let header = Ipv6HeaderSlice::from_slice(payload).ok()?;
    let udp = if header.next_header() == IpNumber::UDP {
        parse_udp_first_bytes(&payload[IPV6_HEADER_LEN..]).ok()
    } else {
        None
    };
    Some(OriginalDatagram {
        destination: IpAddr::V6(header.destination_addr()),
        udp,
    })
}
