//! Core types shared by the health checkers.

use std::fmt;
use std::net::IpAddr;

/// ICMP address family a probe runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpFamily {
    /// ICMP over IPv4 (protocol 1).
    V4,
    /// ICMPv6 (next header 58).
    V6,
}

impl IcmpFamily {
    /// IP protocol number carrying the ICMP messages.
    pub fn protocol(self) -> u8 {
        match self {
            Self::V4 => 1,
            Self::V6 => 58,
        }
    }
}

impl From<IpAddr> for IcmpFamily {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

impl fmt::Display for IcmpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "icmp"),
            Self::V6 => write!(f, "icmpv6"),
        }
    }
}

/// Reason carried by an ICMP Destination Unreachable message.
///
/// ICMPv6 codes are folded onto the ICMPv4 table so both families report the
/// same reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachableReason {
    Net,
    Host,
    Protocol,
    Port,
    FragmentationNeeded,
    SourceRouteFailed,
    Other(u8),
}

impl UnreachableReason {
    /// Maps an ICMPv4 Destination Unreachable code.
    pub fn from_icmpv4_code(code: u8) -> Self {
        match code {
            0 => Self::Net,
            1 => Self::Host,
            2 => Self::Protocol,
            3 => Self::Port,
            4 => Self::FragmentationNeeded,
            5 => Self::SourceRouteFailed,
            other => Self::Other(other),
        }
    }

    /// Maps an ICMPv6 Destination Unreachable code.
    ///
    /// ICMPv6 numbers its codes differently, so the ICMPv4 "code <= 2 is host
    /// level" rule does not carry over: code 3 (address unreachable) becomes
    /// [`Self::Host`], while codes 1 (administratively prohibited) and 2
    /// (beyond scope) stay [`Self::Other`] and need a port match.
    pub fn from_icmpv6_code(code: u8) -> Self {
        match code {
            0 => Self::Net,
            3 => Self::Host,
            4 => Self::Port,
            other => Self::Other(other),
        }
    }

    /// True for net, host and protocol unreachable: these reject the whole
    /// host, not only the probed port.
    pub fn is_host_level(self) -> bool {
        matches!(self, Self::Net | Self::Host | Self::Protocol)
    }
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Net => write!(f, "net unreachable"),
            Self::Host => write!(f, "host unreachable"),
            Self::Protocol => write!(f, "protocol unreachable"),
            Self::Port => write!(f, "port unreachable"),
            Self::FragmentationNeeded => write!(f, "fragmentation needed and DF set"),
            Self::SourceRouteFailed => write!(f, "source route failed"),
            Self::Other(code) => write!(f, "unreachable (code {})", code),
        }
    }
}
