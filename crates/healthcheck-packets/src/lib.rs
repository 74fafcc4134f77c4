//! Packet I/O for the ICMP based health checks.
//!
//! Provides ICMP sockets, the background receive loop that feeds a bounded
//! queue, and the parser decoding echo replies and destination unreachable
//! messages.

pub mod error;
pub mod parser;
pub mod receive;
pub mod socket;

pub use error::PacketError;
pub use parser::{
    build_echo_request, parse_icmp, parse_udp_first_bytes, IcmpMessage, OriginalDatagram, UdpInfo,
};
pub use receive::{PacketReceiver, ProbePacket, READ_BUFFER_SIZE, RECEIVE_QUEUE_CAPACITY};
pub use socket::{unspecified_addr, IcmpSocket, SocketKind};
