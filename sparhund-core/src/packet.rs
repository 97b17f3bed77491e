//! ## sparhund-core::packet
//! Normalized representation of one decoded packet.
//!
//! Each layer is an enum with one variant per protocol the dissectors
//! understand, so "does this packet carry TCP" is a pattern match. A packet
//! carries at most one transport variant, while the layers themselves stack
//! freely (a packet is both `Ipv4` and `Tcp`).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldAbsent;

/// Protocols a packet can be tested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Ethernet,
    Dot11,
    Dot11Beacon,
    Arp,
    Ipv4,
    Tcp,
    Udp,
    Icmp,
    Dns,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ethernet => "ethernet",
            Protocol::Dot11 => "802.11",
            Protocol::Dot11Beacon => "802.11 beacon",
            Protocol::Arp => "arp",
            Protocol::Ipv4 => "ipv4",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::Dns => "dns",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 48-bit link-layer address, rendered as `aa:bb:cc:dd:ee:ff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Reads an address from the first six bytes of `data`.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(Self(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid link-layer address: {0}")]
pub struct MacParseError(String);

impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| MacParseError(s.to_string()))?;
            if part.len() != 2 {
                return Err(MacParseError(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(MacParseError(s.to_string()));
        }
        Ok(Self(octets))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// TCP control bits. Also used as a mask for flag filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    pub const FIN: TcpFlags = TcpFlags(0x01);
    pub const SYN: TcpFlags = TcpFlags(0x02);
    pub const RST: TcpFlags = TcpFlags(0x04);
    pub const PSH: TcpFlags = TcpFlags(0x08);
    pub const ACK: TcpFlags = TcpFlags(0x10);
    pub const URG: TcpFlags = TcpFlags(0x20);
    pub const ECE: TcpFlags = TcpFlags(0x40);
    pub const CWR: TcpFlags = TcpFlags(0x80);

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// True when any bit of `mask` is set.
    pub fn intersects(&self, mask: TcpFlags) -> bool {
        self.0 & mask.0 != 0
    }

    /// True when every bit of `mask` is set.
    pub fn contains(&self, mask: TcpFlags) -> bool {
        self.0 & mask.0 == mask.0
    }

    /// A connection opener: SYN without ACK.
    pub fn is_syn_only(&self) -> bool {
        self.contains(TcpFlags::SYN) && !self.intersects(TcpFlags::ACK)
    }
}

impl std::ops::BitOr for TcpFlags {
    type Output = TcpFlags;

    fn bitor(self, rhs: TcpFlags) -> TcpFlags {
        TcpFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetHeader {
    pub source: MacAddr,
    pub destination: MacAddr,
    pub ethertype: u16,
    /// 802.1Q VLAN identifier, if the frame was tagged.
    pub vlan: Option<u16>,
}

/// A tagged information element from an 802.11 management body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: u8,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconBody {
    pub timestamp: u64,
    pub interval: u16,
    pub capabilities: u16,
    pub elements: Vec<InformationElement>,
}

impl BeaconBody {
    pub const ELEMENT_SSID: u8 = 0;
    pub const ELEMENT_DS_PARAMETER: u8 = 3;
    pub const ELEMENT_POWER_CONSTRAINT: u8 = 32;

    /// First element carrying `id`.
    pub fn element(&self, id: u8) -> Option<&InformationElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn ssid(&self) -> Option<&[u8]> {
        self.element(Self::ELEMENT_SSID).map(|e| e.data.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot11Frame {
    pub frame_type: u8,
    pub subtype: u8,
    pub flags: u8,
    /// addr1
    pub receiver: MacAddr,
    /// addr2, absent on short control frames.
    pub transmitter: Option<MacAddr>,
    /// addr3
    pub bssid: Option<MacAddr>,
    pub beacon: Option<BeaconBody>,
}

impl Dot11Frame {
    pub const TYPE_MANAGEMENT: u8 = 0;
    pub const TYPE_CONTROL: u8 = 1;
    pub const TYPE_DATA: u8 = 2;
    pub const SUBTYPE_BEACON: u8 = 8;

    pub fn is_management(&self) -> bool {
        self.frame_type == Self::TYPE_MANAGEMENT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet(EthernetHeader),
    Dot11(Dot11Frame),
    /// Capture without a link header (raw IP).
    Raw,
    Unsupported(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub protocol: u8,
    pub ttl: u8,
    pub total_length: u16,
    /// Fragment offset in 8-byte units.
    pub fragment_offset: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpPacket {
    pub operation: u16,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkLayer {
    Ipv4(Ipv4Header),
    Arp(ArpPacket),
    /// Known link, unsupported network protocol (carries the ethertype).
    Other(u16),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSegment {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence: u32,
    pub acknowledgement: u32,
    pub flags: TcpFlags,
    pub window: u16,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDatagram {
    pub source_port: u16,
    pub destination_port: u16,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpMessage {
    pub icmp_type: u8,
    pub code: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportLayer {
    Tcp(TcpSegment),
    Udp(UdpDatagram),
    Icmp(IcmpMessage),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    /// Dotted name as raw bytes, including the trailing root dot.
    pub name: Bytes,
    pub qtype: u16,
    pub qclass: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    pub id: u16,
    pub is_response: bool,
    pub opcode: u8,
    pub rcode: u8,
    pub questions: Vec<DnsQuestion>,
    pub answer_count: u16,
}

impl DnsMessage {
    pub const RCODE_NOERROR: u8 = 0;
    pub const RCODE_NXDOMAIN: u8 = 3;

    pub fn is_nxdomain(&self) -> bool {
        self.is_response && self.rcode == Self::RCODE_NXDOMAIN
    }

    pub fn first_question(&self) -> Option<&DnsQuestion> {
        self.questions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationLayer {
    Dns(DnsMessage),
    None,
}

/// One decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Capture timestamp in microseconds since the Unix epoch.
    pub timestamp_us: u64,
    /// Original frame length on the wire.
    pub wire_length: usize,
    pub link: LinkLayer,
    pub network: NetworkLayer,
    pub transport: TransportLayer,
    pub application: ApplicationLayer,
}

impl Packet {
    /// Capability check, independent of the other layers present.
    pub fn has(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Ethernet => matches!(self.link, LinkLayer::Ethernet(_)),
            Protocol::Dot11 => matches!(self.link, LinkLayer::Dot11(_)),
            Protocol::Dot11Beacon => {
                matches!(&self.link, LinkLayer::Dot11(frame) if frame.beacon.is_some())
            }
            Protocol::Arp => matches!(self.network, NetworkLayer::Arp(_)),
            Protocol::Ipv4 => matches!(self.network, NetworkLayer::Ipv4(_)),
            Protocol::Tcp => matches!(self.transport, TransportLayer::Tcp(_)),
            Protocol::Udp => matches!(self.transport, TransportLayer::Udp(_)),
            Protocol::Icmp => matches!(self.transport, TransportLayer::Icmp(_)),
            Protocol::Dns => matches!(self.application, ApplicationLayer::Dns(_)),
        }
    }

    pub fn ethernet(&self) -> Result<&EthernetHeader, FieldAbsent> {
        match &self.link {
            LinkLayer::Ethernet(header) => Ok(header),
            _ => Err(FieldAbsent::new(Protocol::Ethernet)),
        }
    }

    pub fn dot11(&self) -> Result<&Dot11Frame, FieldAbsent> {
        match &self.link {
            LinkLayer::Dot11(frame) => Ok(frame),
            _ => Err(FieldAbsent::new(Protocol::Dot11)),
        }
    }

    pub fn beacon(&self) -> Result<&BeaconBody, FieldAbsent> {
        self.dot11()?
            .beacon
            .as_ref()
            .ok_or(FieldAbsent::new(Protocol::Dot11Beacon))
    }

    pub fn ipv4(&self) -> Result<&Ipv4Header, FieldAbsent> {
        match &self.network {
            NetworkLayer::Ipv4(header) => Ok(header),
            _ => Err(FieldAbsent::new(Protocol::Ipv4)),
        }
    }

    pub fn arp(&self) -> Result<&ArpPacket, FieldAbsent> {
        match &self.network {
            NetworkLayer::Arp(arp) => Ok(arp),
            _ => Err(FieldAbsent::new(Protocol::Arp)),
        }
    }

    pub fn tcp(&self) -> Result<&TcpSegment, FieldAbsent> {
        match &self.transport {
            TransportLayer::Tcp(segment) => Ok(segment),
            _ => Err(FieldAbsent::new(Protocol::Tcp)),
        }
    }

    pub fn udp(&self) -> Result<&UdpDatagram, FieldAbsent> {
        match &self.transport {
            TransportLayer::Udp(datagram) => Ok(datagram),
            _ => Err(FieldAbsent::new(Protocol::Udp)),
        }
    }

    pub fn icmp(&self) -> Result<&IcmpMessage, FieldAbsent> {
        match &self.transport {
            TransportLayer::Icmp(message) => Ok(message),
            _ => Err(FieldAbsent::new(Protocol::Icmp)),
        }
    }

    pub fn dns(&self) -> Result<&DnsMessage, FieldAbsent> {
        match &self.application {
            ApplicationLayer::Dns(message) => Ok(message),
            ApplicationLayer::None => Err(FieldAbsent::new(Protocol::Dns)),
        }
    }

    /// TCP or UDP payload. An empty payload is `Ok` with zero length.
    pub fn payload(&self) -> Result<&Bytes, FieldAbsent> {
        match &self.transport {
            TransportLayer::Tcp(segment) => Ok(&segment.payload),
            TransportLayer::Udp(datagram) => Ok(&datagram.payload),
            _ => Err(FieldAbsent::either(Protocol::Tcp, Protocol::Udp)),
        }
    }

    /// `(source_port, destination_port)` for TCP and UDP.
    pub fn ports(&self) -> Option<(u16, u16)> {
        match &self.transport {
            TransportLayer::Tcp(s) => Some((s.source_port, s.destination_port)),
            TransportLayer::Udp(d) => Some((d.source_port, d.destination_port)),
            _ => None,
        }
    }
}
