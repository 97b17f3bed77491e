//! ## sparhund-protocols::dissect
//! Layer-by-layer dissection of one captured frame into a [`Packet`].
//!
//! Dissection never discards a frame. Layers decoded before a failure are
//! kept on the packet and the failure is returned next to it.

use bytes::Bytes;
use etherparse::err::ip::LaxHeaderSliceError;
use etherparse::{LaxNetSlice, LaxSlicedPacket, LinkSlice};
use sparhund_core::packet::{ApplicationLayer, LinkLayer, NetworkLayer, TransportLayer};
use sparhund_core::Packet;

use crate::error::DissectError;
use crate::ethernet::{self, ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_IPV6};
use crate::{dns, dot11, ipv4, radiotap, transport};

/// Capture link types understood by [`dissect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linktype {
    Ethernet,
    RawIp,
    Ieee80211,
    Ieee80211Radiotap,
    Unsupported(i32),
}

impl Linktype {
    pub const ETHERNET: i32 = 1;
    pub const RAW: i32 = 101;
    /// BSD value of DLT_RAW, found in older captures.
    pub const RAW_BSD: i32 = 12;
    pub const IEEE802_11: i32 = 105;
    pub const IEEE802_11_RADIOTAP: i32 = 127;

    pub fn from_raw(value: i32) -> Self {
        match value {
            Self::ETHERNET => Linktype::Ethernet,
            Self::RAW | Self::RAW_BSD => Linktype::RawIp,
            Self::IEEE802_11 => Linktype::Ieee80211,
            Self::IEEE802_11_RADIOTAP => Linktype::Ieee80211Radiotap,
            other => Linktype::Unsupported(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            Linktype::Ethernet => Self::ETHERNET,
            Linktype::RawIp => Self::RAW,
            Linktype::Ieee80211 => Self::IEEE802_11,
            Linktype::Ieee80211Radiotap => Self::IEEE802_11_RADIOTAP,
            Linktype::Unsupported(value) => *value,
        }
    }
}

/// A packet together with the error that stopped its dissection, if any.
#[derive(Debug, Clone)]
pub struct Dissected {
    pub packet: Packet,
    pub error: Option<DissectError>,
}

/// Dissects `data` captured on `linktype`. `wire_length` on the returned
/// packet is the captured length; callers reading from a capture file
/// should overwrite it with the original length.
pub fn dissect(linktype: Linktype, timestamp_us: u64, data: Bytes) -> Dissected {
    let mut packet = Packet {
        timestamp_us,
        wire_length: data.len(),
        link: LinkLayer::Unsupported(linktype.raw()),
        network: NetworkLayer::None,
        transport: TransportLayer::None,
        application: ApplicationLayer::None,
    };
    let error = dissect_link(&mut packet, linktype, data).err();
    Dissected { packet, error }
}

fn dissect_link(packet: &mut Packet, linktype: Linktype, data: Bytes) -> Result<(), DissectError> {
    match linktype {
        Linktype::Ethernet => {
            let sliced = LaxSlicedPacket::from_ethernet(&data)
                .map_err(|e| DissectError::from_len("ethernet", &e))?;
            let Some(LinkSlice::Ethernet2(frame)) = &sliced.link else {
                return Ok(());
            };
            let (header, payload) = ethernet::header(frame, sliced.vlan.as_ref());
            let ethertype = header.ethertype;
            packet.link = LinkLayer::Ethernet(header);
            match ethertype {
                ETHERTYPE_ARP => {
                    packet.network = NetworkLayer::Arp(ethernet::parse_arp(payload)?);
                    Ok(())
                }
                _ => dissect_sliced(packet, &data, &sliced, ethertype),
            }
        }
        Linktype::RawIp => {
            packet.link = LinkLayer::Raw;
            dissect_ip(packet, &data)
        }
        Linktype::Ieee80211 => dissect_dot11(packet, data),
        Linktype::Ieee80211Radiotap => {
            let frame = radiotap::parse(&data)?;
            dissect_dot11(packet, frame)
        }
        Linktype::Unsupported(_) => Ok(()),
    }
}

fn dissect_dot11(packet: &mut Packet, data: Bytes) -> Result<(), DissectError> {
    let dissection = dot11::parse(&data)?;
    packet.link = LinkLayer::Dot11(dissection.frame);
    match dissection.encapsulated {
        Some((ETHERTYPE_IPV4, payload)) => dissect_ip(packet, &payload),
        Some((ETHERTYPE_ARP, payload)) => {
            packet.network = NetworkLayer::Arp(ethernet::parse_arp(&payload)?);
            Ok(())
        }
        Some((other, _)) => {
            packet.network = NetworkLayer::Other(other);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Dissects a buffer starting at an IPv4 or IPv6 header.
fn dissect_ip(packet: &mut Packet, data: &Bytes) -> Result<(), DissectError> {
    match LaxSlicedPacket::from_ip(data) {
        Ok(sliced) => dissect_sliced(packet, data, &sliced, ETHERTYPE_IPV4),
        Err(LaxHeaderSliceError::Len(e)) => Err(DissectError::from_len("ip", &e)),
        Err(LaxHeaderSliceError::Content(e)) => Err(DissectError::InvalidHeader {
            layer: "ip",
            reason: e.to_string(),
        }),
    }
}

/// Copies the network and transport layers etherparse decoded into
/// `packet`, then reports where slicing stopped.
fn dissect_sliced(
    packet: &mut Packet,
    data: &Bytes,
    sliced: &LaxSlicedPacket<'_>,
    ethertype: u16,
) -> Result<(), DissectError> {
    match &sliced.net {
        Some(LaxNetSlice::Ipv4(ip)) => {
            let header = ipv4::header(&ip.header());
            let first_fragment = header.fragment_offset == 0;
            packet.network = NetworkLayer::Ipv4(header);

            let payload = ip.payload();
            if payload.fragmented {
                if first_fragment {
                    packet.transport =
                        transport::first_fragment(data, payload.ip_number, payload.payload)?;
                }
                return dissect_application(packet);
            }
        }
        Some(LaxNetSlice::Ipv6(_)) => {
            packet.network = NetworkLayer::Other(ETHERTYPE_IPV6);
            return Ok(());
        }
        None if sliced.stop_err.is_none() => {
            packet.network = NetworkLayer::Other(ethertype);
            return Ok(());
        }
        None => {}
    }

    if let Some(slice) = &sliced.transport {
        packet.transport = transport::layer(data, slice);
    }
    if let Some((e, layer)) = &sliced.stop_err {
        return Err(DissectError::from_slice(e, *layer));
    }
    dissect_application(packet)
}

fn dissect_application(packet: &mut Packet) -> Result<(), DissectError> {
    match &packet.transport {
        TransportLayer::Tcp(segment) => {
            let carries_dns = !segment.payload.is_empty()
                && (dns::is_dns_port(segment.source_port)
                    || dns::is_dns_port(segment.destination_port));
            if carries_dns {
                packet.application = ApplicationLayer::Dns(dns::parse_tcp(&segment.payload)?);
            }
            Ok(())
        }
        TransportLayer::Udp(datagram) => {
            let carries_dns =
                dns::is_dns_port(datagram.source_port) || dns::is_dns_port(datagram.destination_port);
            if carries_dns {
                packet.application = ApplicationLayer::Dns(dns::parse(&datagram.payload)?);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
