//! ## sparhund-protocols::ethernet
//! Ethernet II (optionally 802.1Q tagged) headers and ARP.
//!
//! Header bytes are decoded by etherparse; this module maps its slices onto
//! the packet model. ARP is not covered by etherparse and is read here.

use std::net::Ipv4Addr;

use etherparse::{Ethernet2Slice, VlanSlice};
use sparhund_core::packet::{ArpPacket, EthernetHeader};
use sparhund_core::MacAddr;

use crate::error::DissectError;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;

const ARP_LEN: usize = 28;

/// Ethernet header plus the innermost ethertype and its payload.
pub fn header<'a>(
    ethernet: &Ethernet2Slice<'a>,
    vlan: Option<&'a VlanSlice<'a>>,
) -> (EthernetHeader, &'a [u8]) {
    let (vlan_id, ethertype, payload) = match vlan {
        Some(VlanSlice::SingleVlan(tag)) => (
            Some(tag.vlan_identifier().value()),
            tag.ether_type().0,
            tag.payload_slice(),
        ),
        Some(VlanSlice::DoubleVlan(tags)) => {
            let inner = tags.inner();
            (
                Some(tags.outer().vlan_identifier().value()),
                inner.ether_type().0,
                inner.payload_slice(),
            )
        }
        None => (None, ethernet.ether_type().0, ethernet.payload_slice()),
    };

    (
        EthernetHeader {
            source: MacAddr::new(ethernet.source()),
            destination: MacAddr::new(ethernet.destination()),
            ethertype,
            vlan: vlan_id,
        },
        payload,
    )
}

/// Parses an Ethernet/IPv4 ARP message.
pub fn parse_arp(data: &[u8]) -> Result<ArpPacket, DissectError> {
    DissectError::ensure("arp", data, ARP_LEN)?;

    let hardware_type = u16::from_be_bytes([data[0], data[1]]);
    let protocol_type = u16::from_be_bytes([data[2], data[3]]);
    if hardware_type != 1 || protocol_type != ETHERTYPE_IPV4 || data[4] != 6 || data[5] != 4 {
        return Err(DissectError::Malformed {
            layer: "arp",
            reason: "not an Ethernet/IPv4 mapping",
        });
    }

    Ok(ArpPacket {
        operation: u16::from_be_bytes([data[6], data[7]]),
        sender_mac: MacAddr::from_slice(&data[8..14]).unwrap_or_default(),
        sender_ip: Ipv4Addr::new(data[14], data[15], data[16], data[17]),
        target_mac: MacAddr::from_slice(&data[18..24]).unwrap_or_default(),
        target_ip: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
    })
}
