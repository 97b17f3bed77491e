//! Frame encoders, the inverse of the dissectors.
//!
//! Checksums are left at zero; nothing in Sparhund verifies them.

use std::net::Ipv4Addr;

use sparhund_core::{MacAddr, TcpFlags};

use crate::ethernet::{ETHERTYPE_ARP, ETHERTYPE_IPV4};
use crate::ipv4::{PROTOCOL_ICMP, PROTOCOL_TCP, PROTOCOL_UDP};

pub const DEFAULT_SOURCE_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
pub const DEFAULT_DESTINATION_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

pub fn ethernet(source: MacAddr, destination: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(14 + payload.len());
    frame.extend_from_slice(&destination.octets());
    frame.extend_from_slice(&source.octets());
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn ipv4(source: Ipv4Addr, destination: Ipv4Addr, protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_length = (20 + payload.len()) as u16;
    let mut packet = vec![0x45, 0x00];
    packet.extend_from_slice(&total_length.to_be_bytes());
    packet.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 64, protocol, 0x00, 0x00]);
    packet.extend_from_slice(&source.octets());
    packet.extend_from_slice(&destination.octets());
    packet.extend_from_slice(payload);
    packet
}

pub fn tcp(source_port: u16, destination_port: u16, flags: TcpFlags, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(20 + payload.len());
    segment.extend_from_slice(&source_port.to_be_bytes());
    segment.extend_from_slice(&destination_port.to_be_bytes());
    segment.extend_from_slice(&1u32.to_be_bytes());
    segment.extend_from_slice(&0u32.to_be_bytes());
    segment.extend_from_slice(&[0x50, flags.bits(), 0xff, 0xff, 0, 0, 0, 0]);
    segment.extend_from_slice(payload);
    segment
}

pub fn udp(source_port: u16, destination_port: u16, payload: &[u8]) -> Vec<u8> {
    let length = (8 + payload.len()) as u16;
    let mut datagram = Vec::with_capacity(8 + payload.len());
    datagram.extend_from_slice(&source_port.to_be_bytes());
    datagram.extend_from_slice(&destination_port.to_be_bytes());
    datagram.extend_from_slice(&length.to_be_bytes());
    datagram.extend_from_slice(&[0, 0]);
    datagram.extend_from_slice(payload);
    datagram
}

pub fn ethernet_tcp(
    source: Ipv4Addr,
    source_port: u16,
    destination: Ipv4Addr,
    destination_port: u16,
    flags: TcpFlags,
    payload: &[u8],
) -> Vec<u8> {
    let segment = tcp(source_port, destination_port, flags, payload);
    ethernet(
        DEFAULT_SOURCE_MAC,
        DEFAULT_DESTINATION_MAC,
        ETHERTYPE_IPV4,
        &ipv4(source, destination, PROTOCOL_TCP, &segment),
    )
}

pub fn ethernet_udp(
    source: Ipv4Addr,
    source_port: u16,
    destination: Ipv4Addr,
    destination_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let datagram = udp(source_port, destination_port, payload);
    ethernet(
        DEFAULT_SOURCE_MAC,
        DEFAULT_DESTINATION_MAC,
        ETHERTYPE_IPV4,
        &ipv4(source, destination, PROTOCOL_UDP, &datagram),
    )
}

pub fn ethernet_icmp(source: Ipv4Addr, destination: Ipv4Addr, icmp_type: u8) -> Vec<u8> {
    ethernet(
        DEFAULT_SOURCE_MAC,
        DEFAULT_DESTINATION_MAC,
        ETHERTYPE_IPV4,
        &ipv4(source, destination, PROTOCOL_ICMP, &[icmp_type, 0, 0, 0, 0, 0, 0, 0]),
    )
}

pub fn ethernet_arp(sender: Ipv4Addr, target: Ipv4Addr) -> Vec<u8> {
    let mut arp = vec![0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01];
    arp.extend_from_slice(&DEFAULT_SOURCE_MAC.octets());
    arp.extend_from_slice(&sender.octets());
    arp.extend_from_slice(&[0u8; 6]);
    arp.extend_from_slice(&target.octets());
    ethernet(DEFAULT_SOURCE_MAC, MacAddr::BROADCAST, ETHERTYPE_ARP, &arp)
}

/// A DNS message with one IN/A question for `name`.
pub fn dns_message(id: u16, name: &str, is_response: bool, rcode: u8) -> Vec<u8> {
    let flags: u16 = if is_response { 0x8180 } else { 0x0100 } | u16::from(rcode & 0x0f);
    let mut message = Vec::new();
    message.extend_from_slice(&id.to_be_bytes());
    message.extend_from_slice(&flags.to_be_bytes());
    message.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0]);
    for label in name.trim_end_matches('.').split('.').filter(|l| !l.is_empty()) {
        message.push(label.len() as u8);
        message.extend_from_slice(label.as_bytes());
    }
    message.extend_from_slice(&[0, 0, 1, 0, 1]);
    message
}

/// A bare 802.11 beacon: SSID, supported rates and DS parameter elements,
/// then `extra` elements in order.
pub fn beacon(bssid: MacAddr, ssid: &[u8], channel: u8, extra: &[(u8, &[u8])]) -> Vec<u8> {
    let mut frame = vec![0x80, 0x00, 0x00, 0x00];
    frame.extend_from_slice(&MacAddr::BROADCAST.octets());
    frame.extend_from_slice(&bssid.octets());
    frame.extend_from_slice(&bssid.octets());
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&[0u8; 8]);
    frame.extend_from_slice(&100u16.to_le_bytes());
    frame.extend_from_slice(&0x0431u16.to_le_bytes());

    let mut push = |id: u8, data: &[u8]| {
        frame.push(id);
        frame.push(data.len() as u8);
        frame.extend_from_slice(data);
    };
    push(0, ssid);
    push(1, &[0x82, 0x84, 0x8b, 0x96]);
    push(3, &[channel]);
    for (id, data) in extra {
        push(*id, data);
    }
    frame
}

/// Prefixes an 802.11 frame with an empty radiotap header.
pub fn radiotap(frame: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
    out.extend_from_slice(frame);
    out
}
