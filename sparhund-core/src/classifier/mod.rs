//! ## sparhund-core::classifier
//! **Pure views over a packet sequence**
//!
//! Every function here borrows its input and returns a new view; nothing is
//! mutated. Filters are stable (relative order is kept) and accept any
//! iterator of packet references, so their outputs can be filtered again.

mod dns;
mod wireless;

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::packet::{MacAddr, Packet, Protocol, TcpFlags, TransportLayer};
use crate::range::AddressRange;

pub use dns::{dns_query_name, extract_dns_query_names};
pub use wireless::{parse_beacon_frames, parse_management_frames, BeaconInfo, ManagementFrameInfo};

/// Single-packet predicate behind each named filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PacketFilter {
    SourceAddress(Ipv4Addr),
    /// TCP destination port.
    DestinationPort(u16),
    /// Ethernet source or destination.
    LinkAddress(MacAddr),
    AddressRange(AddressRange),
    Protocol(Protocol),
    /// Any bit of the mask set in the TCP flags.
    TransportFlags(TcpFlags),
    /// TCP payload strictly longer than the threshold.
    PayloadLargerThan(usize),
}

impl PacketFilter {
    pub fn matches(&self, packet: &Packet) -> bool {
        match self {
            PacketFilter::SourceAddress(addr) => {
                packet.ipv4().is_ok_and(|ip| ip.source == *addr)
            }
            PacketFilter::DestinationPort(port) => {
                packet.tcp().is_ok_and(|tcp| tcp.destination_port == *port)
            }
            PacketFilter::LinkAddress(mac) => packet
                .ethernet()
                .is_ok_and(|eth| eth.source == *mac || eth.destination == *mac),
            PacketFilter::AddressRange(range) => {
                packet.ipv4().is_ok_and(|ip| range.contains(ip.source))
            }
            PacketFilter::Protocol(protocol) => packet.has(*protocol),
            PacketFilter::TransportFlags(mask) => {
                packet.tcp().is_ok_and(|tcp| tcp.flags.intersects(*mask))
            }
            PacketFilter::PayloadLargerThan(max) => {
                packet.tcp().is_ok_and(|tcp| tcp.payload.len() > *max)
            }
        }
    }

    /// Stable filter over `packets`.
    pub fn apply<'a, I>(&self, packets: I) -> Vec<&'a Packet>
    where
        I: IntoIterator<Item = &'a Packet>,
    {
        packets.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Packets partitioned by transport layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportSplit<'a> {
    pub tcp: Vec<&'a Packet>,
    pub udp: Vec<&'a Packet>,
    pub icmp: Vec<&'a Packet>,
    /// Everything without a TCP, UDP or ICMP layer (ARP, 802.11, ...).
    pub other: Vec<&'a Packet>,
}

impl TransportSplit<'_> {
    pub fn total(&self) -> usize {
        self.tcp.len() + self.udp.len() + self.icmp.len() + self.other.len()
    }
}

/// Partitions `packets`; every packet lands in exactly one bucket.
pub fn split_by_transport<'a, I>(packets: I) -> TransportSplit<'a>
where
    I: IntoIterator<Item = &'a Packet>,
{
    let mut split = TransportSplit::default();
    for packet in packets {
        match packet.transport {
            TransportLayer::Tcp(_) => split.tcp.push(packet),
            TransportLayer::Udp(_) => split.udp.push(packet),
            TransportLayer::Icmp(_) => split.icmp.push(packet),
            TransportLayer::None => split.other.push(packet),
        }
    }
    split
}

pub fn filter_by_source_address<'a, I>(packets: I, addr: Ipv4Addr) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::SourceAddress(addr).apply(packets)
}

pub fn filter_by_destination_port<'a, I>(packets: I, port: u16) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::DestinationPort(port).apply(packets)
}

pub fn filter_by_link_address<'a, I>(packets: I, mac: MacAddr) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::LinkAddress(mac).apply(packets)
}

pub fn filter_by_address_range<'a, I>(packets: I, range: &AddressRange) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::AddressRange(*range).apply(packets)
}

pub fn filter_by_protocol<'a, I>(packets: I, protocol: Protocol) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::Protocol(protocol).apply(packets)
}

/// Matches ANY flag in `mask`, not the exact flag set. A zero mask matches
/// nothing.
pub fn filter_by_transport_flags<'a, I>(packets: I, mask: TcpFlags) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::TransportFlags(mask).apply(packets)
}

pub fn filter_by_payload_size_threshold<'a, I>(packets: I, max_size: usize) -> Vec<&'a Packet>
where
    I: IntoIterator<Item = &'a Packet>,
{
    PacketFilter::PayloadLargerThan(max_size).apply(packets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PacketBuilder;
    use crate::range::RangeComparison;
    use proptest::prelude::*;

    fn mixed_capture() -> Vec<Packet> {
        vec![
            PacketBuilder::tcp([192, 168, 0, 1], 40000, [10, 0, 0, 1], 80).build(),
            PacketBuilder::udp([192, 168, 0, 2], 5353, [10, 0, 0, 1], 53).build(),
            PacketBuilder::tcp([192, 168, 0, 9], 40001, [10, 0, 0, 1], 443).build(),
            PacketBuilder::icmp([10, 0, 0, 1], [192, 168, 0, 1], 0).build(),
            PacketBuilder::arp([192, 168, 0, 1], [192, 168, 0, 254]).build(),
            PacketBuilder::udp([172, 16, 0, 1], 1234, [10, 0, 0, 1], 9999).build(),
            PacketBuilder::tcp([172, 16, 0, 1], 40002, [10, 0, 0, 1], 80).build(),
        ]
    }

    #[test]
    fn test_split_counts() {
        let packets = mixed_capture();
        let split = split_by_transport(&packets);
        assert_eq!(
            (split.tcp.len(), split.udp.len(), split.icmp.len(), split.other.len()),
            (3, 2, 1, 1)
        );
        assert!(split.other[0].has(Protocol::Arp));
    }

    #[test]
    fn test_split_preserves_order() {
        let packets = mixed_capture();
        let split = split_by_transport(&packets);
        let ports: Vec<u16> = split
            .tcp
            .iter()
            .map(|p| p.tcp().unwrap().source_port)
            .collect();
        assert_eq!(ports, vec![40000, 40001, 40002]);
    }

    #[test]
    fn test_split_empty() {
        let empty: Vec<Packet> = Vec::new();
        let split = split_by_transport(&empty);
        assert_eq!(split.total(), 0);
    }

    #[test]
    fn test_source_address() {
        let packets = mixed_capture();
        let matched = filter_by_source_address(&packets, Ipv4Addr::new(192, 168, 0, 1));
        // the ARP sender is not an IPv4 source
        assert_eq!(matched.len(), 1);
        assert!(matched[0].has(Protocol::Tcp));
    }

    #[test]
    fn test_destination_port_is_tcp_only() {
        let packets = mixed_capture();
        assert_eq!(filter_by_destination_port(&packets, 80).len(), 2);
        assert!(filter_by_destination_port(&packets, 53).is_empty());
    }

    #[test]
    fn test_link_address_either_endpoint() {
        let target: MacAddr = "00:11:22:33:44:55".parse().unwrap();
        let other: MacAddr = "66:77:88:99:aa:bb".parse().unwrap();
        let packets = vec![
            PacketBuilder::tcp([1, 1, 1, 1], 1, [2, 2, 2, 2], 2)
                .ethernet(target, other)
                .build(),
            PacketBuilder::tcp([1, 1, 1, 1], 1, [2, 2, 2, 2], 2)
                .ethernet(other, target)
                .build(),
            PacketBuilder::tcp([1, 1, 1, 1], 1, [2, 2, 2, 2], 2)
                .ethernet(other, other)
                .build(),
            PacketBuilder::management(0, target, other).build(),
        ];
        assert_eq!(filter_by_link_address(&packets, target).len(), 2);
    }

    #[test]
    fn test_address_range_numeric_and_lexicographic() {
        let packets = mixed_capture();
        let numeric = AddressRange::new([192, 168, 0, 1], [192, 168, 0, 100]);
        assert_eq!(filter_by_address_range(&packets, &numeric).len(), 3);

        let lexicographic = numeric.with_comparison(RangeComparison::Lexicographic);
        // "192.168.0.2" and "192.168.0.9" sort after "192.168.0.100"
        assert_eq!(filter_by_address_range(&packets, &lexicographic).len(), 1);
    }

    #[test]
    fn test_protocol_capability() {
        let packets = mixed_capture();
        assert_eq!(filter_by_protocol(&packets, Protocol::Ipv4).len(), 6);
        assert_eq!(filter_by_protocol(&packets, Protocol::Tcp).len(), 3);
        assert_eq!(filter_by_protocol(&packets, Protocol::Arp).len(), 1);
    }

    #[test]
    fn test_syn_passes_syn_mask_only() {
        let syn = vec![PacketBuilder::tcp([1, 1, 1, 1], 1000, [2, 2, 2, 2], 22)
            .flags(TcpFlags::SYN)
            .build()];
        assert_eq!(filter_by_transport_flags(&syn, TcpFlags(0x02)).len(), 1);
        assert!(filter_by_transport_flags(&syn, TcpFlags(0x10)).is_empty());
    }

    #[test]
    fn test_flag_mask_matches_any_bit() {
        let synack = vec![PacketBuilder::tcp([1, 1, 1, 1], 1000, [2, 2, 2, 2], 22)
            .flags(TcpFlags::SYN | TcpFlags::ACK)
            .build()];
        assert_eq!(
            filter_by_transport_flags(&synack, TcpFlags::SYN | TcpFlags::FIN).len(),
            1
        );
    }

    #[test]
    fn test_payload_threshold_is_strict() {
        let packets = vec![
            PacketBuilder::tcp([1, 1, 1, 1], 1, [2, 2, 2, 2], 80)
                .payload(vec![0u8; 1024])
                .build(),
            PacketBuilder::tcp([1, 1, 1, 1], 1, [2, 2, 2, 2], 80)
                .payload(vec![0u8; 1025])
                .build(),
            PacketBuilder::udp([1, 1, 1, 1], 1, [2, 2, 2, 2], 80)
                .payload(vec![0u8; 4096])
                .build(),
        ];
        let suspicious = filter_by_payload_size_threshold(&packets, 1024);
        assert_eq!(suspicious.len(), 1);
        assert_eq!(suspicious[0].tcp().unwrap().payload.len(), 1025);
    }

    fn arb_packet() -> impl Strategy<Value = Packet> {
        (0u8..5, any::<[u8; 4]>(), any::<u16>(), any::<u8>(), 0usize..64).prop_map(
            |(kind, src, port, flags, len)| match kind {
                0 => PacketBuilder::tcp(src, port, [10, 0, 0, 1], port)
                    .flags(TcpFlags(flags))
                    .payload(vec![0u8; len])
                    .build(),
                1 => PacketBuilder::udp(src, port, [10, 0, 0, 1], port).build(),
                2 => PacketBuilder::icmp(src, [10, 0, 0, 1], flags).build(),
                3 => PacketBuilder::arp(src, [10, 0, 0, 1]).build(),
                _ => PacketBuilder::management(flags & 0x0f, MacAddr([flags; 6]), MacAddr::BROADCAST)
                    .build(),
            },
        )
    }

    proptest! {
        #[test]
        fn prop_split_is_a_partition(packets in prop::collection::vec(arb_packet(), 0..64)) {
            let split = split_by_transport(&packets);
            prop_assert_eq!(split.total(), packets.len());
            for packet in &packets {
                let hits = [&split.tcp, &split.udp, &split.icmp, &split.other]
                    .iter()
                    .filter(|bucket| bucket.iter().any(|p| std::ptr::eq(*p, packet)))
                    .count();
                prop_assert_eq!(hits, 1);
            }
        }

        #[test]
        fn prop_filters_are_idempotent(
            packets in prop::collection::vec(arb_packet(), 0..64),
            mask in any::<u8>(),
            threshold in 0usize..64,
        ) {
            let filters = [
                PacketFilter::TransportFlags(TcpFlags(mask)),
                PacketFilter::PayloadLargerThan(threshold),
                PacketFilter::Protocol(Protocol::Udp),
                PacketFilter::DestinationPort(80),
                PacketFilter::AddressRange(AddressRange::new([0, 0, 0, 0], [127, 255, 255, 255])),
            ];
            for filter in filters {
                let once = filter.apply(&packets);
                let twice = filter.apply(once.iter().copied());
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn prop_zero_flag_mask_matches_nothing(packets in prop::collection::vec(arb_packet(), 0..64)) {
            prop_assert!(filter_by_transport_flags(&packets, TcpFlags(0)).is_empty());
        }
    }
}
