//! Fluent construction of synthetic packets.
//!
//! Used by tests and benches across the workspace, and by anything that
//! needs packets without going through a capture file.

use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::packet::*;

const DEFAULT_SOURCE_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
const DEFAULT_DESTINATION_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

#[derive(Debug, Clone)]
pub struct PacketBuilder {
    packet: Packet,
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuilder {
    /// An Ethernet frame with no network layer.
    pub fn new() -> Self {
        Self {
            packet: Packet {
                timestamp_us: 0,
                wire_length: 14,
                link: LinkLayer::Ethernet(EthernetHeader {
                    source: DEFAULT_SOURCE_MAC,
                    destination: DEFAULT_DESTINATION_MAC,
                    ethertype: 0,
                    vlan: None,
                }),
                network: NetworkLayer::None,
                transport: TransportLayer::None,
                application: ApplicationLayer::None,
            },
        }
    }

    fn ipv4(source: Ipv4Addr, destination: Ipv4Addr, protocol: u8) -> Self {
        let mut builder = Self::new().ethertype(0x0800);
        builder.packet.network = NetworkLayer::Ipv4(Ipv4Header {
            source,
            destination,
            protocol,
            ttl: 64,
            total_length: 20,
            fragment_offset: 0,
        });
        builder.packet.wire_length += 20;
        builder
    }

    pub fn tcp(
        source: impl Into<Ipv4Addr>,
        source_port: u16,
        destination: impl Into<Ipv4Addr>,
        destination_port: u16,
    ) -> Self {
        let mut builder = Self::ipv4(source.into(), destination.into(), 6);
        builder.packet.transport = TransportLayer::Tcp(TcpSegment {
            source_port,
            destination_port,
            sequence: 0,
            acknowledgement: 0,
            flags: TcpFlags::ACK,
            window: 65535,
            payload: Bytes::new(),
        });
        builder.packet.wire_length += 20;
        builder
    }

    pub fn udp(
        source: impl Into<Ipv4Addr>,
        source_port: u16,
        destination: impl Into<Ipv4Addr>,
        destination_port: u16,
    ) -> Self {
        let mut builder = Self::ipv4(source.into(), destination.into(), 17);
        builder.packet.transport = TransportLayer::Udp(UdpDatagram {
            source_port,
            destination_port,
            payload: Bytes::new(),
        });
        builder.packet.wire_length += 8;
        builder
    }

    pub fn icmp(source: impl Into<Ipv4Addr>, destination: impl Into<Ipv4Addr>, icmp_type: u8) -> Self {
        let mut builder = Self::ipv4(source.into(), destination.into(), 1);
        builder.packet.transport = TransportLayer::Icmp(IcmpMessage { icmp_type, code: 0 });
        builder.packet.wire_length += 8;
        builder
    }

    /// ARP who-has request.
    pub fn arp(sender_ip: impl Into<Ipv4Addr>, target_ip: impl Into<Ipv4Addr>) -> Self {
        let mut builder = Self::new().ethertype(0x0806);
        builder.packet.network = NetworkLayer::Arp(ArpPacket {
            operation: 1,
            sender_mac: DEFAULT_SOURCE_MAC,
            sender_ip: sender_ip.into(),
            target_mac: MacAddr::default(),
            target_ip: target_ip.into(),
        });
        builder.packet.wire_length += 28;
        builder
    }

    /// A beacon carrying SSID, supported rates and DS parameter elements,
    /// in that order.
    pub fn beacon(bssid: MacAddr, ssid: impl AsRef<[u8]>, channel: u8) -> Self {
        let mut builder = Self::management(Dot11Frame::SUBTYPE_BEACON, bssid, MacAddr::BROADCAST);
        if let LinkLayer::Dot11(frame) = &mut builder.packet.link {
            frame.beacon = Some(BeaconBody {
                timestamp: 0,
                interval: 100,
                capabilities: 0x0431,
                elements: vec![
                    InformationElement {
                        id: BeaconBody::ELEMENT_SSID,
                        data: Bytes::copy_from_slice(ssid.as_ref()),
                    },
                    InformationElement {
                        id: 1,
                        data: Bytes::from_static(&[0x82, 0x84, 0x8b, 0x96]),
                    },
                    InformationElement {
                        id: BeaconBody::ELEMENT_DS_PARAMETER,
                        data: Bytes::copy_from_slice(&[channel]),
                    },
                ],
            });
        }
        builder
    }

    /// A bare 802.11 management frame.
    pub fn management(subtype: u8, transmitter: MacAddr, receiver: MacAddr) -> Self {
        let mut builder = Self::new();
        builder.packet.link = LinkLayer::Dot11(Dot11Frame {
            frame_type: Dot11Frame::TYPE_MANAGEMENT,
            subtype,
            flags: 0,
            receiver,
            transmitter: Some(transmitter),
            bssid: Some(transmitter),
            beacon: None,
        });
        builder.packet.wire_length = 24;
        builder
    }

    /// Replaces the link layer.
    pub fn link(mut self, link: LinkLayer) -> Self {
        self.packet.link = link;
        self
    }

    pub fn ethernet(mut self, source: MacAddr, destination: MacAddr) -> Self {
        if let LinkLayer::Ethernet(header) = &mut self.packet.link {
            header.source = source;
            header.destination = destination;
        }
        self
    }

    fn ethertype(mut self, ethertype: u16) -> Self {
        if let LinkLayer::Ethernet(header) = &mut self.packet.link {
            header.ethertype = ethertype;
        }
        self
    }

    /// Appends an information element to a beacon body.
    pub fn element(mut self, id: u8, data: impl AsRef<[u8]>) -> Self {
        if let LinkLayer::Dot11(Dot11Frame {
            beacon: Some(body), ..
        }) = &mut self.packet.link
        {
            body.elements.push(InformationElement {
                id,
                data: Bytes::copy_from_slice(data.as_ref()),
            });
        }
        self
    }

    pub fn timestamp_us(mut self, timestamp_us: u64) -> Self {
        self.packet.timestamp_us = timestamp_us;
        self
    }

    pub fn timestamp_ms(self, timestamp_ms: u64) -> Self {
        self.timestamp_us(timestamp_ms * 1_000)
    }

    pub fn flags(mut self, flags: TcpFlags) -> Self {
        if let TransportLayer::Tcp(segment) = &mut self.packet.transport {
            segment.flags = flags;
        }
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let len = payload.len();
        match &mut self.packet.transport {
            TransportLayer::Tcp(segment) => segment.payload = payload,
            TransportLayer::Udp(datagram) => datagram.payload = payload,
            _ => return self,
        }
        self.packet.wire_length += len;
        self
    }

    /// Marks the packet as a DNS query for `name` (dotted, with or without
    /// the trailing root dot).
    pub fn dns_query(self, id: u16, name: impl AsRef<[u8]>) -> Self {
        self.dns(id, name, false, DnsMessage::RCODE_NOERROR)
    }

    pub fn dns_response(self, id: u16, name: impl AsRef<[u8]>, rcode: u8) -> Self {
        self.dns(id, name, true, rcode)
    }

    fn dns(mut self, id: u16, name: impl AsRef<[u8]>, is_response: bool, rcode: u8) -> Self {
        let mut raw = name.as_ref().to_vec();
        if raw.last() != Some(&b'.') {
            raw.push(b'.');
        }
        self.packet.application = ApplicationLayer::Dns(DnsMessage {
            id,
            is_response,
            opcode: 0,
            rcode,
            questions: vec![DnsQuestion {
                name: Bytes::from(raw),
                qtype: 1,
                qclass: 1,
            }],
            answer_count: 0,
        });
        self
    }

    pub fn build(self) -> Packet {
        self.packet
    }
}
