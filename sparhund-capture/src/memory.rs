//! In-memory packet source, used by tests and by callers that already hold
//! decoded packets.

use bytes::Bytes;
use sparhund_core::Packet;
use sparhund_protocols::{dissect, Linktype};
use tracing::debug;

use crate::{CaptureError, PacketSource};

#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    packets: Vec<Packet>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, packets: Vec<Packet>) -> Self {
        Self {
            name: name.into(),
            packets,
        }
    }

    /// Dissects raw `(timestamp_us, frame)` pairs captured on `linktype`.
    pub fn from_frames<I>(name: impl Into<String>, linktype: Linktype, frames: I) -> Self
    where
        I: IntoIterator<Item = (u64, Vec<u8>)>,
    {
        let packets = frames
            .into_iter()
            .enumerate()
            .map(|(index, (timestamp_us, frame))| {
                let dissected = dissect(linktype, timestamp_us, Bytes::from(frame));
                if let Some(error) = &dissected.error {
                    debug!(index, %error, "Partially dissected frame");
                }
                dissected.packet
            })
            .collect();
        Self::new(name, packets)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

impl PacketSource for MemorySource {
    fn packets(self) -> Result<Vec<Packet>, CaptureError> {
        Ok(self.packets)
    }

    fn identifier(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use sparhund_core::{PacketBuilder, Protocol, TcpFlags};
    use sparhund_protocols::craft;

    use super::*;

    #[test]
    fn test_packets_returned_in_order() {
        let packets = vec![
            PacketBuilder::tcp([10, 0, 0, 1], 1000, [10, 0, 0, 2], 80).build(),
            PacketBuilder::udp([10, 0, 0, 1], 1000, [10, 0, 0, 2], 53).build(),
        ];
        let source = MemorySource::new("memory", packets.clone());
        assert_eq!(source.identifier(), "memory");
        assert_eq!(source.len(), 2);
        assert_eq!(source.packets().unwrap(), packets);
    }

    #[test]
    fn test_from_frames_keeps_partial_packets() {
        let good = craft::ethernet_tcp(
            Ipv4Addr::new(10, 0, 0, 1),
            1000,
            Ipv4Addr::new(10, 0, 0, 2),
            80,
            TcpFlags::SYN,
            b"",
        );
        let truncated = good[..20].to_vec();
        let source = MemorySource::from_frames(
            "frames",
            Linktype::Ethernet,
            vec![(1, good), (2, truncated)],
        );
        let packets = source.packets().unwrap();
        assert_eq!(packets.len(), 2);
        assert!(packets[0].has(Protocol::Tcp));
        assert!(packets[1].has(Protocol::Ethernet));
        assert!(!packets[1].has(Protocol::Ipv4));
        assert_eq!(packets[1].timestamp_us, 2);
    }
}
