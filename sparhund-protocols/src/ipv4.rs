//! ## sparhund-protocols::ipv4
//! Maps an etherparse IPv4 header slice onto [`Ipv4Header`].

use etherparse::Ipv4HeaderSlice;
use sparhund_core::packet::Ipv4Header;

pub const PROTOCOL_ICMP: u8 = 1;
pub const PROTOCOL_TCP: u8 = 6;
pub const PROTOCOL_UDP: u8 = 17;

pub fn header(slice: &Ipv4HeaderSlice<'_>) -> Ipv4Header {
    Ipv4Header {
        source: slice.source_addr(),
        destination: slice.destination_addr(),
        protocol: slice.protocol().0,
        ttl: slice.ttl(),
        total_length: slice.total_len(),
        fragment_offset: slice.fragments_offset().value(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn raw_header(total_length: u16, protocol: u8) -> Vec<u8> {
        let mut h = vec![
            0x45, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x00, 0x40, protocol, 0x00, 0x00, 192,
            168, 0, 1, 10, 0, 0, 1,
        ];
        h[2..4].copy_from_slice(&total_length.to_be_bytes());
        h
    }

    #[test]
    fn test_header_fields() {
        let data = raw_header(20, PROTOCOL_UDP);
        let ip = header(&Ipv4HeaderSlice::from_slice(&data).unwrap());
        assert_eq!(ip.source, Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(ip.destination, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ip.protocol, PROTOCOL_UDP);
        assert_eq!(ip.ttl, 64);
        assert_eq!(ip.total_length, 20);
    }

    #[test]
    fn test_fragment_offset() {
        let mut data = raw_header(20, PROTOCOL_TCP);
        data[6] = 0x20; // more fragments
        data[7] = 0xb9;
        let ip = header(&Ipv4HeaderSlice::from_slice(&data).unwrap());
        assert_eq!(ip.fragment_offset, 0xb9);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut data = raw_header(20, PROTOCOL_TCP);
        data[0] = 0x65;
        assert!(Ipv4HeaderSlice::from_slice(&data).is_err());
    }
}
