use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use sparhund_capture::{CaptureError, PacketSource, PcapFileSource};
use sparhund_core::{MacAddr, Protocol, TcpFlags};
use sparhund_protocols::craft;

const LINKTYPE_ETHERNET: u32 = 1;
const LINKTYPE_RADIOTAP: u32 = 127;

fn pcap_bytes(linktype: u32, frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&linktype.to_le_bytes());
    for (seconds, micros, frame) in frames {
        out.extend_from_slice(&seconds.to_le_bytes());
        out.extend_from_slice(&micros.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    out
}

fn write_temp(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sparhund-capture-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reads_ethernet_capture_in_order() {
    let client = Ipv4Addr::new(192, 168, 0, 10);
    let server = Ipv4Addr::new(10, 0, 0, 1);
    let frames = vec![
        (
            1_700_000_000,
            250,
            craft::ethernet_tcp(client, 40000, server, 80, TcpFlags::SYN, b""),
        ),
        (
            1_700_000_001,
            0,
            craft::ethernet_udp(
                client,
                53000,
                server,
                53,
                &craft::dns_message(1, "example.com", false, 0),
            ),
        ),
        (1_700_000_002, 0, craft::ethernet_icmp(client, server, 8)),
        (1_700_000_003, 0, craft::ethernet_arp(client, server)),
    ];
    let path = write_temp("ethernet.pcap", &pcap_bytes(LINKTYPE_ETHERNET, &frames));

    let source = PcapFileSource::new(&path);
    assert_eq!(source.identifier(), path.display().to_string());
    let packets = source.packets().unwrap();

    assert_eq!(packets.len(), 4);
    assert_eq!(packets[0].timestamp_us, 1_700_000_000_000_250);
    assert_eq!(packets[0].tcp().unwrap().flags, TcpFlags::SYN);
    assert_eq!(
        packets[1].dns().unwrap().questions[0].name.as_ref(),
        b"example.com."
    );
    assert!(packets[2].has(Protocol::Icmp));
    assert!(packets[3].has(Protocol::Arp));
    assert_eq!(packets[3].wire_length, frames[3].2.len());
}

#[test]
fn reads_radiotap_beacons() {
    let bssid = MacAddr::new([0xaa, 0xbb, 0xcc, 0x00, 0x00, 0x01]);
    let frames = vec![(
        1,
        0,
        craft::radiotap(&craft::beacon(bssid, b"TestNet", 6, &[])),
    )];
    let path = write_temp("radiotap.pcap", &pcap_bytes(LINKTYPE_RADIOTAP, &frames));

    let packets = PcapFileSource::new(&path).packets().unwrap();
    assert_eq!(packets.len(), 1);
    assert!(packets[0].has(Protocol::Dot11Beacon));
    assert_eq!(packets[0].beacon().unwrap().ssid(), Some(&b"TestNet"[..]));
}

#[test]
fn garbage_file_is_decode_failure() {
    let path = write_temp("garbage.pcap", b"this is not a capture file at all");
    let err = PcapFileSource::new(&path).packets().unwrap_err();
    assert!(matches!(err, CaptureError::DecodeFailure { .. }));
}
