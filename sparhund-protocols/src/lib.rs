//! # Sparhund Protocol Dissectors
//!
//! Crate for turning captured frame bytes into [`sparhund_core::Packet`]s.
//! Ethernet, 802.1Q, IPv4, TCP, UDP and ICMP headers are decoded with
//! etherparse; radiotap, 802.11, ARP and DNS are read here. Payloads are
//! zero-copy slices of the captured `Bytes`.
//!
//! Supported link types: Ethernet (with up to two VLAN tags), raw IP, bare
//! 802.11 and radiotap-wrapped 802.11.

pub mod craft;
pub mod dissect;
pub mod dns;
pub mod dot11;
pub mod error;
pub mod ethernet;
pub mod ipv4;
pub mod radiotap;
pub mod transport;

pub use dissect::{dissect, Dissected, Linktype};
pub use error::DissectError;
