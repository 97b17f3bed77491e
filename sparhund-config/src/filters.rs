//! Classifier filter parameters.
//!
//! Defaults reproduce the values of the historical example run: source
//! `192.168.0.1`, destination port 80, MAC `00:11:22:33:44:55`, range
//! `192.168.0.1..=192.168.0.100`, protocol TCP, payload threshold 1024 and
//! the SYN flag mask.

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use sparhund_core::{AddressRange, MacAddr, Protocol, TcpFlags};
use validator::Validate;

use crate::validation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = validation::validate_range_order))]
pub struct FilterConfig {
    /// Exact IPv4 source address.
    #[serde(default = "default_source_ip")]
    pub source_ip: Ipv4Addr,

    /// TCP destination port.
    #[validate(range(min = 1))]
    #[serde(default = "default_destination_port")]
    pub destination_port: u16,

    /// Ethernet address matched against source or destination.
    #[serde(default = "default_mac_address")]
    pub mac_address: MacAddr,

    /// Inclusive source address range.
    #[serde(default = "default_ip_range")]
    pub ip_range: AddressRange,

    /// When set, replaces `ip_range` with every address of the block.
    #[serde(default)]
    pub network: Option<Ipv4Network>,

    /// Protocol counted by the protocol filter.
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,

    /// TCP payloads strictly larger than this are suspicious.
    #[validate(range(max = 65535))]
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// TCP flag mask; a packet matches if any bit is set.
    #[serde(default = "default_tcp_flags")]
    pub tcp_flags: TcpFlags,
}

impl FilterConfig {
    /// The effective address range.
    pub fn address_range(&self) -> AddressRange {
        match self.network {
            Some(network) => {
                AddressRange::from_network(network).with_comparison(self.ip_range.comparison)
            }
            None => self.ip_range,
        }
    }
}

fn default_source_ip() -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 0, 1)
}
fn default_destination_port() -> u16 {
    80
}
fn default_mac_address() -> MacAddr {
    MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])
}
fn default_ip_range() -> AddressRange {
    AddressRange::new([192, 168, 0, 1], [192, 168, 0, 100])
}
fn default_protocol() -> Protocol {
    Protocol::Tcp
}
fn default_max_payload_size() -> usize {
    1024
}
fn default_tcp_flags() -> TcpFlags {
    TcpFlags::SYN
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            source_ip: default_source_ip(),
            destination_port: default_destination_port(),
            mac_address: default_mac_address(),
            ip_range: default_ip_range(),
            network: None,
            protocol: default_protocol(),
            max_payload_size: default_max_payload_size(),
            tcp_flags: default_tcp_flags(),
        }
    }
}
