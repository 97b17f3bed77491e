//! IPv4 address ranges.

use std::cmp::Ordering;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

/// How addresses are ordered when testing range membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeComparison {
    /// Compare the 32-bit address values.
    #[default]
    Numeric,
    /// Compare dotted-decimal strings byte by byte, so `192.168.0.9` sorts
    /// after `192.168.0.10`. Kept for parity with string-based tooling.
    Lexicographic,
}

/// Inclusive `[start, end]` range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
    #[serde(default)]
    pub comparison: RangeComparison,
}

impl AddressRange {
    pub fn new(start: impl Into<Ipv4Addr>, end: impl Into<Ipv4Addr>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            comparison: RangeComparison::Numeric,
        }
    }

    pub fn with_comparison(mut self, comparison: RangeComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Every address of a CIDR block, network and broadcast included.
    pub fn from_network(network: Ipv4Network) -> Self {
        Self::new(network.network(), network.broadcast())
    }

    fn compare(&self, a: Ipv4Addr, b: Ipv4Addr) -> Ordering {
        match self.comparison {
            RangeComparison::Numeric => u32::from(a).cmp(&u32::from(b)),
            RangeComparison::Lexicographic => a.to_string().cmp(&b.to_string()),
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.compare(self.start, addr) != Ordering::Greater
            && self.compare(addr, self.end) != Ordering::Greater
    }

    /// False when `start` sorts after `end` under the chosen comparison.
    pub fn is_ordered(&self) -> bool {
        self.compare(self.start, self.end) != Ordering::Greater
    }
}
