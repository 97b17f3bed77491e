//! ## sparhund-engine::report
//! **The immutable result of one analysis run**
//!
//! A [`Report`] is only ever produced by [`ReportBuilder::build`], which
//! drops findings without evidence so that `total_vulnerabilities_detected`
//! always equals `vulnerabilities.len()`.

use std::collections::BTreeMap;

use serde::Serialize;
use sparhund_core::classifier::BeaconInfo;
use sparhund_detection::Finding;

/// Report count keys, serialized in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PacketCategory {
    #[serde(rename = "tcp_packets_count")]
    Tcp,
    #[serde(rename = "udp_packets_count")]
    Udp,
    #[serde(rename = "icmp_packets_count")]
    Icmp,
    #[serde(rename = "other_packets_count")]
    Other,
    #[serde(rename = "source_ip_packets_count")]
    SourceIp,
    #[serde(rename = "destination_port_packets_count")]
    DestinationPort,
    #[serde(rename = "mac_address_packets_count")]
    MacAddress,
    #[serde(rename = "ip_range_packets_count")]
    IpRange,
    /// Packets matching the configured protocol filter.
    #[serde(rename = "http_packets_count")]
    Protocol,
    /// TCP payload above the size threshold.
    #[serde(rename = "suspicious_packets_count")]
    Suspicious,
    /// Any bit of the configured TCP flag mask set.
    #[serde(rename = "syn_packets_count")]
    Syn,
    #[serde(rename = "management_frames_count")]
    ManagementFrames,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    #[serde(rename = "file_name")]
    pub source: String,
    #[serde(flatten)]
    pub packet_counts: BTreeMap<PacketCategory, usize>,
    pub dns_domains: Vec<String>,
    pub beacon_channels: BTreeMap<u8, Vec<BeaconInfo>>,
    pub total_vulnerabilities_detected: usize,
    pub vulnerabilities: Vec<Finding>,
}

impl Report {
    /// Zero when the category was never counted.
    pub fn count(&self, category: PacketCategory) -> usize {
        self.packet_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn finding(&self, detector: &str) -> Option<&Finding> {
        self.vulnerabilities.iter().find(|f| f.detector == detector)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    source: String,
    packet_counts: BTreeMap<PacketCategory, usize>,
    dns_domains: Vec<String>,
    beacon_channels: BTreeMap<u8, Vec<BeaconInfo>>,
    findings: Vec<Finding>,
}

impl ReportBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Sets the count for `category`, replacing any earlier value.
    pub fn count(mut self, category: PacketCategory, n: usize) -> Self {
        self.packet_counts.insert(category, n);
        self
    }

    pub fn dns_domains(mut self, domains: Vec<String>) -> Self {
        self.dns_domains = domains;
        self
    }

    pub fn beacon_channels(mut self, channels: BTreeMap<u8, Vec<BeaconInfo>>) -> Self {
        self.beacon_channels = channels;
        self
    }

    pub fn finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    pub fn findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        self.findings.extend(findings);
        self
    }

    pub fn build(self) -> Report {
        let vulnerabilities: Vec<Finding> = self
            .findings
            .into_iter()
            .filter(Finding::is_detected)
            .collect();
        Report {
            source: self.source,
            packet_counts: self.packet_counts,
            dns_domains: self.dns_domains,
            beacon_channels: self.beacon_channels,
            total_vulnerabilities_detected: vulnerabilities.len(),
            vulnerabilities,
        }
    }
}
