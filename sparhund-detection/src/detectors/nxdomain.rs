use std::collections::BTreeSet;

use sparhund_config::NxdomainConfig;
use sparhund_core::Packet;
use tracing::debug;

use super::Detector;
use crate::finding::{Finding, FindingDetails};

/// Reports NXDOMAIN responses when they make up more than `max_ratio` of
/// at least `min_responses` DNS responses, a pattern typical of
/// domain-generation malware.
pub struct NxdomainDetector {
    config: NxdomainConfig,
}

impl NxdomainDetector {
    pub fn new(config: NxdomainConfig) -> Self {
        Self { config }
    }
}

impl Detector for NxdomainDetector {
    fn name(&self) -> &'static str {
        "nxdomain"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let mut responses = 0;
        let mut nxdomain = 0;
        let mut domains = BTreeSet::new();
        for dns in packets.iter().filter_map(|p| p.dns().ok()) {
            if !dns.is_response {
                continue;
            }
            responses += 1;
            if dns.is_nxdomain() {
                nxdomain += 1;
                if let Some(question) = dns.first_question() {
                    domains.insert(String::from_utf8_lossy(&question.name).into_owned());
                }
            }
        }

        let ratio = if responses == 0 {
            0.0
        } else {
            nxdomain as f64 / responses as f64
        };
        let triggered = responses >= self.config.min_responses && ratio > self.config.max_ratio;
        debug!(responses, nxdomain, ratio, triggered, "NXDOMAIN ratio");

        Finding::new(
            self.name(),
            if triggered { nxdomain } else { 0 },
            FindingDetails::Nxdomain {
                responses,
                nxdomain,
                ratio,
                domains: domains.into_iter().collect(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparhund_core::packet::DnsMessage;
    use sparhund_core::PacketBuilder;

    fn response(id: u16, name: &str, rcode: u8) -> Packet {
        PacketBuilder::udp([10, 0, 0, 53], 53, [10, 0, 0, 2], 40000)
            .dns_response(id, name, rcode)
            .build()
    }

    fn capture(ok: u16, failed: u16) -> Vec<Packet> {
        let mut packets: Vec<Packet> = (0..ok)
            .map(|i| response(i, "example.com", DnsMessage::RCODE_NOERROR))
            .collect();
        packets.extend((0..failed).map(|i| {
            response(
                1000 + i,
                &format!("qx{i}zt.example"),
                DnsMessage::RCODE_NXDOMAIN,
            )
        }));
        packets
    }

    #[test]
    fn test_high_ratio_reports_nxdomain_count() {
        let finding = NxdomainDetector::new(NxdomainConfig::default()).detect(&capture(4, 8));
        assert_eq!(finding.number_of_detected, 8);
        match finding.details {
            FindingDetails::Nxdomain { domains, ratio, .. } => {
                assert_eq!(domains.len(), 8);
                assert!(domains[0].ends_with('.'));
                assert!((ratio - 8.0 / 12.0).abs() < 1e-9);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_low_ratio_is_zero() {
        let finding = NxdomainDetector::new(NxdomainConfig::default()).detect(&capture(18, 2));
        assert_eq!(finding.number_of_detected, 0);
    }

    #[test]
    fn test_too_few_responses_is_zero() {
        let finding = NxdomainDetector::new(NxdomainConfig::default()).detect(&capture(0, 5));
        assert_eq!(finding.number_of_detected, 0);
    }

    #[test]
    fn test_queries_not_counted() {
        let mut packets = capture(2, 10);
        packets.push(
            PacketBuilder::udp([10, 0, 0, 2], 40000, [10, 0, 0, 53], 53)
                .dns_query(1, "example.com")
                .build(),
        );
        let finding = NxdomainDetector::new(NxdomainConfig::default()).detect(&packets);
        assert!(matches!(
            finding.details,
            FindingDetails::Nxdomain { responses: 12, .. }
        ));
    }
}
