use std::collections::{BTreeMap, BTreeSet};

use sparhund_config::SqlInjectionConfig;
use sparhund_core::Packet;
use tracing::debug;

use super::Detector;
use crate::decode::percent_decode;
use crate::error::DetectionError;
use crate::finding::{Finding, FindingDetails};
use crate::signatures::SignatureEngine;

/// Scans TCP payloads, raw and percent-decoded, for SQL injection
/// signatures.
pub struct SqlInjectionDetector {
    engine: SignatureEngine,
}

impl SqlInjectionDetector {
    pub fn new(config: &SqlInjectionConfig) -> Result<Self, DetectionError> {
        Ok(Self {
            engine: SignatureEngine::with_patterns(config.signatures.iter().cloned())?,
        })
    }

    fn scan(&self, payload: &[u8]) -> BTreeSet<usize> {
        let mut hits: BTreeSet<usize> = self.engine.buffer_scan(payload).into_iter().collect();
        let decoded = percent_decode(payload);
        if decoded.as_ref() != payload {
            hits.extend(self.engine.buffer_scan(&decoded));
        }
        hits
    }
}

impl Detector for SqlInjectionDetector {
    fn name(&self) -> &'static str {
        "sql_injection"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let mut signatures: BTreeMap<String, usize> = BTreeMap::new();
        let mut count = 0;
        for (index, packet) in packets.iter().enumerate() {
            let Ok(tcp) = packet.tcp() else {
                continue;
            };
            if tcp.payload.is_empty() {
                continue;
            }
            let hits = self.scan(&tcp.payload);
            if hits.is_empty() {
                continue;
            }
            count += 1;
            debug!(index, hits = hits.len(), "SQL injection signature matched");
            for pattern in hits.into_iter().filter_map(|i| self.engine.pattern(i)) {
                *signatures.entry(pattern).or_default() += 1;
            }
        }
        Finding::new(
            self.name(),
            count,
            FindingDetails::SqlInjection { signatures },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparhund_core::PacketBuilder;

    fn detector() -> SqlInjectionDetector {
        SqlInjectionDetector::new(&SqlInjectionConfig::default()).unwrap()
    }

    fn http(payload: &'static str) -> Packet {
        PacketBuilder::tcp([10, 0, 0, 2], 40000, [10, 0, 0, 1], 80)
            .payload(payload)
            .build()
    }

    #[test]
    fn test_plain_and_encoded_injection() {
        let packets = vec![
            http("GET /items?id=1 UNION SELECT username, password FROM users HTTP/1.1\r\n"),
            http("GET /login?user=admin%27%20OR%201%3D1--%20 HTTP/1.1\r\n"),
            http("GET /index.html HTTP/1.1\r\n"),
        ];
        let finding = detector().detect(&packets);
        assert_eq!(finding.number_of_detected, 2);
        match finding.details {
            FindingDetails::SqlInjection { signatures } => {
                assert_eq!(signatures["union select"], 1);
                assert_eq!(signatures["' or 1=1"], 1);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_udp_payload_ignored() {
        let packets = vec![PacketBuilder::udp([10, 0, 0, 2], 5000, [10, 0, 0, 1], 53)
            .payload("' or 1=1")
            .build()];
        assert_eq!(detector().detect(&packets).number_of_detected, 0);
    }

    #[test]
    fn test_form_body_with_plus_spaces() {
        let packets = vec![http(
            "POST /search HTTP/1.1\r\n\r\nq=x%27+UNION+ALL+SELECT+null--",
        )];
        assert_eq!(detector().detect(&packets).number_of_detected, 1);
    }
}
