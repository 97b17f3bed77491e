use std::collections::BTreeMap;

use sparhund_config::UnencryptedTrafficConfig;
use sparhund_core::Packet;

use super::Detector;
use crate::finding::{Finding, FindingDetails};

/// Counts TCP/UDP packets carrying payload to or from a cleartext service
/// port.
pub struct UnencryptedTrafficDetector {
    config: UnencryptedTrafficConfig,
}

impl UnencryptedTrafficDetector {
    pub fn new(config: UnencryptedTrafficConfig) -> Self {
        Self { config }
    }

    /// The configured port this packet talks to, destination first.
    fn service_port(&self, packet: &Packet) -> Option<u16> {
        let (source, destination) = packet.ports()?;
        [destination, source]
            .into_iter()
            .find(|port| self.config.ports.contains(port))
    }
}

fn service_name(port: u16) -> String {
    match port {
        21 => "ftp".into(),
        23 => "telnet".into(),
        25 => "smtp".into(),
        80 => "http".into(),
        110 => "pop3".into(),
        143 => "imap".into(),
        8080 => "http-alt".into(),
        other => format!("port {other}"),
    }
}

impl Detector for UnencryptedTrafficDetector {
    fn name(&self) -> &'static str {
        "unencrypted_traffic"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let mut services: BTreeMap<String, usize> = BTreeMap::new();
        let mut count = 0;
        for packet in packets {
            let carries_data = packet.payload().is_ok_and(|p| !p.is_empty());
            if !carries_data {
                continue;
            }
            if let Some(port) = self.service_port(packet) {
                count += 1;
                *services.entry(service_name(port)).or_default() += 1;
            }
        }
        Finding::new(
            self.name(),
            count,
            FindingDetails::UnencryptedTraffic { services },
        )
    }
}
