use std::collections::HashMap;
use std::net::Ipv4Addr;

use sparhund_config::BruteForceConfig;
use sparhund_core::Packet;
use tracing::debug;

use super::Detector;
use crate::error::DetectionError;
use crate::finding::{BruteForceTarget, Finding, FindingDetails};
use crate::signatures::SignatureEngine;
use crate::window::peak_count;

/// Server replies that report a rejected login.
const FAILURE_MARKERS: &[&str] = &[
    "530 ",
    "535 ",
    "login incorrect",
    "login failed",
    "authentication failed",
    "authenticationfailed",
    "invalid password",
    "access denied",
    "permission denied",
    "-err",
];

/// Groups connection attempts (bare SYNs) and failed-login replies by
/// (client, server, port) and flags groups that exceed `max_attempts`
/// within one window.
pub struct BruteForceDetector {
    config: BruteForceConfig,
    failures: SignatureEngine,
}

impl BruteForceDetector {
    pub fn new(config: BruteForceConfig) -> Result<Self, DetectionError> {
        Ok(Self {
            config,
            failures: SignatureEngine::with_patterns(FAILURE_MARKERS.iter().copied())?,
        })
    }

    /// `(client, server, port)` for packets that count as an attempt.
    fn attempt(&self, packet: &Packet) -> Option<(Ipv4Addr, Ipv4Addr, u16)> {
        let ip = packet.ipv4().ok()?;
        let tcp = packet.tcp().ok()?;
        if tcp.flags.is_syn_only() && self.config.ports.contains(&tcp.destination_port) {
            return Some((ip.source, ip.destination, tcp.destination_port));
        }
        if self.config.ports.contains(&tcp.source_port)
            && !tcp.payload.is_empty()
            && self.failures.buffer_matches(&tcp.payload)
        {
            return Some((ip.destination, ip.source, tcp.source_port));
        }
        None
    }
}

impl Detector for BruteForceDetector {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let width_us = self.config.window_ms.saturating_mul(1_000);
        let mut groups: HashMap<(Ipv4Addr, Ipv4Addr, u16), Vec<u64>> = HashMap::new();
        for packet in packets {
            if let Some(key) = self.attempt(packet) {
                groups.entry(key).or_default().push(packet.timestamp_us);
            }
        }

        let mut targets: Vec<BruteForceTarget> = groups
            .into_iter()
            .filter_map(|((client, server, port), mut timestamps)| {
                let attempts = peak_count(&mut timestamps, width_us);
                (attempts > self.config.max_attempts).then_some(BruteForceTarget {
                    client,
                    server,
                    port,
                    attempts,
                })
            })
            .collect();
        targets.sort_by(|a, b| {
            b.attempts
                .cmp(&a.attempts)
                .then((a.client, a.server, a.port).cmp(&(b.client, b.server, b.port)))
        });

        for target in &targets {
            debug!(
                client = %target.client,
                server = %target.server,
                port = target.port,
                attempts = target.attempts,
                "Repeated login attempts"
            );
        }

        Finding::new(
            self.name(),
            targets.len(),
            FindingDetails::BruteForce { targets },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparhund_core::{PacketBuilder, TcpFlags};

    const ATTACKER: [u8; 4] = [203, 0, 113, 7];
    const SERVER: [u8; 4] = [10, 0, 0, 1];

    fn syn(port: u16, ms: u64) -> Packet {
        PacketBuilder::tcp(ATTACKER, 50000 + (ms % 1000) as u16, SERVER, port)
            .flags(TcpFlags::SYN)
            .timestamp_ms(ms)
            .build()
    }

    fn detector(max_attempts: usize) -> BruteForceDetector {
        BruteForceDetector::new(BruteForceConfig {
            max_attempts,
            ..BruteForceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_ssh_syn_flood_flagged() {
        let packets: Vec<Packet> = (0..15).map(|i| syn(22, i * 500)).collect();
        let finding = detector(10).detect(&packets);
        assert_eq!(finding.number_of_detected, 1);
        match finding.details {
            FindingDetails::BruteForce { targets } => {
                assert_eq!(targets[0].client, Ipv4Addr::from(ATTACKER));
                assert_eq!(targets[0].port, 22);
                assert_eq!(targets[0].attempts, 15);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_attempts_outside_window_not_flagged() {
        let packets: Vec<Packet> = (0..15).map(|i| syn(22, i * 10_000)).collect();
        assert_eq!(detector(10).detect(&packets).number_of_detected, 0);
    }

    #[test]
    fn test_non_auth_port_ignored() {
        let packets: Vec<Packet> = (0..50).map(|i| syn(443, i)).collect();
        assert_eq!(detector(10).detect(&packets).number_of_detected, 0);
    }

    #[test]
    fn test_syn_ack_not_an_attempt() {
        let packets: Vec<Packet> = (0..20)
            .map(|i| {
                PacketBuilder::tcp(ATTACKER, 50000, SERVER, 22)
                    .flags(TcpFlags::SYN | TcpFlags::ACK)
                    .timestamp_ms(i)
                    .build()
            })
            .collect();
        assert_eq!(detector(10).detect(&packets).number_of_detected, 0);
    }

    #[test]
    fn test_ftp_failure_replies_counted() {
        let packets: Vec<Packet> = (0..4)
            .map(|i| {
                PacketBuilder::tcp(SERVER, 21, ATTACKER, 50000)
                    .payload("530 Login incorrect.\r\n")
                    .timestamp_ms(i * 100)
                    .build()
            })
            .collect();
        let finding = detector(3).detect(&packets);
        assert_eq!(finding.number_of_detected, 1);
        assert!(matches!(
            &finding.details,
            FindingDetails::BruteForce { targets } if targets[0].server == Ipv4Addr::from(SERVER)
        ));
    }
}
