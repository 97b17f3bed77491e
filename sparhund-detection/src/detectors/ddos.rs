use std::collections::HashMap;
use std::net::Ipv4Addr;

use sparhund_config::DdosConfig;
use sparhund_core::Packet;
use tracing::debug;

use super::Detector;
use crate::finding::{Finding, FindingDetails, SourceRate};
use crate::window::peak_count;

/// Flags IPv4 sources whose packet rate within one window exceeds the
/// per-source threshold, plus one for a capture-wide spike.
pub struct DdosDetector {
    config: DdosConfig,
}

impl DdosDetector {
    pub fn new(config: DdosConfig) -> Self {
        Self { config }
    }
}

impl Detector for DdosDetector {
    fn name(&self) -> &'static str {
        "ddos"
    }

    fn detect(&self, packets: &[Packet]) -> Finding {
        let width_us = self.config.window_ms.saturating_mul(1_000);

        let mut by_source: HashMap<Ipv4Addr, Vec<u64>> = HashMap::new();
        for packet in packets {
            if let Ok(ip) = packet.ipv4() {
                by_source
                    .entry(ip.source)
                    .or_default()
                    .push(packet.timestamp_us);
            }
        }

        let mut flagged_sources: Vec<SourceRate> = by_source
            .into_iter()
            .filter_map(|(source, mut timestamps)| {
                let peak = peak_count(&mut timestamps, width_us);
                (peak > self.config.per_source_threshold).then_some(SourceRate { source, peak })
            })
            .collect();
        flagged_sources.sort_by(|a, b| b.peak.cmp(&a.peak).then(a.source.cmp(&b.source)));

        let mut all: Vec<u64> = packets.iter().map(|p| p.timestamp_us).collect();
        let peak_total = peak_count(&mut all, width_us);
        let global_spike = peak_total > self.config.total_threshold;

        for rate in &flagged_sources {
            debug!(source = %rate.source, peak = rate.peak, "Source exceeded rate threshold");
        }

        Finding::new(
            self.name(),
            flagged_sources.len() + usize::from(global_spike),
            FindingDetails::Ddos {
                flagged_sources,
                peak_total,
                global_spike,
            },
        )
    }
}
