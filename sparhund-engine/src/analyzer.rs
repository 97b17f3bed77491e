//! ## sparhund-engine::analyzer
//! **Classifier and detector pipeline**
//!
//! [`Analyzer::analyze`] runs every stage on the calling thread.
//! [`Analyzer::analyze_concurrent`] fans the detectors out onto tokio's
//! blocking pool and joins them in registration order, so both paths yield
//! the same report for the same input.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use sparhund_capture::PacketSource;
use sparhund_config::{AnalysisConfig, FilterConfig};
use sparhund_core::classifier::{
    extract_dns_query_names, parse_beacon_frames, parse_management_frames, split_by_transport,
    PacketFilter,
};
use sparhund_core::Packet;
use sparhund_detection::{default_detectors, Detector, Finding, FindingDetails};
use sparhund_telemetry::{EventLogger, MetricsRecorder};

use crate::error::EngineError;
use crate::report::{PacketCategory, Report, ReportBuilder};

#[derive(Clone)]
pub struct Analyzer {
    filters: FilterConfig,
    detectors: Vec<Arc<dyn Detector>>,
    metrics: Option<MetricsRecorder>,
}

impl Analyzer {
    /// Builds the seven detectors from `config`. Fails only when a detector's
    /// signature set cannot be compiled.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, EngineError> {
        Ok(Self {
            filters: config.filters.clone(),
            detectors: default_detectors(&config.detection)?,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    /// Reads `source` and analyzes it sequentially. Capture errors are
    /// returned unchanged inside [`EngineError::Capture`].
    pub fn analyze_source<S: PacketSource>(&self, source: S) -> Result<Report, EngineError> {
        let identifier = source.identifier();
        let packets = source.packets()?;
        Ok(self.analyze(&identifier, &packets))
    }

    /// Like [`Analyzer::analyze_source`], but reads the source on tokio's
    /// blocking pool before fanning the detectors out.
    pub async fn analyze_source_concurrent<S>(&self, source: S) -> Result<Report, EngineError>
    where
        S: PacketSource + Send + 'static,
    {
        let identifier = source.identifier();
        let packets: Arc<[Packet]> = tokio::task::spawn_blocking(move || source.packets())
            .await??
            .into();
        Ok(self.analyze_concurrent(&identifier, packets).await)
    }

    #[instrument(level = "info", name = "analyze", skip(self, packets), fields(packets = packets.len()))]
    pub fn analyze(&self, source: &str, packets: &[Packet]) -> Report {
        let started = Instant::now();
        let findings: Vec<Finding> = self
            .detectors
            .iter()
            .map(|detector| {
                let finding = detector.detect(packets);
                debug!(
                    detector = detector.name(),
                    number_of_detected = finding.number_of_detected,
                    "Detector finished"
                );
                finding
            })
            .collect();
        self.finish(self.classify(source, packets), findings, packets.len(), started)
    }

    /// Detectors run on `spawn_blocking`. A detector task that panics or is
    /// cancelled yields a zero finding with [`FindingDetails::Unavailable`].
    #[instrument(level = "info", name = "analyze_concurrent", skip(self, packets), fields(packets = packets.len()))]
    pub async fn analyze_concurrent(&self, source: &str, packets: Arc<[Packet]>) -> Report {
        let started = Instant::now();
        let handles: Vec<_> = self
            .detectors
            .iter()
            .map(|detector| {
                let detector = Arc::clone(detector);
                let packets = Arc::clone(&packets);
                let name = detector.name();
                (name, tokio::task::spawn_blocking(move || detector.detect(&packets)))
            })
            .collect();

        let builder = self.classify(source, &packets);

        let mut findings = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(finding) => findings.push(finding),
                Err(e) => {
                    warn!(detector = name, error = %e, "Detector task failed");
                    findings.push(Finding::new(
                        name,
                        0,
                        FindingDetails::Unavailable {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }
        self.finish(builder, findings, packets.len(), started)
    }

    /// Every filter is applied to the full sequence independently.
    fn classify(&self, source: &str, packets: &[Packet]) -> ReportBuilder {
        let filters = &self.filters;
        let split = split_by_transport(packets);
        let count = |filter: PacketFilter| packets.iter().filter(|p| filter.matches(p)).count();

        ReportBuilder::new(source)
            .count(PacketCategory::Tcp, split.tcp.len())
            .count(PacketCategory::Udp, split.udp.len())
            .count(PacketCategory::Icmp, split.icmp.len())
            .count(PacketCategory::Other, split.other.len())
            .count(
                PacketCategory::SourceIp,
                count(PacketFilter::SourceAddress(filters.source_ip)),
            )
            .count(
                PacketCategory::DestinationPort,
                count(PacketFilter::DestinationPort(filters.destination_port)),
            )
            .count(
                PacketCategory::MacAddress,
                count(PacketFilter::LinkAddress(filters.mac_address)),
            )
            .count(
                PacketCategory::IpRange,
                count(PacketFilter::AddressRange(filters.address_range())),
            )
            .count(
                PacketCategory::Protocol,
                count(PacketFilter::Protocol(filters.protocol)),
            )
            .count(
                PacketCategory::Suspicious,
                count(PacketFilter::PayloadLargerThan(filters.max_payload_size)),
            )
            .count(
                PacketCategory::Syn,
                count(PacketFilter::TransportFlags(filters.tcp_flags)),
            )
            .count(
                PacketCategory::ManagementFrames,
                parse_management_frames(packets).len(),
            )
            .dns_domains(extract_dns_query_names(packets))
            .beacon_channels(parse_beacon_frames(packets))
    }

    fn finish(
        &self,
        builder: ReportBuilder,
        findings: Vec<Finding>,
        packet_count: usize,
        started: Instant,
    ) -> Report {
        let report = builder.findings(findings).build();

        for finding in &report.vulnerabilities {
            EventLogger::log_finding(finding.detector, finding.number_of_detected, &finding.details);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_packets(packet_count);
            for finding in &report.vulnerabilities {
                metrics.record_finding(finding.detector, finding.number_of_detected);
            }
            metrics.observe_duration(started.elapsed());
        }
        EventLogger::log_summary(&report.source, packet_count, report.total_vulnerabilities_detected);
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Report built");
        report
    }
}
