//! ## sparhund-telemetry::metrics
//! **Prometheus registry for analysis runs**

use std::time::Duration;

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::TelemetryError;

#[derive(Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub packets_analyzed: IntCounter,
    pub findings: IntCounterVec,
    pub analysis_duration: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();
        let packets_analyzed = IntCounter::new(
            "sparhund_packets_analyzed_total",
            "Total packets passed to the analyzer",
        )?;
        let findings = IntCounterVec::new(
            Opts::new(
                "sparhund_findings_total",
                "Detected issues, by detector",
            ),
            &["detector"],
        )?;
        let analysis_duration = Histogram::with_opts(
            HistogramOpts::new(
                "sparhund_analysis_duration_seconds",
                "Wall time of one analysis run",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0, 60.0]),
        )?;

        registry.register(Box::new(packets_analyzed.clone()))?;
        registry.register(Box::new(findings.clone()))?;
        registry.register(Box::new(analysis_duration.clone()))?;

        Ok(Self {
            registry,
            packets_analyzed,
            findings,
            analysis_duration,
        })
    }

    pub fn record_packets(&self, count: usize) {
        self.packets_analyzed.inc_by(count as u64);
    }

    pub fn record_finding(&self, detector: &str, number_of_detected: usize) {
        self.findings
            .with_label_values(&[detector])
            .inc_by(number_of_detected as u64);
    }

    pub fn observe_duration(&self, elapsed: Duration) {
        self.analysis_duration.observe(elapsed.as_secs_f64());
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather_metrics(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_contains_recorded_values() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_packets(42);
        metrics.record_finding("ddos", 2);
        metrics.record_finding("nxdomain", 5);
        metrics.observe_duration(Duration::from_millis(30));

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("sparhund_packets_analyzed_total 42"));
        assert!(text.contains("sparhund_findings_total{detector=\"ddos\"} 2"));
        assert!(text.contains("sparhund_findings_total{detector=\"nxdomain\"} 5"));
        assert!(text.contains("sparhund_analysis_duration_seconds_count 1"));
    }

    #[test]
    fn test_registry_errors_surface_as_metrics_errors() {
        let metrics = MetricsRecorder::new().unwrap();
        let register = || -> Result<(), TelemetryError> {
            metrics
                .registry
                .register(Box::new(metrics.packets_analyzed.clone()))?;
            Ok(())
        };
        assert!(matches!(
            register(),
            Err(TelemetryError::Metrics(prometheus::Error::AlreadyReg))
        ));
    }

    #[test]
    fn test_recorders_are_independent() {
        let a = MetricsRecorder::new().unwrap();
        let b = MetricsRecorder::new().unwrap();
        a.record_packets(1);
        assert!(b
            .gather_metrics()
            .unwrap()
            .contains("sparhund_packets_analyzed_total 0"));
    }
}
