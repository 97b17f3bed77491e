//! ## sparhund-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! `RUST_LOG` wins over the configured level when it is set.

use std::fmt;

use tracing::{info, info_span};
use tracing_subscriber::{fmt as subscriber_fmt, EnvFilter};

use crate::error::TelemetryError;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `json` switches to one JSON object
    /// per line.
    pub fn init(level: &str, json: bool) -> Result<(), TelemetryError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(level).map_err(|e| TelemetryError::Filter {
                directive: level.to_string(),
                reason: e.to_string(),
            })?,
        };

        let builder = subscriber_fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);
        let result = if json {
            builder.json().try_init()
        } else {
            builder.with_thread_names(true).try_init()
        };
        result.map_err(|e| TelemetryError::SubscriberInstalled(e.to_string()))
    }

    /// One structured event per detected issue.
    #[inline]
    pub fn log_finding(detector: &str, number_of_detected: usize, details: &impl fmt::Debug) {
        let span = info_span!("security_event", detector = detector);
        span.in_scope(|| {
            info!(
                number_of_detected,
                details = ?details,
                "Security issue detected"
            );
        });
    }

    /// Run summary, logged once per analysis.
    pub fn log_summary(source: &str, packets: usize, vulnerabilities: usize) {
        info!(source, packets, vulnerabilities, "Analysis finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_log_finding() {
        EventLogger::log_finding("ddos", 2, &vec!["192.168.0.66"]);
        assert!(logs_contain("Security issue detected"));
        assert!(logs_contain("security_event"));
        assert!(logs_contain("192.168.0.66"));
    }

    #[traced_test]
    #[test]
    fn test_log_summary() {
        EventLogger::log_summary("capture.pcap", 120, 3);
        assert!(logs_contain("Analysis finished"));
        assert!(logs_contain("capture.pcap"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_err() {
            assert!(matches!(
                EventLogger::init("sparhund=loud", false),
                Err(TelemetryError::Filter { .. })
            ));
        }
    }
}
