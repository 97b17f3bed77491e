//! ## sparhund-detection::detectors
//! The seven traffic anomaly detectors.
//!
//! Every detector is a pure function of the packet sequence: it holds only
//! its configuration, never fails for lack of evidence, and treats a packet
//! it cannot interpret as "no evidence here".

mod brute_force;
mod ddos;
mod nxdomain;
mod phishing;
mod sql_injection;
mod unencrypted;
mod weak_credentials;

use std::sync::Arc;

use sparhund_config::DetectionConfig;
use sparhund_core::Packet;

use crate::error::DetectionError;
use crate::finding::Finding;

pub use brute_force::BruteForceDetector;
pub use ddos::DdosDetector;
pub use nxdomain::NxdomainDetector;
pub use phishing::PhishingDomainDetector;
pub use sql_injection::SqlInjectionDetector;
pub use unencrypted::UnencryptedTrafficDetector;
pub use weak_credentials::WeakCredentialsDetector;

pub trait Detector: Send + Sync {
    /// Stable identifier, used as the finding's `detector` field.
    fn name(&self) -> &'static str;

    fn detect(&self, packets: &[Packet]) -> Finding;
}

/// Builds every detector in report order.
pub fn default_detectors(config: &DetectionConfig) -> Result<Vec<Arc<dyn Detector>>, DetectionError> {
    Ok(vec![
        Arc::new(DdosDetector::new(config.ddos.clone())),
        Arc::new(UnencryptedTrafficDetector::new(
            config.unencrypted_traffic.clone(),
        )),
        Arc::new(SqlInjectionDetector::new(&config.sql_injection)?),
        Arc::new(WeakCredentialsDetector::new(config.weak_credentials.clone())?),
        Arc::new(NxdomainDetector::new(config.nxdomain.clone())),
        Arc::new(PhishingDomainDetector::new(config.phishing_domains.clone())),
        Arc::new(BruteForceDetector::new(config.brute_force.clone())?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_and_names() {
        let detectors = default_detectors(&DetectionConfig::default()).unwrap();
        let names: Vec<_> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "ddos",
                "unencrypted_traffic",
                "sql_injection",
                "weak_credentials",
                "nxdomain",
                "phishing_domains",
                "brute_force",
            ]
        );
    }

    #[test]
    fn test_empty_capture_yields_zero_findings() {
        for detector in default_detectors(&DetectionConfig::default()).unwrap() {
            let finding = detector.detect(&[]);
            assert_eq!(finding.detector, detector.name());
            assert_eq!(finding.number_of_detected, 0, "{}", detector.name());
        }
    }
}
