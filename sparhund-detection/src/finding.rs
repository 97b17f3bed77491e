//! ## sparhund-detection::finding
//! The result of running one detector over a capture.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Serialize;

/// Outcome of one detector invocation. `number_of_detected == 0` means the
/// detector saw no evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub detector: &'static str,
    pub number_of_detected: usize,
    pub details: FindingDetails,
}

impl Finding {
    pub fn new(detector: &'static str, number_of_detected: usize, details: FindingDetails) -> Self {
        Self {
            detector,
            number_of_detected,
            details,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.number_of_detected != 0
    }
}

/// Evidence behind a finding, one variant per detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindingDetails {
    Ddos {
        flagged_sources: Vec<SourceRate>,
        peak_total: usize,
        global_spike: bool,
    },
    UnencryptedTraffic {
        services: BTreeMap<String, usize>,
    },
    SqlInjection {
        signatures: BTreeMap<String, usize>,
    },
    WeakCredentials {
        exposures: Vec<CredentialExposure>,
    },
    Nxdomain {
        responses: usize,
        nxdomain: usize,
        ratio: f64,
        domains: Vec<String>,
    },
    PhishingDomains {
        domains: Vec<SuspiciousDomain>,
    },
    BruteForce {
        targets: Vec<BruteForceTarget>,
    },
    /// The detector did not run to completion.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRate {
    pub source: Ipv4Addr,
    /// Most packets seen from `source` inside one window.
    pub peak: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    UserPass,
    ImapLogin,
    HttpBasic,
    HttpForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weakness {
    CommonPassword,
    TooShort,
    SameAsUsername,
}

/// Credentials seen in clear text. The password itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialExposure {
    pub kind: CredentialKind,
    pub client: Option<Ipv4Addr>,
    pub server: Option<Ipv4Addr>,
    pub port: u16,
    pub username: String,
    pub password_length: usize,
    pub weaknesses: Vec<Weakness>,
}

impl CredentialExposure {
    pub fn is_weak(&self) -> bool {
        !self.weaknesses.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case", tag = "indicator")]
pub enum PhishingIndicator {
    HiddenCharacters,
    NonAscii,
    Punycode,
    Confusable { imitates: String },
    Lookalike { imitates: String, distance: usize },
    BrandInSubdomain { imitates: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspiciousDomain {
    pub name: String,
    pub indicators: Vec<PhishingIndicator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BruteForceTarget {
    pub client: Ipv4Addr,
    pub server: Ipv4Addr,
    pub port: u16,
    /// Most attempts seen inside one window.
    pub attempts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let finding = Finding::new(
            "nxdomain",
            4,
            FindingDetails::Nxdomain {
                responses: 10,
                nxdomain: 4,
                ratio: 0.4,
                domains: vec!["nope.invalid.".into()],
            },
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["detector"], "nxdomain");
        assert_eq!(json["number_of_detected"], 4);
        assert_eq!(json["details"]["responses"], 10);
        assert!(finding.is_detected());
    }

    #[test]
    fn test_indicator_tagging() {
        let json = serde_json::to_value(PhishingIndicator::Lookalike {
            imitates: "paypal.com".into(),
            distance: 1,
        })
        .unwrap();
        assert_eq!(json["indicator"], "lookalike");
        assert_eq!(json["distance"], 1);
    }
}
