//! Detector thresholds and signature lists.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Parameters for every detector the analyzer runs.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetectionConfig {
    #[validate(nested)]
    #[serde(default)]
    pub ddos: DdosConfig,

    #[validate(nested)]
    #[serde(default)]
    pub unencrypted_traffic: UnencryptedTrafficConfig,

    #[validate(nested)]
    #[serde(default)]
    pub sql_injection: SqlInjectionConfig,

    #[validate(nested)]
    #[serde(default)]
    pub weak_credentials: WeakCredentialsConfig,

    #[validate(nested)]
    #[serde(default)]
    pub nxdomain: NxdomainConfig,

    #[validate(nested)]
    #[serde(default)]
    pub phishing_domains: PhishingDomainsConfig,

    #[validate(nested)]
    #[serde(default)]
    pub brute_force: BruteForceConfig,
}

/// Volume spikes inside a sliding time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DdosConfig {
    /// Window length in milliseconds.
    #[validate(range(min = 1, max = 3_600_000))]
    #[serde(default = "default_ddos_window_ms")]
    pub window_ms: u64,

    /// Packets one source may send within a window.
    #[validate(range(min = 1))]
    #[serde(default = "default_per_source_threshold")]
    pub per_source_threshold: usize,

    /// Packets all sources together may send within a window.
    #[validate(range(min = 1))]
    #[serde(default = "default_total_threshold")]
    pub total_threshold: usize,
}

fn default_ddos_window_ms() -> u64 {
    1_000
}
fn default_per_source_threshold() -> usize {
    100
}
fn default_total_threshold() -> usize {
    1_000
}

impl Default for DdosConfig {
    fn default() -> Self {
        Self {
            window_ms: default_ddos_window_ms(),
            per_source_threshold: default_per_source_threshold(),
            total_threshold: default_total_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UnencryptedTrafficConfig {
    /// Ports whose payload travels in clear text.
    #[validate(custom(function = validation::validate_port_list))]
    #[serde(default = "default_cleartext_ports")]
    pub ports: Vec<u16>,
}

fn default_cleartext_ports() -> Vec<u16> {
    vec![21, 23, 25, 80, 110, 143, 8080]
}

impl Default for UnencryptedTrafficConfig {
    fn default() -> Self {
        Self {
            ports: default_cleartext_ports(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SqlInjectionConfig {
    /// Byte patterns, matched ASCII case-insensitively.
    #[validate(length(min = 1), custom(function = validation::validate_non_blank_list))]
    #[serde(default = "default_sql_signatures")]
    pub signatures: Vec<String>,
}

fn default_sql_signatures() -> Vec<String> {
    [
        "' or '1'='1",
        "' or 1=1",
        "\" or \"1\"=\"1",
        " or 1=1--",
        "union select",
        "union all select",
        "'; drop table",
        "; drop table",
        "'; exec",
        "xp_cmdshell",
        "information_schema",
        "waitfor delay",
        "sleep(",
        "benchmark(",
        "load_file(",
        "into outfile",
        "' --",
        "'--",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SqlInjectionConfig {
    fn default() -> Self {
        Self {
            signatures: default_sql_signatures(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeakCredentialsConfig {
    /// Passwords that are always weak (compared case-insensitively).
    #[validate(custom(function = validation::validate_non_blank_list))]
    #[serde(default = "default_weak_passwords")]
    pub weak_passwords: Vec<String>,

    /// Shorter passwords are weak.
    #[validate(range(min = 1, max = 128))]
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

fn default_weak_passwords() -> Vec<String> {
    [
        "123456", "12345678", "123456789", "12345", "1234", "111111", "password",
        "password1", "qwerty", "abc123", "admin", "administrator", "root", "toor",
        "letmein", "welcome", "changeme", "default", "guest", "test", "pass",
        "secret", "iloveyou", "monkey", "dragon",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_min_password_length() -> usize {
    8
}

impl Default for WeakCredentialsConfig {
    fn default() -> Self {
        Self {
            weak_passwords: default_weak_passwords(),
            min_password_length: default_min_password_length(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NxdomainConfig {
    /// Share of DNS responses that may be NXDOMAIN.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,

    /// Below this many responses the ratio is not evaluated.
    #[validate(range(min = 1))]
    #[serde(default = "default_min_responses")]
    pub min_responses: usize,
}

fn default_max_ratio() -> f64 {
    0.3
}
fn default_min_responses() -> usize {
    10
}

impl Default for NxdomainConfig {
    fn default() -> Self {
        Self {
            max_ratio: default_max_ratio(),
            min_responses: default_min_responses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PhishingDomainsConfig {
    /// Registrable domains that lookalikes imitate.
    #[validate(custom(function = validation::validate_domain_list))]
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    /// Edit distance at or below which a name imitates a trusted domain.
    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,
}

fn default_trusted_domains() -> Vec<String> {
    [
        "google.com",
        "paypal.com",
        "apple.com",
        "microsoft.com",
        "amazon.com",
        "facebook.com",
        "github.com",
        "netflix.com",
        "bankofamerica.com",
        "wellsfargo.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_max_edit_distance() -> usize {
    2
}

impl Default for PhishingDomainsConfig {
    fn default() -> Self {
        Self {
            trusted_domains: default_trusted_domains(),
            max_edit_distance: default_max_edit_distance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BruteForceConfig {
    /// Authentication service ports.
    #[validate(custom(function = validation::validate_port_list))]
    #[serde(default = "default_auth_ports")]
    pub ports: Vec<u16>,

    /// Attempts one client may make against one service within a window.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Window length in milliseconds.
    #[validate(range(min = 1, max = 86_400_000))]
    #[serde(default = "default_brute_force_window_ms")]
    pub window_ms: u64,
}

fn default_auth_ports() -> Vec<u16> {
    vec![21, 22, 23, 25, 110, 143, 3306, 3389, 5432, 5900]
}
fn default_max_attempts() -> usize {
    10
}
fn default_brute_force_window_ms() -> u64 {
    60_000
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            ports: default_auth_ports(),
            max_attempts: default_max_attempts(),
            window_ms: default_brute_force_window_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_default_detection_config() {
        DetectionConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn invalid_thresholds() {
        let mut config = DetectionConfig::default();
        config.ddos.window_ms = 0;
        assert!(config.validate().is_err());

        let mut config = DetectionConfig::default();
        config.nxdomain.max_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_signature_list_rejected() {
        let mut config = DetectionConfig::default();
        config.sql_injection.signatures.clear();
        assert!(config.validate().is_err());

        let mut config = DetectionConfig::default();
        config.sql_injection.signatures.push("   ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn uppercase_trusted_domain_rejected() {
        let mut config = DetectionConfig::default();
        config.phishing_domains.trusted_domains = vec!["PayPal.com".into()];
        assert!(config.validate().is_err());
    }
}
