//! # Sparhund Configuration System
//!
//! Hierarchical configuration for a Sparhund analysis run.
//!
//! ## Features
//! - **Single source of truth**: filter parameters, detector thresholds and
//!   logging options live in one `AnalysisConfig`
//! - **Validation**: ranges, list contents and the address-range ordering are
//!   checked before any packet is touched
//! - **Layering**: defaults, then an optional YAML/JSON file, then
//!   `SPARHUND_*` environment variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod detection;
mod error;
mod filters;
mod telemetry;
mod validation;

pub use detection::{
    BruteForceConfig, DdosConfig, DetectionConfig, NxdomainConfig, PhishingDomainsConfig,
    SqlInjectionConfig, UnencryptedTrafficConfig, WeakCredentialsConfig,
};
pub use error::ConfigError;
pub use filters::FilterConfig;
pub use telemetry::TelemetryConfig;

const ENV_PREFIX: &str = "SPARHUND_";

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Default)]
pub struct AnalysisConfig {
    /// Classifier filter parameters.
    #[validate(nested)]
    #[serde(default)]
    pub filters: FilterConfig,

    /// Detector thresholds.
    #[validate(nested)]
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Logging output.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AnalysisConfig {
    /// Load configuration.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `path`, if given (`.json` files as JSON, anything else as YAML)
    /// 3. `SPARHUND_*` environment variables, `__` separating nested keys
    ///    (`SPARHUND_DETECTION__DDOS__WINDOW_MS=500`)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AnalysisConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Yaml::file(path)),
            };
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parse a YAML document layered over the defaults. Environment
    /// variables are not consulted.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::extract(
            Figment::from(Serialized::defaults(AnalysisConfig::default()))
                .merge(Yaml::string(yaml)),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
