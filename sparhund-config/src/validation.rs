//! Custom validation functions for configuration.

use validator::ValidationError;

use crate::filters::FilterConfig;

/// The address range bounds must be ordered numerically, whatever
/// comparison mode the filter later uses.
pub fn validate_range_order(filters: &FilterConfig) -> Result<(), ValidationError> {
    let range = &filters.ip_range;
    if u32::from(range.start) <= u32::from(range.end) {
        Ok(())
    } else {
        let mut error = ValidationError::new("range_start_after_end");
        error.message = Some(
            format!(
                "ip_range.start ({}) is after ip_range.end ({})",
                range.start, range.end
            )
            .into(),
        );
        Err(error)
    }
}

/// Port lists must be non-empty and must not contain port 0.
pub fn validate_port_list(ports: &[u16]) -> Result<(), ValidationError> {
    if ports.is_empty() {
        return Err(ValidationError::new("empty_port_list"));
    }
    if ports.contains(&0) {
        return Err(ValidationError::new("invalid_port"));
    }
    Ok(())
}

/// Every entry must be a non-blank string.
pub fn validate_non_blank_list(entries: &[String]) -> Result<(), ValidationError> {
    if entries.iter().any(|e| e.trim().is_empty()) {
        return Err(ValidationError::new("blank_entry"));
    }
    Ok(())
}

/// Trusted domains are lower-case ASCII hostnames with at least two labels.
pub fn validate_domain_list(domains: &[String]) -> Result<(), ValidationError> {
    let re = regex::Regex::new(r"^[a-z0-9-]+(\.[a-z0-9-]+)+$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if domains.iter().all(|d| re.is_match(d)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_domain"))
    }
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
