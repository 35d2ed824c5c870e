//! Bounds checks applied after configuration is loaded.

use std::ops::RangeInclusive;

use crate::config::AppConfig;
use thiserror::Error;

const MAX_BYTES_RANGE: RangeInclusive<usize> = 1..=50 * 1024 * 1024;
const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=300_000;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_ERROR: failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("CONFIG_ERROR: invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

impl AppConfig {
    /// Check loaded values.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = url::Url::parse(&self.base_url).map_err(|e| invalid("base_url", e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") || !base_url.has_host() {
            return Err(invalid("base_url", "must be an http or https URL with a host"));
        }

        if !MAX_BYTES_RANGE.contains(&self.max_bytes) {
            return Err(invalid("max_bytes", format!("must be between 1 and {} bytes", MAX_BYTES_RANGE.end())));
        }

        if !TIMEOUT_MS_RANGE.contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("must be between {} and {} ms", TIMEOUT_MS_RANGE.start(), TIMEOUT_MS_RANGE.end()),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.selectors.containers.is_empty() {
            return Err(invalid("selectors.containers", "at least one selector is required"));
        }
        if self.selectors.name_links.is_empty() {
            return Err(invalid("selectors.name_links", "at least one selector is required"));
        }

        Ok(())
    }
}
