//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::cache::MAX_OBJECT_SIZE;
use crate::config::AppConfig;
use thiserror::Error;

/// Minimum length of the cache secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound for both TTLs: one year.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Check a cache secret against the minimum length.
pub(crate) fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(ConfigError::Invalid {
            field: "cache_secret".into(),
            reason: format!("must be at least {MIN_SECRET_LEN} characters"),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// The cache secret is not checked here; it is validated when the
    /// cache is constructed so that tools not touching the cache still load.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `environment` is empty or contains characters unsafe in a filename
    /// - either TTL is 0 or longer than [`MAX_TTL_SECS`]
    /// - `cache_max_entries` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds the cache object ceiling
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_empty()
            || !self
                .environment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid {
                field: "environment".into(),
                reason: "must be non-empty and contain only [A-Za-z0-9_-]".into(),
            });
        }

        for (field, secs) in [("discovery_ttl_secs", self.discovery_ttl_secs), ("content_ttl_secs", self.content_ttl_secs)]
        {
            if secs == 0 || secs > MAX_TTL_SECS {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("must be between 1 and {MAX_TTL_SECS} seconds"),
                });
            }
        }

        if self.cache_max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_max_entries".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > MAX_OBJECT_SIZE {
            return Err(ConfigError::Invalid {
                field: "max_bytes".into(),
                reason: format!("must not exceed {MAX_OBJECT_SIZE}"),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.cache_secret.is_none() {
            tracing::warn!("cache_secret is not set; document bodies cannot be cached until it is");
        }

        Ok(())
    }
}
