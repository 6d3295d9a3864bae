//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SECFRAME_*)
//! 2. TOML config file (if SECFRAME_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheSettings;

mod validation;

pub(crate) use validation::check_secret;
pub use validation::{ConfigError, MAX_TTL_SECS, MIN_SECRET_LEN};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SECFRAME_*)
/// 2. TOML config file (if SECFRAME_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Secret scoping cache entries to this deployment.
    ///
    /// Set via SECFRAME_CACHE_SECRET environment variable.
    /// Must be at least 32 characters; checked when the cache is built.
    #[serde(default)]
    pub cache_secret: Option<String>,

    /// Directory holding the persisted catalog snapshot.
    ///
    /// Set via SECFRAME_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Deployment environment name, used in the snapshot filename.
    ///
    /// Set via SECFRAME_ENVIRONMENT environment variable.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// How long a discovered catalog stays fresh, in seconds.
    #[serde(default = "default_discovery_ttl_secs")]
    pub discovery_ttl_secs: u64,

    /// How long a fetched document body stays cached, in seconds.
    #[serde(default = "default_content_ttl_secs")]
    pub content_ttl_secs: u64,

    /// Maximum number of entries held by the body cache.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Whether cached values are lz4-compressed.
    #[serde(default = "default_true")]
    pub cache_compression: bool,

    /// Owner of the repository holding the documents.
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Name of the repository holding the documents.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Branch the catalog is read from.
    #[serde(default = "default_repo_branch")]
    pub repo_branch: String,

    /// Base URL of the contents API used for catalog listings.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for raw downloads, used when building fallback entries.
    #[serde(default = "default_raw_base_url")]
    pub raw_base_url: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes accepted for a single document body.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./.secframe-cache")
}

fn default_environment() -> String {
    "production".into()
}

fn default_discovery_ttl_secs() -> u64 {
    86_400
}

fn default_content_ttl_secs() -> u64 {
    3_600
}

fn default_cache_max_entries() -> usize {
    512
}

fn default_true() -> bool {
    true
}

fn default_repo_owner() -> String {
    "finos".into()
}

fn default_repo_name() -> String {
    "ai-governance-framework".into()
}

fn default_repo_branch() -> String {
    "main".into()
}

fn default_api_base_url() -> String {
    "https://api.github.com".into()
}

fn default_raw_base_url() -> String {
    "https://raw.githubusercontent.com".into()
}

fn default_user_agent() -> String {
    "mcp-secframe/0.1".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_secret: None,
            cache_dir: default_cache_dir(),
            environment: default_environment(),
            discovery_ttl_secs: default_discovery_ttl_secs(),
            content_ttl_secs: default_content_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_compression: true,
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            repo_branch: default_repo_branch(),
            api_base_url: default_api_base_url(),
            raw_base_url: default_raw_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Catalog snapshot TTL, capped at [`MAX_TTL_SECS`].
    pub fn discovery_ttl(&self) -> chrono::Duration {
        i64::try_from(self.discovery_ttl_secs.min(MAX_TTL_SECS))
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::days(365))
    }

    /// Document body TTL, capped at [`MAX_TTL_SECS`].
    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs.min(MAX_TTL_SECS))
    }

    /// Raw download prefix for the configured repository and branch.
    pub fn raw_repo_url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_base_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name,
            self.repo_branch
        )
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SECFRAME_`
    /// 2. TOML file from `SECFRAME_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SECFRAME_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SECFRAME_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Return the cache secret, checking presence and minimum length.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no secret is set and
    /// `ConfigError::Invalid` if it is shorter than [`MIN_SECRET_LEN`].
    pub fn require_cache_secret(&self) -> Result<&str, ConfigError> {
        let secret = self.cache_secret.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "cache_secret".into(),
            hint: "Set SECFRAME_CACHE_SECRET environment variable".into(),
        })?;
        check_secret(secret)?;
        Ok(secret)
    }

    /// Settings for the document body cache.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            secret: self.cache_secret.clone().unwrap_or_default(),
            max_entries: self.cache_max_entries,
            default_ttl: self.content_ttl(),
            compression: self.cache_compression,
        }
    }
}
