//! Repository adapter over the GitHub contents API.
//!
//! ### Requests
//! - Listing: `GET {api}/repos/{owner}/{repo}/contents/docs/_{domain}?ref={branch}`
//! - Body: `GET {download_url}` as returned by the listing
//!
//! One attempt per call. Retry and degradation are handled by the discovery
//! layer in core, which falls back to the persisted or static catalog.

pub mod listing;
pub mod url;

pub use listing::{ContentItem, parse_listing};
pub use url::{UrlError, contents_url, validate_url};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

use secframe_core::catalog::RemoteEntry;
use secframe_core::{AppConfig, BodySource, CatalogSource, Domain, Error};

/// Configuration for the repository client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Contents API base (default: https://api.github.com)
    pub api_base_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// User agent string (default: "mcp-secframe/0.1")
    pub user_agent: String,
    /// Request timeout (default: 15s)
    pub timeout: Duration,
    /// Maximum response body size in bytes (default: 2MB)
    pub max_bytes: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for GithubConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_base_url: config.api_base_url.clone(),
            owner: config.repo_owner.clone(),
            repo: config.repo_name.clone(),
            branch: config.repo_branch.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_bytes: config.max_bytes,
        }
    }
}

/// HTTP client for catalog listings and document bodies.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GithubConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::RemoteFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(GithubConfig::from(config))
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    async fn get(&self, url: &str, accept: &str) -> Result<Bytes, Error> {
        let start = Instant::now();
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| map_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {url}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }

        let bytes = response.bytes().await.map_err(|e| map_transport(url, e))?;
        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(url, bytes = bytes.len(), fetch_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(bytes)
    }
}

fn map_transport(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::RemoteFetch(format!("network error for {url}: {err}"))
    }
}

#[async_trait]
impl CatalogSource for GithubClient {
    async fn list(&self, domain: Domain) -> Result<Vec<RemoteEntry>, Error> {
        let url = contents_url(
            &self.config.api_base_url,
            &self.config.owner,
            &self.config.repo,
            &self.config.branch,
            domain,
        )
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let body = self.get(url.as_str(), "application/vnd.github+json").await?;
        let entries = parse_listing(&body)?;
        tracing::debug!(%domain, count = entries.len(), "listed catalog directory");
        Ok(entries)
    }
}

#[async_trait]
impl BodySource for GithubClient {
    async fn fetch(&self, download_url: &str) -> Result<String, Error> {
        let url = validate_url(download_url).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let body = self.get(url.as_str(), "text/markdown, text/plain;q=0.9, */*;q=0.5").await?;
        String::from_utf8(body.to_vec()).map_err(|e| Error::RemoteFetch(format!("body is not UTF-8: {e}")))
    }
}
