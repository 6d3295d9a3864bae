//! Catalog types shared by discovery and content lookup.

pub mod fallback;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

pub use store::{CatalogSnapshot, DiscoveryCacheStore, SnapshotEntry};

/// The three document collections in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Mitigations,
    Risks,
    Frameworks,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Mitigations, Domain::Risks, Domain::Frameworks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Mitigations => "mitigations",
            Domain::Risks => "risks",
            Domain::Frameworks => "frameworks",
        }
    }

    /// Directory holding this domain's documents, relative to the repo root.
    pub fn directory(&self) -> &'static str {
        match self {
            Domain::Mitigations => "docs/_mitigations",
            Domain::Risks => "docs/_risks",
            Domain::Frameworks => "docs/_frameworks",
        }
    }

    /// Filename prefix carried by this domain's documents, if any.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Domain::Mitigations => Some("mi-"),
            Domain::Risks => Some("ri-"),
            Domain::Frameworks => None,
        }
    }

    /// Normalize a filename or caller-supplied identity.
    ///
    /// Lowercases, strips a trailing `.md` and then the domain prefix when
    /// present, so `MI-1_Foo.md`, `mi-1_foo` and `1_foo` agree.
    pub fn canonical_id(&self, name: &str) -> String {
        let lowered = name.trim().to_lowercase();
        let stem = lowered.strip_suffix(".md").unwrap_or(&lowered);
        let id = match self.prefix() {
            Some(prefix) => stem.strip_prefix(prefix).unwrap_or(stem),
            None => stem,
        };
        id.to_string()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mitigations" | "mitigation" => Ok(Domain::Mitigations),
            "risks" | "risk" => Ok(Domain::Risks),
            "frameworks" | "framework" => Ok(Domain::Frameworks),
            other => Err(Error::InvalidInput(format!("unknown domain: {other}"))),
        }
    }
}

/// One document as listed by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub filename: String,
    pub path: String,
    pub content_hash: String,
    pub download_url: String,
}

/// One document's identity, change-detection hash and download location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogEntry {
    /// Canonical identity, see [`Domain::canonical_id`].
    pub id: String,
    pub filename: String,
    pub path: String,
    /// Absent for entries served from the static fallback.
    pub content_hash: Option<String>,
    pub download_url: String,
}

impl CatalogEntry {
    pub fn from_remote(domain: Domain, remote: RemoteEntry) -> Self {
        Self {
            id: domain.canonical_id(&remote.filename),
            filename: remote.filename,
            path: remote.path,
            content_hash: Some(remote.content_hash),
            download_url: remote.download_url,
        }
    }

    pub fn from_snapshot(domain: Domain, stored: &SnapshotEntry) -> Self {
        Self {
            id: domain.canonical_id(&stored.filename),
            filename: stored.filename.clone(),
            path: stored.path.clone(),
            content_hash: Some(stored.content_hash.clone()),
            download_url: stored.download_url.clone(),
        }
    }

    /// Entry for a filename with no hash, downloaded from `raw_repo_url`.
    pub fn from_fallback(domain: Domain, filename: &str, raw_repo_url: &str) -> Self {
        let path = format!("{}/{}", domain.directory(), filename);
        Self {
            id: domain.canonical_id(filename),
            filename: filename.to_string(),
            download_url: format!("{}/{}", raw_repo_url.trim_end_matches('/'), path),
            path,
            content_hash: None,
        }
    }
}

/// Where a discovery cycle's catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    Remote,
    Cache,
    StaticFallback,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscoverySource::Remote => "remote",
            DiscoverySource::Cache => "cache",
            DiscoverySource::StaticFallback => "static_fallback",
        })
    }
}

/// Outcome of one discovery cycle. All three domains share one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryResult {
    pub source: DiscoverySource,
    pub mitigations: Vec<CatalogEntry>,
    pub risks: Vec<CatalogEntry>,
    pub frameworks: Vec<CatalogEntry>,
    pub cache_expires: DateTime<Utc>,
}

impl DiscoveryResult {
    pub fn entries(&self, domain: Domain) -> &[CatalogEntry] {
        match domain {
            Domain::Mitigations => &self.mitigations,
            Domain::Risks => &self.risks,
            Domain::Frameworks => &self.frameworks,
        }
    }

    /// Find the entry whose canonical id matches `identity` after normalization.
    pub fn find(&self, domain: Domain, identity: &str) -> Option<&CatalogEntry> {
        let wanted = domain.canonical_id(identity);
        self.entries(domain).iter().find(|e| e.id == wanted)
    }

    pub fn from_snapshot(source: DiscoverySource, snapshot: &CatalogSnapshot) -> Self {
        let convert = |domain: Domain| -> Vec<CatalogEntry> {
            snapshot.entries(domain).iter().map(|e| CatalogEntry::from_snapshot(domain, e)).collect()
        };
        Self {
            source,
            mitigations: convert(Domain::Mitigations),
            risks: convert(Domain::Risks),
            frameworks: convert(Domain::Frameworks),
            cache_expires: snapshot.cache_expires,
        }
    }
}
