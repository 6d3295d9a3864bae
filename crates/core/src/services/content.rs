//! Document lookup over the discovered catalog and the body cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::discovery::DiscoveryService;
use super::document::{Document, DocumentSummary};
use crate::Error;
use crate::cache::TtlCache;
use crate::catalog::{DiscoverySource, Domain};
use crate::remote::BodySource;

/// Catalog listing for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentListing {
    pub domain: Domain,
    pub source: DiscoverySource,
    pub cache_expires: DateTime<Utc>,
    pub documents: Vec<DocumentSummary>,
}

/// Cache key for a document body.
pub fn body_key(domain: Domain, filename: &str) -> String {
    format!("{domain}:{filename}")
}

/// Resolves identities to catalog entries and serves their bodies.
pub struct ContentService {
    discovery: Arc<DiscoveryService>,
    bodies: Arc<dyn BodySource>,
    cache: Arc<TtlCache>,
}

impl ContentService {
    pub fn new(discovery: Arc<DiscoveryService>, bodies: Arc<dyn BodySource>, cache: Arc<TtlCache>) -> Self {
        Self { discovery, bodies, cache }
    }

    pub fn discovery(&self) -> &DiscoveryService {
        &self.discovery
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Fetch the document in `domain` matching `identity`.
    ///
    /// Returns `Ok(None)` when no catalog entry matches.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for an empty identity
    /// - remote errors from the body download
    /// - cache validation errors when the body is too large or compresses
    ///   past the allowed ratio
    pub async fn get_document(&self, domain: Domain, identity: &str) -> Result<Option<Document>, Error> {
        if identity.trim().is_empty() {
            return Err(Error::InvalidInput("document id cannot be empty".into()));
        }

        let catalog = self.discovery.discover_content().await;
        let Some(entry) = catalog.find(domain, identity) else {
            tracing::debug!(%domain, identity, source = %catalog.source, "no catalog entry matches");
            return Ok(None);
        };

        let key = body_key(domain, &entry.filename);
        match self.cache.get::<String>(&key) {
            Ok(Some(body)) => {
                tracing::debug!(key, "body cache hit");
                return Ok(Some(Document::new(domain, entry, body)));
            }
            Ok(None) => tracing::debug!(key, "body cache miss"),
            Err(e) => {
                tracing::warn!(key, error = %e, "unreadable cached body, refetching");
                self.cache.invalidate(&key);
            }
        }

        let body = self.bodies.fetch(&entry.download_url).await?;
        self.cache.set(&key, &body, None)?;
        Ok(Some(Document::new(domain, entry, body)))
    }

    /// List the catalog for `domain` without fetching bodies.
    pub async fn list_documents(&self, domain: Domain) -> DocumentListing {
        let catalog = self.discovery.discover_content().await;
        DocumentListing {
            domain,
            source: catalog.source,
            cache_expires: catalog.cache_expires,
            documents: catalog.entries(domain).iter().map(DocumentSummary::from).collect(),
        }
    }
}
