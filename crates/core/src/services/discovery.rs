//! Catalog discovery: persisted snapshot, hash revalidation, static fallback.
//!
//! ### Decision sequence
//! 1. Fresh snapshot on disk: serve it, no remote call.
//! 2. Expired snapshot: fetch all three listings. Identical membership and
//!    hashes extend the snapshot's expiry; any difference replaces it.
//! 3. No usable snapshot: fetch all three listings and persist them.
//! 4. Any listing fails or comes back empty: serve the embedded lists and
//!    leave the snapshot on disk alone.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::Error;
use crate::catalog::{
    CatalogEntry, CatalogSnapshot, DiscoveryCacheStore, DiscoveryResult, DiscoverySource, Domain, RemoteEntry,
    SnapshotEntry, fallback,
};
use crate::config::AppConfig;
use crate::remote::CatalogSource;

/// Listings for all three domains from one fetch round.
#[derive(Debug, Clone)]
struct RemoteCatalog {
    mitigations: Vec<RemoteEntry>,
    risks: Vec<RemoteEntry>,
    frameworks: Vec<RemoteEntry>,
}

impl RemoteCatalog {
    fn entries(&self, domain: Domain) -> &[RemoteEntry] {
        match domain {
            Domain::Mitigations => &self.mitigations,
            Domain::Risks => &self.risks,
            Domain::Frameworks => &self.frameworks,
        }
    }

    /// Same filenames with the same hashes in every domain.
    fn matches(&self, snapshot: &CatalogSnapshot) -> bool {
        Domain::ALL.iter().all(|&domain| {
            let stored = snapshot.entries(domain);
            let fetched = self.entries(domain);
            let stored_hashes: HashMap<&str, &str> =
                stored.iter().map(|e| (e.filename.as_str(), e.content_hash.as_str())).collect();
            let fetched_hashes: HashMap<&str, &str> =
                fetched.iter().map(|e| (e.filename.as_str(), e.content_hash.as_str())).collect();
            stored_hashes.len() == stored.len()
                && fetched_hashes.len() == fetched.len()
                && stored_hashes == fetched_hashes
        })
    }

    fn into_snapshot(self, cache_expires: chrono::DateTime<Utc>) -> CatalogSnapshot {
        let convert = |domain: Domain, entries: Vec<RemoteEntry>| -> Vec<SnapshotEntry> {
            entries
                .into_iter()
                .filter_map(|e| SnapshotEntry::from_entry(&CatalogEntry::from_remote(domain, e)))
                .collect()
        };
        CatalogSnapshot {
            cache_expires,
            mitigations: convert(Domain::Mitigations, self.mitigations),
            risks: convert(Domain::Risks, self.risks),
            frameworks: convert(Domain::Frameworks, self.frameworks),
        }
    }
}

/// Reconciles the remote catalog against the persisted snapshot.
pub struct DiscoveryService {
    catalog: Arc<dyn CatalogSource>,
    store: DiscoveryCacheStore,
    ttl: chrono::Duration,
    raw_repo_url: String,
}

impl DiscoveryService {
    /// `ttl` is capped at one year.
    pub fn new(
        catalog: Arc<dyn CatalogSource>, store: DiscoveryCacheStore, ttl: chrono::Duration, raw_repo_url: String,
    ) -> Self {
        let ttl = ttl.min(chrono::Duration::days(365));
        Self { catalog, store, ttl, raw_repo_url }
    }

    pub fn from_config(config: &AppConfig, catalog: Arc<dyn CatalogSource>) -> Self {
        Self::new(
            catalog,
            DiscoveryCacheStore::new(config.cache_dir.clone(), &config.environment),
            config.discovery_ttl(),
            config.raw_repo_url(),
        )
    }

    pub fn store(&self) -> &DiscoveryCacheStore {
        &self.store
    }

    /// Run one discovery cycle. Never fails; remote trouble degrades to the
    /// embedded static lists.
    pub async fn discover_content(&self) -> DiscoveryResult {
        let stored = self.store.load().await;

        if let Some(snapshot) = &stored
            && snapshot.is_fresh(Utc::now())
        {
            tracing::debug!(expires = %snapshot.cache_expires, "serving fresh discovery snapshot");
            return DiscoveryResult::from_snapshot(DiscoverySource::Cache, snapshot);
        }

        let fetched = match self.fetch_all().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    had_snapshot = stored.is_some(),
                    fallback_version = fallback::FALLBACK_VERSION,
                    "remote catalog unavailable, using static fallback"
                );
                return fallback::static_result(&self.raw_repo_url);
            }
        };

        let cache_expires = Utc::now() + self.ttl;
        match stored {
            Some(mut snapshot) if fetched.matches(&snapshot) => {
                snapshot.cache_expires = cache_expires;
                self.persist(&snapshot).await;
                tracing::info!(expires = %cache_expires, "catalog hashes unchanged, snapshot extended");
                DiscoveryResult::from_snapshot(DiscoverySource::Cache, &snapshot)
            }
            previous => {
                let snapshot = fetched.into_snapshot(cache_expires);
                self.persist(&snapshot).await;
                tracing::info!(
                    replaced = previous.is_some(),
                    mitigations = snapshot.mitigations.len(),
                    risks = snapshot.risks.len(),
                    frameworks = snapshot.frameworks.len(),
                    "catalog discovered from remote"
                );
                DiscoveryResult::from_snapshot(DiscoverySource::Remote, &snapshot)
            }
        }
    }

    /// Fetch every domain; one failure or empty listing fails the round.
    async fn fetch_all(&self) -> Result<RemoteCatalog, Error> {
        let (mitigations, risks, frameworks) = tokio::join!(
            self.fetch_domain(Domain::Mitigations),
            self.fetch_domain(Domain::Risks),
            self.fetch_domain(Domain::Frameworks),
        );
        Ok(RemoteCatalog { mitigations: mitigations?, risks: risks?, frameworks: frameworks? })
    }

    async fn fetch_domain(&self, domain: Domain) -> Result<Vec<RemoteEntry>, Error> {
        let entries = self.catalog.list(domain).await?;
        if entries.is_empty() {
            return Err(Error::RemoteFetch(format!("empty listing for {domain}")));
        }
        tracing::debug!(%domain, count = entries.len(), "fetched remote listing");
        Ok(entries)
    }

    async fn persist(&self, snapshot: &CatalogSnapshot) {
        if let Err(e) = self.store.save(snapshot).await {
            tracing::warn!(error = %e, path = %self.store.path().display(), "failed to persist discovery snapshot");
        }
    }
}
