//! Persisted catalog snapshot.
//!
//! One JSON file per environment. Reads never fail: a missing, unreadable or
//! malformed file is reported as "no usable cache". Writes go to a unique
//! temporary file in the same directory, are synced, and are renamed into place.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::{CatalogEntry, Domain};
use crate::Error;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A persisted catalog entry. Persisted entries always carry a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub filename: String,
    pub path: String,
    pub content_hash: String,
    pub download_url: String,
}

impl SnapshotEntry {
    /// Convert a catalog entry, returning `None` when it has no hash.
    pub fn from_entry(entry: &CatalogEntry) -> Option<Self> {
        Some(Self {
            filename: entry.filename.clone(),
            path: entry.path.clone(),
            content_hash: entry.content_hash.clone()?,
            download_url: entry.download_url.clone(),
        })
    }
}

/// On-disk catalog snapshot. `cache_expires` is serialized as RFC 3339 in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub cache_expires: DateTime<Utc>,
    pub mitigations: Vec<SnapshotEntry>,
    pub risks: Vec<SnapshotEntry>,
    pub frameworks: Vec<SnapshotEntry>,
}

impl CatalogSnapshot {
    pub fn entries(&self, domain: Domain) -> &[SnapshotEntry] {
        match domain {
            Domain::Mitigations => &self.mitigations,
            Domain::Risks => &self.risks,
            Domain::Frameworks => &self.frameworks,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.cache_expires > now
    }
}

/// Reader and atomic writer for the snapshot file.
#[derive(Debug, Clone)]
pub struct DiscoveryCacheStore {
    dir: PathBuf,
    path: PathBuf,
}

impl DiscoveryCacheStore {
    /// Store for `environment` under `dir`.
    pub fn new(dir: impl Into<PathBuf>, environment: &str) -> Self {
        let dir = dir.into();
        let path = dir.join(format!("discovery_cache_{environment}.json"));
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` if there is no usable one.
    pub async fn load(&self) -> Option<CatalogSnapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no discovery snapshot on disk");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discovery snapshot unreadable");
                return None;
            }
        };

        match serde_json::from_slice::<CatalogSnapshot>(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discovery snapshot malformed, ignoring");
                None
            }
        }
    }

    /// Write the snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the directory or file cannot be written.
    /// The previous snapshot, if any, is left untouched on failure.
    pub async fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(snapshot)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Persistence(format!("create {}: {e}", self.dir.display())))?;

        let tmp = self.tmp_path();
        if let Err(e) = write_synced(&tmp, &json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::Persistence(format!("write {}: {e}", tmp.display())));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::Persistence(format!("rename into {}: {e}", self.path.display())));
        }

        // The rename is durable only once the directory entry is on disk.
        if let Err(e) = sync_dir(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to sync snapshot directory");
        }

        tracing::debug!(path = %self.path.display(), expires = %snapshot.cache_expires, "discovery snapshot saved");
        Ok(())
    }

    /// Temporary path unique to this process and call.
    fn tmp_path(&self) -> PathBuf {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("discovery_cache.json");
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(name: &str, hash: &str) -> SnapshotEntry {
        SnapshotEntry {
            filename: name.into(),
            path: format!("docs/_risks/{name}"),
            content_hash: hash.into(),
            download_url: format!("https://raw.example.com/docs/_risks/{name}"),
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            cache_expires: Utc::now() + Duration::hours(1),
            mitigations: vec![entry("mi-1_a.md", "h1")],
            risks: vec![entry("ri-1_b.md", "h2")],
            frameworks: vec![entry("iso-42001.md", "h3")],
        }
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path().join("nested"), "test");
        let snap = snapshot();
        store.save(&snap).await.unwrap();
        assert_eq!(store.load().await, Some(snap));
        assert!(store.path().ends_with("discovery_cache_test.json"));
    }

    #[tokio::test]
    async fn test_load_corrupt_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        tokio::fs::write(store.path(), b"{\"cache_expires\": \"not a date\"").await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_field_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        let json = r#"{"cache_expires":"2030-01-01T00:00:00Z","mitigations":[],"risks":[]}"#;
        tokio::fs::write(store.path(), json).await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_timestamp_serialized_with_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        store.save(&snapshot()).await.unwrap();
        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let expires = value["cache_expires"].as_str().unwrap();
        assert!(expires.ends_with('Z') || expires.ends_with("+00:00"));
    }

    #[tokio::test]
    async fn test_save_into_new_directory_syncs_it() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("cache");
        let store = DiscoveryCacheStore::new(dir.clone(), "prod");
        let snap = snapshot();

        store.save(&snap).await.unwrap();
        sync_dir(&dir).await.unwrap();
        assert_eq!(store.load().await, Some(snap));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        store.save(&snapshot()).await.unwrap();
        store.save(&snapshot()).await.unwrap();

        let mut names = Vec::new();
        let mut read = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(item) = read.next_entry().await.unwrap() {
            names.push(item.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["discovery_cache_test.json".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiscoveryCacheStore::new(dir.path(), "test");
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.save(&snapshot()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert!(store.load().await.is_some());
    }

    #[test]
    fn test_from_entry_requires_hash() {
        let entry = CatalogEntry::from_fallback(Domain::Risks, "ri-9_data-poisoning.md", "https://raw.example.com");
        assert!(SnapshotEntry::from_entry(&entry).is_none());
    }

    #[test]
    fn test_freshness() {
        let snap = snapshot();
        assert!(snap.is_fresh(Utc::now()));
        assert!(!snap.is_fresh(Utc::now() + Duration::hours(2)));
    }
}
