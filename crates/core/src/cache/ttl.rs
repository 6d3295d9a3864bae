//! Capacity-bounded TTL cache for serialized values.
//!
//! Values are serialized with serde_json, checked against [`MAX_OBJECT_SIZE`],
//! optionally lz4-compressed behind a ratio guard, and stored under a key
//! scoped by the deployment secret. All bookkeeping lives behind one mutex.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::compression;
use super::hash::scoped_key;
use crate::Error;
use crate::config::ConfigError;

/// Hard ceiling on the serialized size of a single value.
pub const MAX_OBJECT_SIZE: usize = 10_000_000;

/// Construction parameters for [`TtlCache`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Deployment secret, at least 32 characters.
    pub secret: String,
    /// Maximum number of live entries.
    pub max_entries: usize,
    /// TTL applied when `set` is called without one.
    pub default_ttl: Duration,
    /// Whether values are compressed before storage.
    pub compression: bool,
}

/// A stored value and its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Caller-supplied key (the map is keyed by its scoped form).
    pub key: String,
    value: Vec<u8>,
    /// Whether `value` holds lz4 output.
    pub compressed: bool,
    /// Serialized size before compression.
    pub original_size: usize,
    /// Stored size.
    pub compressed_size: usize,
    pub created_at: Instant,
    pub expires_at: Instant,
    last_access: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn footprint(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// Point-in-time view of cache occupancy and counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    /// Live entries after expired ones were purged.
    pub current_size: usize,
    pub max_size: usize,
    /// Bytes held by stored keys and values.
    pub memory_usage_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed to make room at capacity.
    pub evictions: u64,
    /// Entries removed because their TTL elapsed.
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    memory: usize,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl State {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn insert(&mut self, scoped: String, mut entry: CacheEntry) {
        entry.last_access = self.next_tick();
        self.memory += entry.footprint();
        if let Some(old) = self.entries.insert(scoped, entry) {
            self.memory -= old.footprint();
        }
    }

    fn remove(&mut self, scoped: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(scoped)?;
        self.memory -= entry.footprint();
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        self.expirations += expired.len() as u64;
        expired.len()
    }

    /// Remove the entry closest to expiry, least recently used first on ties.
    fn evict_one(&mut self) -> Option<CacheEntry> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.expires_at, e.last_access))
            .map(|(k, _)| k.clone())?;
        let entry = self.remove(&victim)?;
        self.evictions += 1;
        Some(entry)
    }
}

/// Thread-safe TTL cache.
///
/// Built only through [`super::CacheManager`] outside this crate.
#[derive(Debug)]
pub struct TtlCache {
    secret: String,
    max_entries: usize,
    default_ttl: Duration,
    compression: bool,
    state: Mutex<State>,
}

impl TtlCache {
    /// Build a cache, validating the secret and capacity.
    pub(crate) fn new(settings: CacheSettings) -> Result<Self, Error> {
        if settings.secret.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_secret".into(),
                hint: "Set SECFRAME_CACHE_SECRET environment variable".into(),
            }
            .into());
        }
        crate::config::check_secret(&settings.secret)?;
        if settings.max_entries == 0 {
            return Err(ConfigError::Invalid { field: "cache_max_entries".into(), reason: "must be greater than 0".into() }
                .into());
        }

        Ok(Self {
            secret: settings.secret,
            max_entries: settings.max_entries,
            default_ttl: settings.default_ttl,
            compression: settings.compression,
            state: Mutex::new(State::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` under `key` for `ttl` (or the default TTL).
    ///
    /// # Errors
    ///
    /// - [`Error::ObjectTooLarge`] if the serialized value exceeds [`MAX_OBJECT_SIZE`]
    /// - [`Error::CompressionRatio`] if compression expands by more than the allowed ratio
    /// - [`Error::Serialization`] if the value cannot be serialized
    /// - [`Error::InvalidInput`] if the expiry overflows the clock
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), Error> {
        let serialized = serde_json::to_vec(value)?;
        let original_size = serialized.len();
        if original_size > MAX_OBJECT_SIZE {
            tracing::warn!(key, size = original_size, "cache value rejected: too large");
            return Err(Error::ObjectTooLarge { size: original_size, max: MAX_OBJECT_SIZE });
        }

        let (stored, compressed) =
            if self.compression { (compression::compress(&serialized)?, true) } else { (serialized, false) };

        let now = Instant::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| Error::InvalidInput(format!("ttl of {}s is out of range", ttl.as_secs())))?;
        let entry = CacheEntry {
            key: key.to_string(),
            compressed_size: stored.len(),
            value: stored,
            compressed,
            original_size,
            created_at: now,
            expires_at,
            last_access: 0,
        };

        let scoped = scoped_key(&self.secret, key);
        let mut state = self.lock();
        if !state.entries.contains_key(&scoped) && state.entries.len() >= self.max_entries {
            state.purge_expired(now);
            while state.entries.len() >= self.max_entries {
                match state.evict_one() {
                    Some(evicted) => tracing::debug!(key = %evicted.key, "evicted cache entry"),
                    None => break,
                }
            }
        }
        state.insert(scoped, entry);
        tracing::debug!(key, size = original_size, compressed, "cache set");
        Ok(())
    }

    /// Fetch and deserialize the value under `key`.
    ///
    /// Returns `Ok(None)` on a miss. Expired entries are removed on lookup.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let scoped = scoped_key(&self.secret, key);
        let now = Instant::now();
        let (bytes, compressed, original_size) = {
            let mut state = self.lock();
            let live = match state.entries.get(&scoped) {
                None => None,
                Some(entry) => Some(!entry.is_expired(now)),
            };
            match live {
                None => {
                    state.misses += 1;
                    return Ok(None);
                }
                Some(false) => {
                    state.remove(&scoped);
                    state.expirations += 1;
                    state.misses += 1;
                    tracing::debug!(key, "cache entry expired");
                    return Ok(None);
                }
                Some(true) => {}
            }
            state.hits += 1;
            let tick = state.next_tick();
            let Some(entry) = state.entries.get_mut(&scoped) else {
                return Ok(None);
            };
            entry.last_access = tick;
            (entry.value.clone(), entry.compressed, entry.original_size)
        };

        let bytes = if compressed { compression::decompress(&bytes)? } else { bytes };
        if bytes.len() != original_size {
            return Err(Error::Decompression(format!("expected {original_size} bytes, got {}", bytes.len())));
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Whether a live entry exists for `key`. Does not touch hit/miss counters.
    pub fn contains(&self, key: &str) -> bool {
        let scoped = scoped_key(&self.secret, key);
        let now = Instant::now();
        self.lock().entries.get(&scoped).is_some_and(|e| !e.is_expired(now))
    }

    /// Remove the entry under `key`, returning whether it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        let scoped = scoped_key(&self.secret, key);
        self.lock().remove(&scoped).is_some()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.memory = 0;
    }

    /// Purge expired entries, then report occupancy and counters.
    pub fn get_stats(&self) -> CacheStats {
        let mut state = self.lock();
        state.purge_expired(Instant::now());
        CacheStats {
            current_size: state.entries.len(),
            max_size: self.max_entries,
            memory_usage_bytes: state.memory,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            expirations: state.expirations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings(max_entries: usize, compression: bool) -> CacheSettings {
        CacheSettings { secret: SECRET.into(), max_entries, default_ttl: Duration::from_secs(60), compression }
    }

    fn cache(max_entries: usize) -> TtlCache {
        TtlCache::new(settings(max_entries, true)).unwrap()
    }

    /// Deterministic, poorly compressible ASCII.
    fn noise(len: usize) -> String {
        let mut x: u64 = 0x9e37_79b9_7f4a_7c15;
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                (b'!' + (x % 90) as u8) as char
            })
            .filter(|c| *c != '"' && *c != '\\')
            .collect()
    }

    #[test]
    fn test_constants() {
        assert_eq!(MAX_OBJECT_SIZE, 10_000_000);
        assert_eq!(compression::MAX_COMPRESSION_RATIO, 100);
    }

    #[test]
    fn test_set_rejects_overflowing_ttl() {
        let cache = cache(4);
        let result = cache.set("k", "v", Some(Duration::from_secs(u64::MAX)));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!cache.contains("k"));
        assert_eq!(cache.get_stats().current_size, 0);

        let cache = TtlCache::new(CacheSettings { default_ttl: Duration::MAX, ..settings(4, true) }).unwrap();
        assert!(matches!(cache.set("k", "v", None), Err(Error::InvalidInput(_))));
        cache.set("k", "v", Some(Duration::from_secs(60))).unwrap();
        assert!(cache.contains("k"));
    }

    #[test]
    fn test_new_rejects_short_secret() {
        let result = TtlCache::new(CacheSettings { secret: "too-short".into(), ..settings(4, true) });
        assert!(matches!(result, Err(Error::Config(ConfigError::Invalid { .. }))));
    }

    #[test]
    fn test_new_rejects_missing_secret() {
        let result = TtlCache::new(CacheSettings { secret: String::new(), ..settings(4, true) });
        assert!(matches!(result, Err(Error::Config(ConfigError::Missing { .. }))));
    }

    #[test]
    fn test_set_and_get() {
        let cache = cache(4);
        let body = "# RI-10 Prompt Injection\n\nUntrusted input steers the model.".to_string();
        cache.set("risks:ri-10.md", &body, None).unwrap();
        let got: Option<String> = cache.get("risks:ri-10.md").unwrap();
        assert_eq!(got, Some(body));
    }

    #[test]
    fn test_set_and_get_uncompressed_struct() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Doc {
            id: String,
            lines: Vec<u32>,
        }

        let cache = TtlCache::new(settings(4, false)).unwrap();
        let doc = Doc { id: "iso-42001".into(), lines: vec![1, 2, 3] };
        cache.set("frameworks:iso-42001.md", &doc, None).unwrap();
        assert_eq!(cache.get::<Doc>("frameworks:iso-42001.md").unwrap(), Some(doc));
    }

    #[test]
    fn test_get_missing() {
        let cache = cache(4);
        assert_eq!(cache.get::<String>("nope").unwrap(), None);
        assert_eq!(cache.get_stats().misses, 1);
    }

    #[test]
    fn test_size_boundary() {
        let cache = TtlCache::new(settings(4, false)).unwrap();
        // serde_json adds two quote characters around a string
        let exact = "a".repeat(MAX_OBJECT_SIZE - 2);
        cache.set("exact", &exact, None).unwrap();

        let over = "a".repeat(MAX_OBJECT_SIZE - 1);
        let result = cache.set("over", &over, None);
        assert!(matches!(result, Err(Error::ObjectTooLarge { size, max }) if size == MAX_OBJECT_SIZE + 1 && max == MAX_OBJECT_SIZE));
        assert!(!cache.contains("over"));
    }

    #[test]
    fn test_size_checked_before_compression() {
        let cache = cache(4);
        // would also trip the ratio guard; size must be reported first
        let huge = "a".repeat(MAX_OBJECT_SIZE);
        assert!(matches!(cache.set("huge", &huge, None), Err(Error::ObjectTooLarge { .. })));
    }

    #[test]
    fn test_compressed_large_value() {
        let cache = cache(4);
        let value = noise(200_000);
        cache.set("noise", &value, None).unwrap();
        assert_eq!(cache.get::<String>("noise").unwrap(), Some(value));
    }

    #[test]
    fn test_compression_bomb() {
        let cache = cache(4);
        let bomb = "A".repeat(500 * 1024);
        match cache.set("bomb", &bomb, None) {
            Ok(()) => assert_eq!(cache.get::<String>("bomb").unwrap(), Some(bomb)),
            Err(e) => {
                assert!(matches!(e, Error::CompressionRatio { .. }));
                assert!(!cache.contains("bomb"));
            }
        }
    }

    #[test]
    fn test_expiry_is_lazy_on_get() {
        let cache = cache(4);
        cache.set("short", "value", Some(Duration::from_millis(20))).unwrap();
        assert!(cache.contains("short"));
        sleep(Duration::from_millis(50));
        assert_eq!(cache.get::<String>("short").unwrap(), None);
        let stats = cache.get_stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.current_size, 0);
    }

    #[test]
    fn test_stats_purge_then_report() {
        let cache = cache(4);
        cache.set("short", "value", Some(Duration::from_millis(20))).unwrap();
        cache.set("long", "value", None).unwrap();
        sleep(Duration::from_millis(50));
        let stats = cache.get_stats();
        assert_eq!(stats.current_size, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_stats_accuracy() {
        let cache = cache(16);
        for i in 0..10 {
            cache.set(&format!("mitigations:mi-{i}.md"), &format!("body {i}"), None).unwrap();
        }
        let stats = cache.get_stats();
        assert_eq!(stats.current_size, 10);
        assert_eq!(stats.max_size, 16);
        assert!(stats.memory_usage_bytes > 0);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_replace_same_key_keeps_size() {
        let cache = cache(2);
        cache.set("a", "one", None).unwrap();
        cache.set("b", "two", None).unwrap();
        cache.set("a", "three", None).unwrap();
        let stats = cache.get_stats();
        assert_eq!(stats.current_size, 2);
        assert_eq!(stats.evictions, 0);
        assert_eq!(cache.get::<String>("a").unwrap().as_deref(), Some("three"));
    }

    #[test]
    fn test_evicts_soonest_to_expire() {
        let cache = cache(2);
        cache.set("long", "1", Some(Duration::from_secs(600))).unwrap();
        cache.set("soon", "2", Some(Duration::from_secs(10))).unwrap();
        cache.set("new", "3", Some(Duration::from_secs(300))).unwrap();

        assert!(cache.contains("long"));
        assert!(!cache.contains("soon"));
        assert!(cache.contains("new"));
        assert_eq!(cache.get_stats().evictions, 1);
    }

    #[test]
    fn test_expired_entries_freed_before_eviction() {
        let cache = cache(2);
        cache.set("dead", "1", Some(Duration::from_millis(10))).unwrap();
        cache.set("live", "2", None).unwrap();
        sleep(Duration::from_millis(30));
        cache.set("new", "3", None).unwrap();

        let stats = cache.get_stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert!(cache.contains("live"));
    }

    #[test]
    fn test_eviction_tie_breaks_on_lru() {
        let now = Instant::now();
        let expires_at = now + Duration::from_secs(60);
        let mut state = State::default();
        for key in ["a", "b"] {
            state.insert(
                key.to_string(),
                CacheEntry {
                    key: key.to_string(),
                    value: vec![0],
                    compressed: false,
                    original_size: 1,
                    compressed_size: 1,
                    created_at: now,
                    expires_at,
                    last_access: 0,
                },
            );
        }
        let tick = state.next_tick();
        if let Some(a) = state.entries.get_mut("a") {
            a.last_access = tick;
        }

        let evicted = state.evict_one().unwrap();
        assert_eq!(evicted.key, "b");
        assert_eq!(state.memory, "a".len() + 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = cache(4);
        cache.set("a", "1", None).unwrap();
        cache.set("b", "2", None).unwrap();
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        cache.clear();
        let stats = cache.get_stats();
        assert_eq!(stats.current_size, 0);
        assert_eq!(stats.memory_usage_bytes, 0);
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let cache = cache(4);
        cache.set("n", &42u32, None).unwrap();
        assert!(matches!(cache.get::<Vec<String>>("n"), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_concurrent_sets() {
        let cache = std::sync::Arc::new(cache(1_000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.set(&format!("{t}:{i}"), &i, None).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.get_stats().current_size, 400);
    }
}
