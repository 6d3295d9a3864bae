//! Process-wide owner of the body cache.
//!
//! Readers take the shared side of an `RwLock` and leave as soon as an
//! instance exists. Construction happens under a separate mutex with a
//! re-check, so it runs once no matter how many callers arrive together.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::ttl::{CacheSettings, TtlCache};
use crate::Error;

static GLOBAL: CacheManager = CacheManager::empty();

/// Holder of a single shared [`TtlCache`].
#[derive(Debug)]
pub struct CacheManager {
    slot: RwLock<Option<Arc<TtlCache>>>,
    init: Mutex<()>,
    constructions: AtomicUsize,
}

#[cfg(any(test, feature = "test-util"))]
impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManager {
    const fn empty() -> Self {
        Self { slot: RwLock::new(None), init: Mutex::new(()), constructions: AtomicUsize::new(0) }
    }

    /// An isolated manager for tests. Everything else goes through [`CacheManager::global`].
    #[cfg(any(test, feature = "test-util"))]
    pub const fn new() -> Self {
        Self::empty()
    }

    /// The process-wide manager.
    pub fn global() -> &'static CacheManager {
        &GLOBAL
    }

    /// Return the shared cache, building it from `settings` on first use.
    ///
    /// Later calls ignore `settings` and return the existing instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the first construction rejects the settings.
    /// A failed construction leaves the manager empty.
    pub fn get_instance(&self, settings: &CacheSettings) -> Result<Arc<TtlCache>, Error> {
        if let Some(cache) = self.get() {
            return Ok(cache);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = self.get() {
            return Ok(cache);
        }

        self.constructions.fetch_add(1, Ordering::SeqCst);
        let cache = Arc::new(TtlCache::new(settings.clone())?);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(cache.clone());
        tracing::info!(max_entries = settings.max_entries, compression = settings.compression, "body cache initialized");
        Ok(cache)
    }

    /// The shared cache if it has been built.
    pub fn get(&self) -> Option<Arc<TtlCache>> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// How many times the construction path has run.
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// Drop the held instance and reset the construction counter.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&self) {
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.constructions.store(0, Ordering::SeqCst);
    }
}
