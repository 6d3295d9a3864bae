//! In-memory cache for document bodies.
//!
//! - Secret-scoped keys via SHA-256
//! - Size ceiling and lz4 compression with a ratio guard
//! - Soonest-to-expire eviction at capacity
//! - One process-wide instance owned by [`CacheManager`]

pub mod compression;
pub mod hash;
pub mod manager;
pub mod ttl;

pub use compression::MAX_COMPRESSION_RATIO;
pub use manager::CacheManager;
pub use ttl::{CacheEntry, CacheSettings, CacheStats, MAX_OBJECT_SIZE, TtlCache};
