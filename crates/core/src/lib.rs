//! Core types and shared functionality for mcp-secframe.
//!
//! This crate provides:
//! - An in-memory TTL cache with a process-wide manager
//! - Catalog discovery persisted to a JSON snapshot with a static fallback
//! - Document lookup over the discovered catalog
//! - Unified error types and configuration

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod remote;
pub mod services;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use cache::{CacheManager, CacheSettings, CacheStats, TtlCache};
pub use catalog::{CatalogEntry, DiscoveryResult, DiscoverySource, Domain};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use remote::{BodySource, CatalogSource};
pub use services::{ContentService, DiscoveryService, Document, DocumentListing, DocumentSummary};
