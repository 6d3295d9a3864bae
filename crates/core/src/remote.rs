//! Seams to the remote document repository.
//!
//! Implementations live outside this crate; tests use in-memory fakes.

use async_trait::async_trait;

use crate::Error;
use crate::catalog::{Domain, RemoteEntry};

/// Lists the current documents of one domain (names and hashes, no bodies).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list(&self, domain: Domain) -> Result<Vec<RemoteEntry>, Error>;
}

/// Downloads one document body.
#[async_trait]
pub trait BodySource: Send + Sync {
    async fn fetch(&self, download_url: &str) -> Result<String, Error>;
}
