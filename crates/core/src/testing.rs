//! In-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::Error;
use crate::catalog::{Domain, RemoteEntry};
use crate::remote::{BodySource, CatalogSource};

pub fn remote_entry(domain: Domain, filename: &str, hash: &str) -> RemoteEntry {
    let path = format!("{}/{}", domain.directory(), filename);
    RemoteEntry {
        filename: filename.into(),
        download_url: format!("https://raw.example.com/o/r/main/{path}"),
        path,
        content_hash: hash.into(),
    }
}

/// Catalog listing with switchable failures and a call counter.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    listings: Mutex<HashMap<Domain, Vec<RemoteEntry>>>,
    fail_all: AtomicBool,
    fail_domain: Mutex<Option<Domain>>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    /// Two documents per domain.
    pub fn populated() -> Self {
        let catalog = Self::default();
        catalog.set(
            Domain::Mitigations,
            vec![
                remote_entry(Domain::Mitigations, "mi-1_ai-data-leakage-prevention-and-detection.md", "m1"),
                remote_entry(Domain::Mitigations, "mi-3_user-app-model-firewalling-filtering.md", "m3"),
            ],
        );
        catalog.set(
            Domain::Risks,
            vec![
                remote_entry(Domain::Risks, "ri-9_data-poisoning.md", "r9"),
                remote_entry(Domain::Risks, "ri-10_prompt-injection.md", "r10"),
            ],
        );
        catalog.set(
            Domain::Frameworks,
            vec![
                remote_entry(Domain::Frameworks, "iso-42001.md", "f1"),
                remote_entry(Domain::Frameworks, "owasp-llm.md", "f2"),
            ],
        );
        catalog
    }

    pub fn set(&self, domain: Domain, entries: Vec<RemoteEntry>) {
        self.listings.lock().unwrap().insert(domain, entries);
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_domain(&self, domain: Option<Domain>) {
        *self.fail_domain.lock().unwrap() = domain;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn list(&self, domain: Domain) -> Result<Vec<RemoteEntry>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Error::RemoteFetch("network unreachable".into()));
        }
        if *self.fail_domain.lock().unwrap() == Some(domain) {
            return Err(Error::FetchTimeout(format!("listing {domain}")));
        }
        Ok(self.listings.lock().unwrap().get(&domain).cloned().unwrap_or_default())
    }
}

/// Body downloads served from a map keyed by download URL.
#[derive(Debug, Default)]
pub struct FakeBodies {
    bodies: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeBodies {
    pub fn insert(&self, download_url: &str, body: &str) {
        self.bodies.lock().unwrap().insert(download_url.into(), body.into());
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BodySource for FakeBodies {
    async fn fetch(&self, download_url: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::HttpError("status 503".into()));
        }
        self.bodies
            .lock()
            .unwrap()
            .get(download_url)
            .cloned()
            .ok_or_else(|| Error::HttpError("status 404".into()))
    }
}
