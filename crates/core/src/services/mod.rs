//! Discovery and document lookup built on the cache and catalog layers.

pub mod content;
pub mod discovery;
pub mod document;

pub use content::{ContentService, DocumentListing, body_key};
pub use discovery::DiscoveryService;
pub use document::{Document, DocumentSummary, extract_title, humanize};
