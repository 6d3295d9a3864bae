//! Client code for mcp-secframe.
//!
//! This crate provides the HTTP adapter for the document repository: catalog
//! listings through the contents API and raw body downloads.

pub mod github;

pub use github::{ContentItem, GithubClient, GithubConfig, UrlError, contents_url, parse_listing, validate_url};
