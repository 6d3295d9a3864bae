//! Contents API listing payloads.

use secframe_core::Error;
use secframe_core::catalog::RemoteEntry;
use serde::Deserialize;

/// One item of a contents API directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentItem {
    fn is_document(&self) -> bool {
        self.kind == "file" && self.name.to_ascii_lowercase().ends_with(".md") && self.download_url.is_some()
    }
}

/// Parse a directory listing into catalog entries.
///
/// Directories, non-markdown files and items without a download URL are
/// skipped.
pub fn parse_listing(body: &[u8]) -> Result<Vec<RemoteEntry>, Error> {
    let items: Vec<ContentItem> =
        serde_json::from_slice(body).map_err(|e| Error::RemoteFetch(format!("malformed listing: {e}")))?;

    Ok(items
        .into_iter()
        .filter(ContentItem::is_document)
        .filter_map(|item| {
            let download_url = item.download_url?;
            Some(RemoteEntry { filename: item.name, path: item.path, content_hash: item.sha, download_url })
        })
        .collect())
}
