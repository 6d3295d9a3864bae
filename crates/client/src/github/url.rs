//! URL construction and checks for repository requests.

use secframe_core::Domain;

/// Error type for URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a URL and require an http(s) scheme. Fragments are dropped.
pub fn validate_url(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
    parsed.set_fragment(None);
    Ok(parsed)
}

/// Contents API URL listing one domain directory at `branch`.
pub fn contents_url(
    api_base_url: &str, owner: &str, repo: &str, branch: &str, domain: Domain,
) -> Result<url::Url, UrlError> {
    let base = format!(
        "{}/repos/{owner}/{repo}/contents/{}",
        api_base_url.trim_end_matches('/'),
        domain.directory()
    );
    let mut url = validate_url(&base)?;
    url.query_pairs_mut().append_pair("ref", branch);
    Ok(url)
}
