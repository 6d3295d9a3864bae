//! cache_status tool implementation.
//!
//! Reports body cache statistics and the state of the discovered catalog.

use chrono::{DateTime, Utc};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use secframe_core::catalog::fallback::FALLBACK_VERSION;
use secframe_core::{CacheStats, ContentService, DiscoverySource};
use serde::{Deserialize, Serialize};

use super::json_result;

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    pub cache: CacheStats,
    pub discovery_source: DiscoverySource,
    pub discovery_expires: DateTime<Utc>,
    pub documents: usize,
    /// Version of the embedded lists served when the remote catalog is down.
    pub fallback_version: String,
}

/// Implementation of the cache_status tool.
pub async fn cache_status_impl(content: &ContentService) -> Result<CallToolResult, McpError> {
    let catalog = content.discovery().discover_content().await;
    let output = CacheStatusOutput {
        cache: content.cache().get_stats(),
        discovery_source: catalog.source,
        discovery_expires: catalog.cache_expires,
        documents: catalog.mitigations.len() + catalog.risks.len() + catalog.frameworks.len(),
        fallback_version: FALLBACK_VERSION.to_string(),
    };

    json_result(&output)
}
