//! list_documents tool implementation.
//!
//! Lists catalog entries without downloading bodies.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use secframe_core::{ContentService, Domain, DocumentListing};
use serde::{Deserialize, Serialize};

use super::{json_result, parse_domain};

/// Parameters for the list_documents tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListDocumentsParams {
    /// Domain to list: "mitigations", "risks" or "frameworks".
    /// All domains are listed when omitted.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Output from the list_documents tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListDocumentsOutput {
    pub listings: Vec<DocumentListing>,
    pub total: usize,
}

/// Implementation of the list_documents tool.
pub async fn list_documents_impl(
    content: &ContentService, params: ListDocumentsParams,
) -> Result<CallToolResult, McpError> {
    let domains = match params.domain.as_deref() {
        Some(raw) => vec![parse_domain(raw)?],
        None => Domain::ALL.to_vec(),
    };

    let mut listings = Vec::with_capacity(domains.len());
    for domain in domains {
        listings.push(content.list_documents(domain).await);
    }
    let total = listings.iter().map(|l| l.documents.len()).sum();

    json_result(&ListDocumentsOutput { listings, total })
}
