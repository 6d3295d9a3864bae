//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-secframe server.

pub mod cache_status;
pub mod get_document;
pub mod list_documents;

pub use cache_status::{CacheStatusOutput, cache_status_impl};
pub use get_document::{GetDocumentParams, get_document_impl};
pub use list_documents::{ListDocumentsOutput, ListDocumentsParams, list_documents_impl};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use secframe_core::{Domain, Error};
use serde::Serialize;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

pub(crate) fn parse_domain(raw: &str) -> Result<Domain, McpError> {
    raw.parse::<Domain>().map_err(McpError::from)
}
