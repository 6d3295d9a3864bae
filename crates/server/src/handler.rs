//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    GetDocumentParams, ListDocumentsParams, cache_status_impl, get_document_impl, list_documents_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use secframe_core::ContentService;

/// The main MCP server handler for mcp-secframe.
#[derive(Clone)]
pub struct McpSecframeServer {
    tool_router: ToolRouter<Self>,
    content: Arc<ContentService>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpSecframeServer {
    /// Create a new server handler over the given content service.
    pub fn new(content: Arc<ContentService>) -> Self {
        Self { tool_router: Self::tool_router(), content }
    }

    #[tool(
        description = "List governance documents (mitigations, risks, frameworks). Returns ids, titles and where the catalog came from."
    )]
    async fn list_documents(&self, params: Parameters<ListDocumentsParams>) -> Result<CallToolResult, McpError> {
        list_documents_impl(&self.content, params.0).await
    }

    /// Fetch one document body by domain and id.
    #[tool(
        description = "Get a governance document by domain and id. Ids match case-insensitively with or without the .md suffix and the mi-/ri- prefix."
    )]
    async fn get_document(&self, params: Parameters<GetDocumentParams>) -> Result<CallToolResult, McpError> {
        get_document_impl(&self.content, params.0).await
    }

    #[tool(description = "Report document cache statistics and catalog freshness.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        cache_status_impl(&self.content).await
    }
}

impl ServerHandler for McpSecframeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-secframe".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
