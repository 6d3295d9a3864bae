//! get_document tool implementation.
//!
//! Resolves a document id and returns its body, served from the cache when
//! possible.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use secframe_core::{ContentService, Error};
use serde::{Deserialize, Serialize};

use super::{json_result, parse_domain};

/// Parameters for the get_document tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDocumentParams {
    /// Domain holding the document: "mitigations", "risks" or "frameworks".
    pub domain: String,

    /// Document id, filename, or prefixed name (e.g. "ri-10_prompt-injection").
    /// Matching ignores case, the ".md" suffix and the domain prefix.
    pub id: String,
}

/// Implementation of the get_document tool.
pub async fn get_document_impl(content: &ContentService, params: GetDocumentParams) -> Result<CallToolResult, McpError> {
    let domain = parse_domain(&params.domain)?;
    let document = content
        .get_document(domain, &params.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{domain}/{}", params.id.trim())))?;

    json_result(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixture;

    fn params(domain: &str, id: &str) -> GetDocumentParams {
        GetDocumentParams { domain: domain.into(), id: id.into() }
    }

    #[tokio::test]
    async fn test_get_document_found() {
        let fx = fixture::build();
        fx.bodies.insert(
            &format!("{}/docs/_mitigations/mi-3_user-app-model-firewalling-filtering.md", fixture::RAW),
            "# User/App/Model Firewalling/Filtering\n\nInspect traffic.",
        );

        let result = get_document_impl(&fx.content, params("mitigations", "MI-3_user-app-model-firewalling-filtering"))
            .await
            .unwrap();
        let value = fixture::text(&result);
        assert_eq!(value["id"], "3_user-app-model-firewalling-filtering");
        assert_eq!(value["title"], "User/App/Model Firewalling/Filtering");
        assert!(value["content"].as_str().unwrap().contains("Inspect traffic."));
    }

    #[tokio::test]
    async fn test_get_document_not_found() {
        let fx = fixture::build();
        let err = get_document_impl(&fx.content, params("risks", "ri-404_missing")).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert_eq!(fx.bodies.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_document_body_failure() {
        let fx = fixture::build();
        fx.bodies.fail(true);
        let err = get_document_impl(&fx.content, params("frameworks", "owasp-llm")).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
    }

    #[tokio::test]
    async fn test_get_document_bad_domain() {
        let fx = fixture::build();
        let err = get_document_impl(&fx.content, params("nope", "x")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
