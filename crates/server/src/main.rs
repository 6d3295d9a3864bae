//! mcp-secframe server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use secframe_client::GithubClient;
use secframe_core::{AppConfig, CacheManager, ContentService, DiscoveryService};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    config.require_cache_secret()?;

    tracing::info!(
        environment = %config.environment,
        repo = %format!("{}/{}@{}", config.repo_owner, config.repo_name, config.repo_branch),
        "Starting mcp-secframe server on stdio transport"
    );

    let github = Arc::new(GithubClient::from_config(&config)?);
    let cache = CacheManager::global().get_instance(&config.cache_settings())?;
    let discovery = Arc::new(DiscoveryService::from_config(&config, github.clone()));
    let content = Arc::new(ContentService::new(discovery, github, cache));

    let handler = handler::McpSecframeServer::new(content);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
