//! catalog-mcp server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use catalog_core::{AppConfig, Catalog};
use catalog_store::SqliteStore;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
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
    let store = Arc::new(SqliteStore::open(&config.db_path).await?);
    let catalog = Catalog::new(&config, store.clone(), store);

    tracing::info!(db_path = %config.db_path.display(), "Starting catalog-mcp server on stdio transport");

    let handler = handler::CatalogServer::new(Arc::new(catalog));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
