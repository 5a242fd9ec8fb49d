//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use catalog_core::Catalog;
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

use crate::tools::archive_get::{ArchiveGetParams, get_impl};
use crate::tools::archive_search::{ArchiveSearchParams, search_impl};
use crate::tools::cache::{CachePurgeParams, purge_impl, stats_impl};
use crate::tools::taxonomy_list::{TaxonomyListParams, list_impl};

/// The main MCP server handler for the catalog.
#[derive(Clone)]
pub struct CatalogServer {
    catalog: Arc<Catalog>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CatalogServer {
    /// Create a new server handler around a shared catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, tool_router: Self::tool_router() }
    }

    /// Search archives with the search-box syntax.
    #[tool(
        description = "Search archives. Accepts directives like `artist:name`, `-tag:x`, `tag&:a,b`, `title*:zero`, `pages:>100`; plain text is matched against artists, circles, parodies, tags and finally the archive path."
    )]
    async fn archive_search(&self, params: Parameters<ArchiveSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.catalog, params.0).await
    }

    /// Fetch one archive by id.
    #[tool(description = "Get one published archive by id, optionally preloading artists, circles, magazines, parodies or tags.")]
    async fn archive_get(&self, params: Parameters<ArchiveGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.catalog, params.0).await
    }

    /// List one taxonomy with archive counts.
    #[tool(description = "List artists, circles, magazines, parodies or tags, one page at a time, with archive counts.")]
    async fn taxonomy_list(&self, params: Parameters<TaxonomyListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.catalog, params.0).await
    }

    /// Purge cached results after the catalog changed.
    #[tool(
        description = "Purge a result cache (archives, archive, taxonomies, or `*` for all), whole or one namespace. Call after the catalog changes."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.catalog, params.0).await
    }

    /// Report cache statistics.
    #[tool(description = "Report size, hits, misses and hit rate of every result cache.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.catalog).await
    }
}

impl ServerHandler for CatalogServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "catalog-mcp".into(),
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
