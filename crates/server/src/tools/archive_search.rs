//! archive_search tool implementation.
//!
//! Runs one search-box query through the catalog and returns the page of
//! archives, the total, the cache key and a pagination window.

use catalog_core::{Catalog, SearchRequest};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the archive_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArchiveSearchParams {
    /// Search text. Either free text or directives such as
    /// `artist:"John Doe",Jane -tag:ugly tag&:color,oneshot pages:>20 title*:gravity`.
    #[serde(default)]
    pub query: String,

    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<u32>,

    /// Sort field: id, created_at, updated_at, published_at, title or pages (default created_at).
    #[serde(default)]
    pub sort: Option<String>,

    /// Sort order: asc or desc (default desc).
    #[serde(default)]
    pub order: Option<String>,

    /// Relations to load with each archive: artists, circles, magazines, parodies, tags.
    #[serde(default)]
    pub preload: Vec<String>,
}

/// Implementation of the archive_search tool.
pub async fn search_impl(catalog: &Catalog, params: ArchiveSearchParams) -> Result<CallToolResult, McpError> {
    let request = SearchRequest {
        query: params.query,
        page: params.page.unwrap_or(1),
        sort: params.sort.unwrap_or_default(),
        order: params.order.unwrap_or_default(),
        preloads: params.preload,
    };
    let response = catalog.search(&request).await?;
    tracing::debug!(
        query = %request.query,
        total = response.listing.total,
        key = %response.cache_key,
        "archive search"
    );
    json_result(&response)
}
