//! taxonomy_list tool implementation.
//!
//! Lists one page of artists, circles, magazines, parodies or tags with the
//! number of published archives carrying each.

use catalog_core::{Catalog, Error, Pagination, Taxonomy, TaxonomyListing};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the taxonomy_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaxonomyListParams {
    /// artist, circle, magazine, parody or tag (plural names are accepted).
    pub taxonomy: String,

    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyListOutput {
    pub taxonomy: Taxonomy,
    #[serde(flatten)]
    pub listing: TaxonomyListing,
    pub pagination: Pagination,
}

/// Implementation of the taxonomy_list tool.
pub async fn list_impl(catalog: &Catalog, params: TaxonomyListParams) -> Result<CallToolResult, McpError> {
    let name = params.taxonomy.trim();
    let taxonomy = Taxonomy::parse(name)
        .or_else(|| Taxonomy::from_relation(name))
        .ok_or_else(|| Error::InvalidInput(format!("unknown taxonomy: {name}")))?;

    let page = params.page.unwrap_or(1).max(1);
    let size = i64::from(catalog.taxonomy_page_size());
    let listing = catalog.taxonomies(taxonomy, size, size * (i64::from(page) - 1)).await;
    if let Some(err) = listing.error.clone() {
        return Err(err.into());
    }

    let pagination = Pagination::from_total(page, listing.total, catalog.taxonomy_page_size());
    json_result(&TaxonomyListOutput { taxonomy, listing, pagination })
}
