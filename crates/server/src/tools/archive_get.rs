//! archive_get tool implementation.
//!
//! Retrieves one published archive by id.

use catalog_core::Catalog;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the archive_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArchiveGetParams {
    /// Archive id.
    pub id: i64,

    /// Relations to load: artists, circles, magazines, parodies, tags.
    #[serde(default)]
    pub preload: Vec<String>,
}

/// Implementation of the archive_get tool.
pub async fn get_impl(catalog: &Catalog, params: ArchiveGetParams) -> Result<CallToolResult, McpError> {
    let lookup = catalog.archive(params.id, &params.preload).await;
    match (lookup.archive, lookup.error) {
        (_, Some(err)) => Err(err.into()),
        (Some(archive), None) => json_result(&archive),
        (None, None) => Err(catalog_core::Error::ArchiveNotFound(params.id).into()),
    }
}
