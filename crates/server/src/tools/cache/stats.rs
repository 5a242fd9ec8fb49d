//! cache_stats tool implementation.

use std::collections::BTreeMap;

use catalog_core::{CacheStats, Catalog};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Stats of every cache instance, keyed by name.
    pub caches: BTreeMap<String, CacheStats>,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(catalog: &Catalog) -> Result<CallToolResult, McpError> {
    json_result(&CacheStatsOutput { caches: catalog.cache_stats() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, seeded_catalog};

    #[tokio::test]
    async fn test_stats_after_lookups() {
        let catalog = seeded_catalog().await;
        catalog.archive(1, &[]).await;
        catalog.archive(1, &[]).await;

        let value = output(&stats_impl(&catalog).await.unwrap());
        let archive = &value["caches"]["archive"];
        assert_eq!(archive["hits"], 1);
        assert_eq!(archive["misses"], 1);
        assert_eq!(archive["lookups"], 2);
        assert_eq!(archive["hit_rate"], 0.5);
        assert_eq!(value["caches"]["taxonomies"]["size"], 0);
    }
}
