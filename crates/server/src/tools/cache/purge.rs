//! cache_purge tool implementation.
//!
//! Purges a named result cache, whole or one namespace of it.

use catalog_core::{Catalog, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Cache name: archives, archive, taxonomies, or `*` for all of them.
    pub cache: String,

    /// Namespace to purge (e.g. `archives`, an archive id, `tags`).
    /// The whole cache is purged when omitted.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries removed.
    pub purged: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(catalog: &Catalog, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let namespace = params.namespace.as_deref().map(str::trim);
    if namespace == Some("") {
        return Err(Error::InvalidInput("namespace must not be empty".to_string()).into());
    }

    let purged = catalog.purge(params.cache.trim(), namespace)?;
    json_result(&CachePurgeOutput { purged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::archive_search::{ArchiveSearchParams, search_impl};
    use crate::tools::testing::{output, seeded_catalog};

    #[tokio::test]
    async fn test_purge_namespace() {
        let catalog = seeded_catalog().await;
        for query in ["tag:color", "tag:oneshot"] {
            search_impl(&catalog, ArchiveSearchParams { query: query.into(), ..Default::default() }).await.unwrap();
        }

        let params = CachePurgeParams { cache: "archives".into(), namespace: Some("archives".into()) };
        let value = output(&purge_impl(&catalog, params).await.unwrap());
        assert_eq!(value["purged"], 2);
        assert_eq!(catalog.cache_stats()["archives"].size, 0);
    }

    #[tokio::test]
    async fn test_purge_whole_cache() {
        let catalog = seeded_catalog().await;
        catalog.archive(1, &[]).await;
        catalog.archive(2, &[]).await;

        let params = CachePurgeParams { cache: "archive".into(), namespace: None };
        let value = output(&purge_impl(&catalog, params).await.unwrap());
        assert_eq!(value["purged"], 2);
    }

    #[tokio::test]
    async fn test_purge_every_cache() {
        let catalog = seeded_catalog().await;
        search_impl(&catalog, ArchiveSearchParams { query: "tag:color".into(), ..Default::default() }).await.unwrap();
        catalog.archive(1, &[]).await;

        let params = CachePurgeParams { cache: "*".into(), namespace: None };
        let value = output(&purge_impl(&catalog, params).await.unwrap());
        assert_eq!(value["purged"], 2);
        assert!(catalog.cache_stats().values().all(|stats| stats.size == 0));
    }

    #[tokio::test]
    async fn test_purge_unknown_cache() {
        let catalog = seeded_catalog().await;
        let params = CachePurgeParams { cache: "thumbnails".into(), namespace: None };

        let err = purge_impl(&catalog, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[tokio::test]
    async fn test_purge_empty_namespace() {
        let catalog = seeded_catalog().await;
        let params = CachePurgeParams { cache: "archives".into(), namespace: Some("  ".into()) };
        assert!(purge_impl(&catalog, params).await.is_err());
    }
}
