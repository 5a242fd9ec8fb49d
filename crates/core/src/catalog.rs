//! Search orchestration: raw text to a cached, typed listing.
//!
//! ```text
//! text -> scan -> builder (or free-text fallback) -> FilterQuery
//!      -> archives cache lookup -> on miss: compile -> executor -> cache
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::Error;
use crate::cache::{CacheKey, CacheRegistry, CacheStats, ResultCache, canonical_key};
use crate::compile::compile;
use crate::config::AppConfig;
use crate::model::{ArchiveListing, ArchiveLookup, Taxonomy, TaxonomyListing};
use crate::normalize::Normalizer;
use crate::pagination::Pagination;
use crate::query::{FilterQuery, FilterQueryBuilder, resolve_free_text, scan};
use crate::store::{QueryExecutor, TaxonomyProvider};
use crate::taxonomy::TaxonomyIndex;

/// Cache of archive listings.
pub const ARCHIVES_CACHE: &str = "archives";
/// Cache of single-archive lookups.
pub const ARCHIVE_CACHE: &str = "archive";
/// Cache of taxonomy listings.
pub const TAXONOMIES_CACHE: &str = "taxonomies";

/// Addresses every cache instance at once in [`Catalog::purge`].
pub const ALL_CACHES: &str = "*";

/// Namespace of listing entries inside [`ARCHIVES_CACHE`].
pub const LISTING_NAMESPACE: &str = "archives";

/// One search-box request.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based; anything below 1 reads as 1.
    pub page: u32,
    pub sort: String,
    pub order: String,
    pub preloads: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub listing: ArchiveListing,
    pub cache_key: String,
    pub pagination: Pagination,
    pub query: FilterQuery,
}

/// Owns the cache instances and the collaborators for one process.
pub struct Catalog {
    page_size: u32,
    taxonomy_page_size: u32,
    normalizer: Arc<Normalizer>,
    executor: Arc<dyn QueryExecutor>,
    taxonomies: TaxonomyIndex,
    archives: Arc<ResultCache<ArchiveListing>>,
    archive: Arc<ResultCache<ArchiveLookup>>,
    registry: CacheRegistry,
}

impl Catalog {
    pub fn new(config: &AppConfig, executor: Arc<dyn QueryExecutor>, provider: Arc<dyn TaxonomyProvider>) -> Self {
        let caches = &config.caches;
        let archives = Arc::new(ResultCache::new(ARCHIVES_CACHE, caches.archives.capacity, caches.archives.ttl()));
        let archive = Arc::new(ResultCache::new(ARCHIVE_CACHE, caches.archive.capacity, caches.archive.ttl()));
        let listings =
            Arc::new(ResultCache::new(TAXONOMIES_CACHE, caches.taxonomies.capacity, caches.taxonomies.ttl()));

        let mut registry = CacheRegistry::new();
        registry.register(archives.clone());
        registry.register(archive.clone());
        registry.register(listings.clone());

        let normalizer = Arc::new(Normalizer::new());
        let taxonomies = TaxonomyIndex::new(provider, listings, normalizer.clone());

        Self {
            page_size: config.page_size,
            taxonomy_page_size: config.taxonomy_page_size,
            normalizer,
            executor,
            taxonomies,
            archives,
            archive,
            registry,
        }
    }

    pub fn taxonomy_page_size(&self) -> u32 {
        self.taxonomy_page_size
    }

    /// Collect the filters of `text` into a fresh builder.
    ///
    /// Free text is only consulted when the input carries no directive syntax,
    /// and then as typed: the path fallback keeps inner whitespace.
    pub async fn parse(&self, text: &str) -> FilterQueryBuilder {
        let scan = scan(text);
        let mut builder = FilterQueryBuilder::new();
        if scan.is_structured() {
            if !scan.remainder.is_empty() {
                tracing::debug!(ignored = %scan.remainder, "free text beside directives ignored");
            }
            builder.apply_all(&scan.directives);
        } else {
            let outcome = resolve_free_text(text, &self.taxonomies, &mut builder).await;
            tracing::debug!(?outcome, "free-text fallback");
        }
        builder
    }

    /// Run one search-box request.
    ///
    /// # Errors
    ///
    /// Fails only if the filter query cannot be serialized into a cache key.
    /// Persistence failures come back inside the listing.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, Error> {
        let page = request.page.max(1);
        let mut builder = self.parse(&request.query).await;
        builder
            .sort(request.sort.as_str())
            .order(request.order.as_str())
            .limit(i64::from(self.page_size))
            .offset(i64::from(self.page_size) * (i64::from(page) - 1))
            .preloads(request.preloads.iter().map(String::as_str));
        let query = builder.build(&self.normalizer);

        let (cache_key, listing) = self.list_archives(&query).await?;
        let pagination = Pagination::from_total(page, listing.total, self.page_size);
        Ok(SearchResponse { listing, cache_key, pagination, query })
    }

    /// Serve `query` from the listing cache, executing it on a miss.
    ///
    /// Empty and failed results are cached like any other.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `query` cannot be serialized into a key.
    pub async fn list_archives(&self, query: &FilterQuery) -> Result<(String, ArchiveListing), Error> {
        let local = query.cache_key()?;
        let key = CacheKey::new(LISTING_NAMESPACE, local.as_str());

        if let Some(hit) = self.archives.get(&key) {
            return Ok((local, hit));
        }

        tracing::trace!(key = %key, filtered = query.has_filters(), "archive listing miss");
        let compiled = compile(query);
        let listing = match self.executor.execute(&compiled).await {
            Ok(rows) => ArchiveListing { items: rows.rows, total: rows.total, error: None },
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "archive listing failed");
                ArchiveListing { error: Some(err), ..Default::default() }
            }
        };

        self.archives.set(key, listing.clone(), None);
        Ok((local, listing))
    }

    /// Look up one archive by id, cached under the id's namespace.
    pub async fn archive(&self, id: i64, preloads: &[String]) -> ArchiveLookup {
        let mut relations: Vec<Taxonomy> = preloads.iter().filter_map(|r| Taxonomy::from_relation(r)).collect();
        relations.sort();
        relations.dedup();

        let local = match canonical_key(&relations) {
            Ok(local) => local,
            Err(err) => return ArchiveLookup { archive: None, error: Some(err) },
        };
        let key = CacheKey::new(id.to_string(), local);

        if let Some(hit) = self.archive.get(&key) {
            return hit;
        }

        let lookup = match self.executor.find_archive(id, &relations).await {
            Ok(Some(archive)) => ArchiveLookup { archive: Some(archive), error: None },
            Ok(None) => ArchiveLookup { archive: None, error: Some(Error::ArchiveNotFound(id)) },
            Err(err) => {
                tracing::warn!(id, error = %err, "archive lookup failed");
                ArchiveLookup { archive: None, error: Some(err) }
            }
        };

        self.archive.set(key, lookup.clone(), None);
        lookup
    }

    /// One page of a taxonomy listing. `limit <= 0` lists everything.
    pub async fn taxonomies(&self, taxonomy: Taxonomy, limit: i64, offset: i64) -> TaxonomyListing {
        self.taxonomies.list(taxonomy, limit, offset).await
    }

    /// Administrative purge of one cache, or of all of them via [`ALL_CACHES`],
    /// whole or by namespace.
    ///
    /// Purging the taxonomy cache also drops memoized validity answers.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCache` if `cache` is not registered.
    pub fn purge(&self, cache: &str, namespace: Option<&str>) -> Result<usize, Error> {
        let purged = match cache {
            ALL_CACHES => self.registry.purge_everywhere(namespace),
            _ => self.registry.purge(cache, namespace)?,
        };
        if cache == TAXONOMIES_CACHE || cache == ALL_CACHES {
            let forgotten = self.taxonomies.forget();
            tracing::debug!(forgotten, "taxonomy validity reset");
        }
        Ok(purged)
    }

    pub fn cache_stats(&self) -> BTreeMap<String, CacheStats> {
        self.registry.stats()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("page_size", &self.page_size)
            .field("registry", &self.registry)
            .field("taxonomies", &self.taxonomies)
            .finish()
    }
}
