//! Search and filter core of the archive catalog.
//!
//! This crate provides:
//! - The search-box query language (directive scanner, free-text fallback)
//! - Canonical filter queries and their SQL predicate compilation
//! - Bounded, expiring, namespaced result caches
//! - The collaborator traits a persistence layer implements
//! - Unified error types and configuration

pub mod cache;
pub mod catalog;
pub mod compile;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod store;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheKey, CacheRegistry, CacheStats, ResultCache};
pub use catalog::{Catalog, SearchRequest, SearchResponse};
pub use compile::{CompiledQuery, Fragment, SqlValue, compile};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use model::{Archive, ArchiveListing, ArchiveLookup, Taxonomy, TaxonomyEntry, TaxonomyListing};
pub use normalize::{Normalizer, slugify};
pub use pagination::Pagination;
pub use query::{FilterQuery, FilterQueryBuilder};
pub use store::{QueryExecutor, QueryRows, TaxonomyPage, TaxonomyProvider};
