//! Persistence collaborator boundary.
//!
//! The core never talks to a database directly. It hands compiled predicate
//! lists to a [`QueryExecutor`] and reads taxonomy identifiers from a
//! [`TaxonomyProvider`]. Retry and backoff, if any, belong to implementors.

use async_trait::async_trait;

use crate::Error;
use crate::compile::CompiledQuery;
use crate::model::{Archive, Taxonomy, TaxonomyEntry};

/// Rows of one listing request plus the unpaginated total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    pub rows: Vec<Archive>,
    pub total: i64,
}

/// One page of a taxonomy listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyPage {
    pub items: Vec<TaxonomyEntry>,
    pub total: i64,
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run the row query and the count query of `query`.
    async fn execute(&self, query: &CompiledQuery) -> Result<QueryRows, Error>;

    /// Fetch one visible archive by id with the requested relations.
    async fn find_archive(&self, id: i64, preloads: &[Taxonomy]) -> Result<Option<Archive>, Error>;
}

#[async_trait]
pub trait TaxonomyProvider: Send + Sync {
    /// List known entries of `taxonomy` ordered by name; `limit = None` lists everything.
    async fn list_taxonomy(&self, taxonomy: Taxonomy, limit: Option<u32>, offset: u64) -> Result<TaxonomyPage, Error>;
}
