//! Cached taxonomy listings and identifier validity checks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::cache::{CacheKey, ResultCache, canonical_key};
use crate::model::{Taxonomy, TaxonomyListing};
use crate::normalize::Normalizer;
use crate::store::TaxonomyProvider;

#[derive(Serialize)]
struct ListingKey {
    limit: u32,
    offset: u64,
}

/// Taxonomy listings read through a result cache, plus a validity memo used
/// by the free-text fallback.
///
/// Validity answers are memoized for the life of the index; their staleness
/// is bounded by the listing cache TTL at the time they were first computed.
pub struct TaxonomyIndex {
    provider: Arc<dyn TaxonomyProvider>,
    listings: Arc<ResultCache<TaxonomyListing>>,
    normalizer: Arc<Normalizer>,
    validity: RwLock<HashMap<(Taxonomy, String), bool>>,
}

impl TaxonomyIndex {
    pub fn new(
        provider: Arc<dyn TaxonomyProvider>, listings: Arc<ResultCache<TaxonomyListing>>, normalizer: Arc<Normalizer>,
    ) -> Self {
        Self { provider, listings, normalizer, validity: RwLock::new(HashMap::new()) }
    }

    pub fn listings(&self) -> &Arc<ResultCache<TaxonomyListing>> {
        &self.listings
    }

    /// One page of `taxonomy`, ordered by name. `limit <= 0` lists everything.
    ///
    /// Provider failures come back in `error` and are cached like any result.
    pub async fn list(&self, taxonomy: Taxonomy, limit: i64, offset: i64) -> TaxonomyListing {
        let limit = u32::try_from(limit.max(0)).unwrap_or(u32::MAX);
        let offset = offset.max(0) as u64;

        let local = match canonical_key(&ListingKey { limit, offset }) {
            Ok(local) => local,
            Err(err) => return TaxonomyListing { error: Some(err), ..Default::default() },
        };
        let key = CacheKey::new(taxonomy.plural(), local);

        if let Some(hit) = self.listings.get(&key) {
            return hit;
        }

        let listing = match self.provider.list_taxonomy(taxonomy, (limit > 0).then_some(limit), offset).await {
            Ok(page) => TaxonomyListing { items: page.items, total: page.total, error: None },
            Err(err) => {
                tracing::warn!(taxonomy = taxonomy.as_str(), error = %err, "taxonomy listing failed");
                TaxonomyListing { error: Some(err), ..Default::default() }
            }
        };

        self.listings.set(key, listing.clone(), None);
        listing
    }

    /// Whether `text` names a known entry of `taxonomy` once normalized.
    ///
    /// A failed listing makes the answer `false` without memoizing it.
    pub async fn is_valid(&self, taxonomy: Taxonomy, text: &str) -> bool {
        let identifier = self.normalizer.normalize(text);
        if identifier.is_empty() {
            return false;
        }

        let memo_key = (taxonomy, identifier);
        if let Some(valid) = self.validity.read().get(&memo_key) {
            return *valid;
        }

        let listing = self.list(taxonomy, 0, 0).await;
        if listing.error.is_some() {
            return false;
        }

        let valid = listing.items.iter().any(|entry| entry.slug == memo_key.1);
        tracing::debug!(taxonomy = taxonomy.as_str(), identifier = %memo_key.1, valid, "taxonomy validity memoized");
        self.validity.write().insert(memo_key, valid);
        valid
    }

    /// Drop every memoized validity answer.
    pub fn forget(&self) -> usize {
        let mut validity = self.validity.write();
        let count = validity.len();
        validity.clear();
        count
    }
}

impl std::fmt::Debug for TaxonomyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyIndex")
            .field("listings", &self.listings.name())
            .field("memoized", &self.validity.read().len())
            .finish()
    }
}
