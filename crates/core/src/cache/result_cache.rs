//! Bounded, expiring, namespaced result cache.
//!
//! One coarse read/write lock guards each instance. Lookups take the write
//! side because a hit refreshes recency; stats and key listings only read.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CacheKey;

/// Hit/miss counters and current size of one cache instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    /// Live (non-expired) entries.
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub lookups: u64,
    /// `hits / lookups`, or 0 before the first lookup.
    pub hit_rate: f64,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) >= self.ttl
    }
}

/// A typed, capacity- and TTL-bounded cache with namespace purges.
///
/// Constructed explicitly and shared through `Arc`; there is no global
/// instance.
#[derive(Debug)]
pub struct ResultCache<V> {
    name: String,
    default_ttl: Duration,
    entries: RwLock<LruCache<CacheKey, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1), each
    /// living `default_ttl` unless overridden on insert.
    pub fn new(name: impl Into<String>, capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name: name.into(),
            default_ttl,
            entries: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.entries.read().cap().get()
    }

    /// Look up a fresh entry, refreshing its recency on a hit.
    ///
    /// Expired entries are dropped on sight and reported as misses.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        let (found, expired) = match entries.get(key) {
            Some(entry) if entry.is_expired(now) => (None, true),
            Some(entry) => (Some(entry.value.clone()), false),
            None => (None, false),
        };
        if expired {
            entries.pop(key);
        }
        drop(entries);

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cache = %self.name, %key, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cache = %self.name, %key, expired, "cache miss");
        }
        found
    }

    /// Whether a fresh entry exists. Does not touch recency or counters.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.entries.read().peek(key).is_some_and(|entry| !entry.is_expired(now))
    }

    /// Insert or replace an entry.
    ///
    /// `ttl` of `None` (or zero) uses the instance default. Inserting into a
    /// full cache evicts the least-recently-used entry.
    pub fn set(&self, key: CacheKey, value: V, ttl: Option<Duration>) {
        let ttl = ttl.filter(|ttl| !ttl.is_zero()).unwrap_or(self.default_ttl);
        let entry = Entry { value, inserted_at: Instant::now(), ttl };

        if let Some((evicted, _)) = self.entries.write().push(key.clone(), entry)
            && evicted != key
        {
            tracing::trace!(cache = %self.name, key = %evicted, "evicted least recently used entry");
        }
    }

    /// Remove one entry, returning whether it was present.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.write().pop(key).is_some()
    }

    /// Remove every entry stored under `namespace`.
    ///
    /// Scans the whole instance under the write lock.
    pub fn purge(&self, namespace: &str) -> usize {
        let mut entries = self.entries.write();
        let doomed: Vec<CacheKey> =
            entries.iter().filter(|(key, _)| key.in_namespace(namespace)).map(|(key, _)| key.clone()).collect();
        for key in &doomed {
            entries.pop(key);
        }
        drop(entries);

        tracing::debug!(cache = %self.name, namespace, purged = doomed.len(), "purged namespace");
        doomed.len()
    }

    /// Remove every entry in the instance.
    pub fn purge_all(&self) -> usize {
        let mut entries = self.entries.write();
        let purged = entries.len();
        entries.clear();
        drop(entries);

        tracing::debug!(cache = %self.name, purged, "purged cache");
        purged
    }

    /// Local keys of the fresh entries stored under `namespace`, sorted.
    pub fn keys_in(&self, namespace: &str) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(key, entry)| key.in_namespace(namespace) && !entry.is_expired(now))
            .map(|(key, _)| key.local.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let size = self.entries.read().iter().filter(|(_, entry)| !entry.is_expired(now)).count();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 };

        CacheStats { size, hits, misses, lookups, hit_rate }
    }
}
