//! Named cache instances for the administrative purge signal.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CacheStats, ResultCache};
use crate::Error;

/// Type-erased control surface of a cache instance.
pub trait CacheControl: Send + Sync {
    fn name(&self) -> &str;
    fn purge(&self, namespace: &str) -> usize;
    fn purge_all(&self) -> usize;
    fn stats(&self) -> CacheStats;
}

impl<V: Clone + Send + Sync> CacheControl for ResultCache<V> {
    fn name(&self) -> &str {
        ResultCache::name(self)
    }

    fn purge(&self, namespace: &str) -> usize {
        ResultCache::purge(self, namespace)
    }

    fn purge_all(&self) -> usize {
        ResultCache::purge_all(self)
    }

    fn stats(&self) -> CacheStats {
        ResultCache::stats(self)
    }
}

/// Registry of every cache instance a process owns, addressable by name.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: BTreeMap<String, Arc<dyn CacheControl>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under its own name, replacing any previous one.
    pub fn register(&mut self, cache: Arc<dyn CacheControl>) {
        self.caches.insert(cache.name().to_string(), cache);
    }

    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    /// Purge one namespace of a named cache, or the whole cache if `namespace` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCache` if no cache is registered under `name`.
    pub fn purge(&self, name: &str, namespace: Option<&str>) -> Result<usize, Error> {
        let cache = self.caches.get(name).ok_or_else(|| Error::UnknownCache(name.to_string()))?;
        let purged = match namespace {
            Some(namespace) => cache.purge(namespace),
            None => cache.purge_all(),
        };
        tracing::info!(cache = name, namespace = namespace.unwrap_or("*"), purged, "cache purged");
        Ok(purged)
    }

    /// Purge `namespace` from every registered cache, or empty them all if `namespace` is `None`.
    pub fn purge_everywhere(&self, namespace: Option<&str>) -> usize {
        let purged = self
            .caches
            .values()
            .map(|cache| match namespace {
                Some(namespace) => cache.purge(namespace),
                None => cache.purge_all(),
            })
            .sum();
        tracing::info!(cache = "*", namespace = namespace.unwrap_or("*"), purged, "caches purged");
        purged
    }

    /// Stats of every registered cache, keyed by name.
    pub fn stats(&self) -> BTreeMap<String, CacheStats> {
        self.caches.iter().map(|(name, cache)| (name.clone(), cache.stats())).collect()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry").field("caches", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use std::time::Duration;

    fn registry() -> (CacheRegistry, Arc<ResultCache<u32>>, Arc<ResultCache<String>>) {
        let numbers = Arc::new(ResultCache::new("numbers", 16, Duration::from_secs(60)));
        let words = Arc::new(ResultCache::new("words", 16, Duration::from_secs(60)));
        let mut registry = CacheRegistry::new();
        registry.register(numbers.clone());
        registry.register(words.clone());
        (registry, numbers, words)
    }

    #[test]
    fn test_purge_named_namespace() {
        let (registry, numbers, words) = registry();
        numbers.set(CacheKey::new("a", "1"), 1, None);
        numbers.set(CacheKey::new("b", "1"), 2, None);
        words.set(CacheKey::new("a", "1"), "x".into(), None);

        assert_eq!(registry.purge("numbers", Some("a")).unwrap(), 1);
        assert!(!numbers.contains(&CacheKey::new("a", "1")));
        assert!(numbers.contains(&CacheKey::new("b", "1")));
        assert!(words.contains(&CacheKey::new("a", "1")));
    }

    #[test]
    fn test_purge_whole_cache() {
        let (registry, numbers, _) = registry();
        numbers.set(CacheKey::new("a", "1"), 1, None);
        numbers.set(CacheKey::new("b", "1"), 2, None);
        assert_eq!(registry.purge("numbers", None).unwrap(), 2);
        assert_eq!(numbers.stats().size, 0);
    }

    #[test]
    fn test_purge_unknown_cache() {
        let (registry, _, _) = registry();
        let result = registry.purge("templates", None);
        assert!(matches!(result, Err(Error::UnknownCache(name)) if name == "templates"));
    }

    #[test]
    fn test_purge_everywhere_and_stats() {
        let (registry, numbers, words) = registry();
        numbers.set(CacheKey::new("a", "1"), 1, None);
        words.set(CacheKey::new("a", "1"), "x".into(), None);
        words.set(CacheKey::new("z", "1"), "y".into(), None);

        assert_eq!(registry.purge_everywhere(Some("a")), 2);

        let stats = registry.stats();
        assert_eq!(registry.names(), vec!["numbers".to_string(), "words".to_string()]);
        assert_eq!(stats["numbers"].size, 0);
        assert_eq!(stats["words"].size, 1);

        assert_eq!(registry.purge_everywhere(None), 1);
        assert_eq!(registry.stats()["words"].size, 0);
    }
}
