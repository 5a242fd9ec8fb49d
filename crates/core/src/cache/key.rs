//! Two-part cache keys.

use std::fmt;

/// A cache key split into a purgeable namespace and a local key.
///
/// Namespace purges compare the `namespace` field structurally, so a local key
/// that happens to contain `/` can never leak into another namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub namespace: String,
    pub local: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), local: local.into() }
    }

    /// Whether this key lives under `namespace`.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace == namespace
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.namespace, self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_parts() {
        let key = CacheKey::new("archives", "abc");
        assert_eq!(key.to_string(), "/archives/abc");
    }

    #[test]
    fn test_namespace_is_structural() {
        let key = CacheKey::new("1", "2/3");
        assert!(key.in_namespace("1"));
        assert!(!key.in_namespace("1/2"));

        let other = CacheKey::new("12", "3");
        assert!(!other.in_namespace("1"));
    }
}
