//! In-memory result caches.
//!
//! This module provides the process-local caches that sit in front of the
//! persistence collaborator. It supports:
//!
//! - Typed payloads per instance (`ResultCache<V>`)
//! - Two-part keys with structural namespace purges
//! - Capacity bounds with least-recently-used eviction
//! - Lazy TTL expiry
//! - A named registry for administrative purges

pub mod hash;
pub mod key;
pub mod registry;
pub mod result_cache;

pub use hash::{canonical_key, compute_cache_key};
pub use key::CacheKey;
pub use registry::{CacheControl, CacheRegistry};
pub use result_cache::{CacheStats, ResultCache};
