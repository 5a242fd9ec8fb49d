//! Canonical cache key generation.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Error;

/// Compute a cache key from an already canonical serialization.
pub fn compute_cache_key(canonical: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical);
    hex::encode(hasher.finalize())
}

/// Serialize `value` as JSON (struct field order, caller-sorted sets) and hash it.
///
/// Two values that serialize identically always share a key.
pub fn canonical_key<T: Serialize>(value: &T) -> Result<String, Error> {
    let buf = serde_json::to_vec(value).map_err(|e| Error::InvalidInput(format!("unserializable cache key: {e}")))?;
    Ok(compute_cache_key(&buf))
}
