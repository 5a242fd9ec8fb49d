//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, CacheSettings};
use thiserror::Error;

const MAX_CAPACITY: usize = 1_000_000;
const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `page_size` is 0 or exceeds 100
    /// - `taxonomy_page_size` is 0
    /// - a cache capacity is 0 or exceeds 1,000,000 entries
    /// - a cache TTL is 0 or exceeds 7 days
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > 100 {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be between 1 and 100".into() });
        }

        if self.taxonomy_page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "taxonomy_page_size".into(),
                reason: "must be greater than 0".into(),
            });
        }

        validate_cache("caches.archives", &self.caches.archives)?;
        validate_cache("caches.archive", &self.caches.archive)?;
        validate_cache("caches.taxonomies", &self.caches.taxonomies)?;

        Ok(())
    }
}

fn validate_cache(name: &str, settings: &CacheSettings) -> Result<(), ConfigError> {
    if settings.capacity == 0 || settings.capacity > MAX_CAPACITY {
        return Err(ConfigError::Invalid {
            field: format!("{name}.capacity"),
            reason: format!("must be between 1 and {MAX_CAPACITY}"),
        });
    }

    if settings.ttl_secs == 0 || settings.ttl_secs > MAX_TTL_SECS {
        return Err(ConfigError::Invalid {
            field: format!("{name}.ttl_secs"),
            reason: "must be between 1 second and 7 days".into(),
        });
    }

    if settings.ttl_secs < 60 {
        tracing::warn!(cache = name, ttl_secs = settings.ttl_secs, "very short cache TTL; expect frequent store hits");
    }

    Ok(())
}
