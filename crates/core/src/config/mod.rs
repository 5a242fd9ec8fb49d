//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CATALOG_*)
//! 2. TOML config file (if CATALOG_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Sizing of one result cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of entries before least-recently-used eviction.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Default time-to-live of an entry, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheSettings {
    /// TTL as Duration for the cache constructor.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { capacity: default_capacity(), ttl_secs: default_ttl_secs() }
    }
}

/// One settings block per independent cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachesConfig {
    /// Archive listings (search results).
    #[serde(default)]
    pub archives: CacheSettings,

    /// Single-archive lookups.
    #[serde(default)]
    pub archive: CacheSettings,

    /// Taxonomy listings backing the free-text validity checks.
    #[serde(default)]
    pub taxonomies: CacheSettings,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CATALOG_*)
/// 2. TOML config file (if CATALOG_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite archive database.
    ///
    /// Set via CATALOG_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Number of archives per search page.
    ///
    /// Set via CATALOG_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Number of taxonomy entries per listing page.
    ///
    /// Set via CATALOG_TAXONOMY_PAGE_SIZE environment variable.
    #[serde(default = "default_taxonomy_page_size")]
    pub taxonomy_page_size: u32,

    /// Result cache sizing.
    ///
    /// Set via CATALOG_CACHES__<NAME>__CAPACITY / CATALOG_CACHES__<NAME>__TTL_SECS.
    #[serde(default)]
    pub caches: CachesConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./catalog.sqlite")
}

fn default_page_size() -> u32 {
    25
}

fn default_taxonomy_page_size() -> u32 {
    200
}

fn default_capacity() -> usize {
    4096
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            page_size: default_page_size(),
            taxonomy_page_size: default_taxonomy_page_size(),
            caches: CachesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CATALOG_`
    /// 2. TOML file from `CATALOG_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CATALOG_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CATALOG_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./catalog.sqlite"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.taxonomy_page_size, 200);
        assert_eq!(config.caches.archives.capacity, 4096);
        assert_eq!(config.caches.taxonomies.ttl_secs, 3600);
    }

    #[test]
    fn test_ttl_duration() {
        let settings = CacheSettings { capacity: 8, ttl_secs: 90 };
        assert_eq!(settings.ttl(), Duration::from_secs(90));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "catalog.toml",
                r#"
                page_size = 40

                [caches.archives]
                capacity = 128
                "#,
            )?;
            jail.set_env("CATALOG_CONFIG_FILE", "catalog.toml");
            jail.set_env("CATALOG_CACHES__ARCHIVES__TTL_SECS", "60");
            jail.set_env("CATALOG_PAGE_SIZE", "50");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.page_size, 50);
            assert_eq!(config.caches.archives.capacity, 128);
            assert_eq!(config.caches.archives.ttl_secs, 60);
            assert_eq!(config.caches.archive, CacheSettings::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CATALOG_PAGE_SIZE", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
