//! SQLite persistence for the archive catalog.
//!
//! This crate provides:
//! - Schema migrations for archives and their taxonomies
//! - Archive seeding with publish and expunge flags
//! - Execution of compiled filter queries (`QueryExecutor`)
//! - Taxonomy listings (`TaxonomyProvider`)

pub mod archives;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod taxonomies;

pub use archives::NewArchive;
pub use connection::SqliteStore;
pub use error::StoreError;
