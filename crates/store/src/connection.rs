//! Database connection management with pragma configuration.
//!
//! Opens the SQLite archive database, applies the pragmas for WAL mode and
//! foreign keys, and runs migrations.

use std::path::Path;

use tokio_rusqlite::Connection;

use crate::StoreError;
use crate::migrations;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Archive database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning shares the connection.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).await.map_err(|e| StoreError::Database(e.into()))?;
        let store = Self::init(conn).await?;
        tracing::info!(path = %path.display(), "archive database opened");
        Ok(store)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await.map_err(|e| StoreError::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(StoreError::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
