//! Catalog schema.
//!
//! Version 1 creates the `archive` table (with `path_folded`, the lowercased
//! path that free-text path search compares against), one table per taxonomy
//! keyed by a unique slug, and the `archive_<plural>` join tables the predicate
//! compiler's `EXISTS` sub-selects walk. Applied versions are recorded in
//! `_migrations`, so opening an existing database only runs newer scripts.

use std::num::ParseIntError;

use tokio_rusqlite::{Connection, params};

use crate::StoreError;

const MIGRATIONS: &[(&str, &str)] = &[("1", include_str!("../migrations/001_catalog.sql"))];

/// Bring the catalog schema up to the newest version.
///
/// # Errors
///
/// `StoreError::MigrationFailed` for a bad version label, otherwise the
/// SQLite error of the failing script.
pub async fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.call(|conn| -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, sql) in MIGRATIONS {
            let version_num: i64 =
                version.parse().map_err(|e: ParseIntError| StoreError::MigrationFailed(e.to_string()))?;
            if version_num > current {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                    params![version_num, chrono::Utc::now().to_rfc3339()],
                )?;
                tracing::debug!(version = version_num, "migration applied");
            }
        }

        Ok(())
    })
    .await
    .map_err(StoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                     AND name IN ('archive', 'artist', 'circle', 'magazine', 'parody', 'tag',
                                  'archive_artists', 'archive_circles', 'archive_magazines',
                                  'archive_parodies', 'archive_tags')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(tables, 11);
    }

    #[tokio::test]
    async fn test_archive_has_folded_path() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let columns: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM pragma_table_info('archive') WHERE name = 'path_folded'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(columns, 1);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let count: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(count, MIGRATIONS.len() as i64);
    }
}
