//! Taxonomy listings with visible-archive counts.

use async_trait::async_trait;
use catalog_core::compile::VISIBLE;
use catalog_core::{Taxonomy, TaxonomyEntry, TaxonomyPage, TaxonomyProvider};
use tokio_rusqlite::params;

use crate::{SqliteStore, StoreError};

impl SqliteStore {
    /// One page of `taxonomy` ordered by name; `limit = None` lists everything.
    pub async fn list_entries(
        &self, taxonomy: Taxonomy, limit: Option<u32>, offset: u64,
    ) -> Result<TaxonomyPage, StoreError> {
        let limit = limit.map_or(-1, i64::from);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.conn
            .call(move |conn| -> Result<TaxonomyPage, StoreError> {
                let (table, join, fk) = (taxonomy.table(), taxonomy.join_table(), taxonomy.foreign_key());

                let total: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;

                let mut stmt = conn.prepare(&format!(
                    "SELECT {table}.id, {table}.name, {table}.slug,
                        (SELECT COUNT(*) FROM {join} JOIN archive ON archive.id = {join}.archive_id
                         WHERE {join}.{fk} = {table}.id AND {VISIBLE})
                     FROM {table}
                     ORDER BY {table}.name, {table}.id
                     LIMIT ?1 OFFSET ?2"
                ))?;
                let items = stmt
                    .query_map(params![limit, offset], |row| {
                        let count = row.get(3)?;
                        Ok(TaxonomyEntry { id: row.get(0)?, name: row.get(1)?, slug: row.get(2)?, count: Some(count) })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(TaxonomyPage { items, total })
            })
            .await
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl TaxonomyProvider for SqliteStore {
    async fn list_taxonomy(
        &self, taxonomy: Taxonomy, limit: Option<u32>, offset: u64,
    ) -> Result<TaxonomyPage, catalog_core::Error> {
        Ok(self.list_entries(taxonomy, limit, offset).await?)
    }
}
