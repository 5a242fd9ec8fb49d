//! Archive rows: seeding, visibility flags and compiled-query execution.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use catalog_core::compile::{VISIBLE, where_clause};
use catalog_core::{Archive, CompiledQuery, QueryExecutor, QueryRows, SqlValue, Taxonomy, TaxonomyEntry, slugify};
use tokio_rusqlite::rusqlite::types::Value;
use tokio_rusqlite::rusqlite::{self, params, params_from_iter};

use crate::{SqliteStore, StoreError};

const ARCHIVE_COLUMNS: &str = "archive.id, archive.title, archive.slug, archive.path, archive.pages, archive.size,
     archive.created_at, archive.updated_at, archive.published_at";

/// An archive to insert or update, keyed by its path.
#[derive(Debug, Clone, Default)]
pub struct NewArchive {
    pub title: String,
    pub path: String,
    pub pages: i64,
    pub size: i64,
    pub published: bool,
    pub taxonomies: BTreeMap<Taxonomy, Vec<String>>,
}

impl NewArchive {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self { title: title.into(), path: path.into(), published: true, ..Default::default() }
    }

    pub fn pages(mut self, pages: i64) -> Self {
        self.pages = pages;
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    /// Attach entries of `taxonomy` by display name.
    pub fn with(mut self, taxonomy: Taxonomy, names: &[&str]) -> Self {
        self.taxonomies.entry(taxonomy).or_default().extend(names.iter().map(|n| (*n).to_string()));
        self
    }
}

pub(crate) fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Text(text) => Value::Text(text.clone()),
        SqlValue::Integer(n) => Value::Integer(*n),
    }
}

fn read_archive(row: &rusqlite::Row<'_>) -> rusqlite::Result<Archive> {
    Ok(Archive {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        path: row.get(3)?,
        pages: row.get(4)?,
        size: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        published_at: row.get(8)?,
        ..Default::default()
    })
}

/// Fill the requested relations of `archives` with one query per relation.
fn load_relations(
    conn: &rusqlite::Connection, archives: &mut [Archive], preloads: &[Taxonomy],
) -> Result<(), StoreError> {
    if archives.is_empty() || preloads.is_empty() {
        return Ok(());
    }

    let ids: Vec<Value> = archives.iter().map(|a| Value::Integer(a.id)).collect();
    let placeholders = vec!["?"; ids.len()].join(", ");

    for taxonomy in preloads {
        let (table, join, fk) = (taxonomy.table(), taxonomy.join_table(), taxonomy.foreign_key());
        let sql = format!(
            "SELECT {join}.archive_id, {table}.id, {table}.name, {table}.slug
             FROM {join} JOIN {table} ON {table}.id = {join}.{fk}
             WHERE {join}.archive_id IN ({placeholders})
             ORDER BY {table}.name, {table}.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut by_archive: HashMap<i64, Vec<TaxonomyEntry>> = HashMap::new();
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            let entry = TaxonomyEntry { id: row.get(1)?, name: row.get(2)?, slug: row.get(3)?, count: None };
            Ok((row.get::<_, i64>(0)?, entry))
        })?;
        for row in rows {
            let (archive_id, entry) = row?;
            by_archive.entry(archive_id).or_default().push(entry);
        }
        for archive in archives.iter_mut() {
            *archive.relation_mut(*taxonomy) = by_archive.remove(&archive.id).unwrap_or_default();
        }
    }

    Ok(())
}

impl SqliteStore {
    /// Insert or update an archive and replace its taxonomy links.
    ///
    /// Taxonomy entries are created on first use, keyed by their slug.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` for an empty path.
    pub async fn upsert_archive(&self, archive: &NewArchive) -> Result<i64, StoreError> {
        if archive.path.trim().is_empty() {
            return Err(StoreError::InvalidInput("archive path must not be empty".into()));
        }

        let archive = archive.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<i64, StoreError> {
                let tx = conn.transaction()?;
                let published_at = archive.published.then(|| now.clone());
                tx.execute(
                    "INSERT INTO archive
                        (title, slug, path, path_folded, pages, size, created_at, updated_at, published_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8)
                     ON CONFLICT(path) DO UPDATE SET
                        title = excluded.title,
                        slug = excluded.slug,
                        path_folded = excluded.path_folded,
                        pages = excluded.pages,
                        size = excluded.size,
                        updated_at = excluded.updated_at,
                        published_at = excluded.published_at",
                    params![
                        archive.title,
                        slugify(&archive.title),
                        archive.path,
                        archive.path.to_lowercase(),
                        archive.pages,
                        archive.size,
                        now,
                        published_at
                    ],
                )?;
                let id: i64 =
                    tx.query_row("SELECT id FROM archive WHERE path = ?1", params![archive.path], |row| row.get(0))?;

                for taxonomy in Taxonomy::ALL {
                    let (table, join, fk) = (taxonomy.table(), taxonomy.join_table(), taxonomy.foreign_key());
                    tx.execute(&format!("DELETE FROM {join} WHERE archive_id = ?1"), params![id])?;

                    let Some(names) = archive.taxonomies.get(&taxonomy) else { continue };
                    for name in names {
                        let slug = slugify(name);
                        if slug.is_empty() {
                            continue;
                        }
                        tx.execute(
                            &format!("INSERT INTO {table} (name, slug) VALUES (?1, ?2) ON CONFLICT(slug) DO NOTHING"),
                            params![name.trim(), slug],
                        )?;
                        let entry_id: i64 = tx.query_row(
                            &format!("SELECT id FROM {table} WHERE slug = ?1"),
                            params![slug],
                            |row| row.get(0),
                        )?;
                        tx.execute(
                            &format!("INSERT OR IGNORE INTO {join} (archive_id, {fk}) VALUES (?1, ?2)"),
                            params![id, entry_id],
                        )?;
                    }
                }

                tx.commit()?;
                Ok(id)
            })
            .await
            .map_err(StoreError::from)
    }

    /// Publish or unpublish an archive. Returns whether the row exists.
    pub async fn set_published(&self, id: i64, published: bool) -> Result<bool, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, StoreError> {
                let changed = conn.execute(
                    "UPDATE archive SET published_at = ?2, updated_at = ?3 WHERE id = ?1",
                    params![id, published.then(|| now.clone()), now],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(StoreError::from)
    }

    /// Withdraw an archive; it stays in the table but never matches a query.
    pub async fn expunge(&self, id: i64) -> Result<bool, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, StoreError> {
                let changed =
                    conn.execute("UPDATE archive SET expunged = 1, updated_at = ?2 WHERE id = ?1", params![id, now])?;
                Ok(changed > 0)
            })
            .await
            .map_err(StoreError::from)
    }

    /// Run the count query and the row query of `query`.
    pub async fn query_rows(&self, query: &CompiledQuery) -> Result<QueryRows, StoreError> {
        let query = query.clone();
        self.conn
            .call(move |conn| -> Result<QueryRows, StoreError> {
                let (clause, args) = where_clause(&query.count.filters);
                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM archive WHERE {clause}"),
                    params_from_iter(args.iter().map(to_value)),
                    |row| row.get(0),
                )?;

                let rows = &query.rows;
                let (clause, mut args) = where_clause(&rows.filters);
                let mut sql =
                    format!("SELECT {ARCHIVE_COLUMNS} FROM archive WHERE {clause} ORDER BY {}", rows.order.to_sql());
                let offset = i64::try_from(rows.offset).unwrap_or(i64::MAX);
                match rows.limit {
                    Some(limit) => {
                        sql.push_str(" LIMIT ? OFFSET ?");
                        args.push(SqlValue::Integer(i64::from(limit)));
                        args.push(SqlValue::Integer(offset));
                    }
                    None if offset > 0 => {
                        sql.push_str(" LIMIT -1 OFFSET ?");
                        args.push(SqlValue::Integer(offset));
                    }
                    None => {}
                }

                let mut stmt = conn.prepare(&sql)?;
                let mut archives = stmt
                    .query_map(params_from_iter(args.iter().map(to_value)), read_archive)?
                    .collect::<Result<Vec<_>, _>>()?;
                load_relations(conn, &mut archives, &rows.preloads)?;

                Ok(QueryRows { rows: archives, total })
            })
            .await
            .map_err(StoreError::from)
    }

    /// Fetch one visible archive with the requested relations.
    pub async fn get_archive(&self, id: i64, preloads: &[Taxonomy]) -> Result<Option<Archive>, StoreError> {
        let preloads = preloads.to_vec();
        self.conn
            .call(move |conn| -> Result<Option<Archive>, StoreError> {
                let result = conn.query_row(
                    &format!("SELECT {ARCHIVE_COLUMNS} FROM archive WHERE archive.id = ?1 AND {VISIBLE}"),
                    params![id],
                    read_archive,
                );

                let mut archive = match result {
                    Ok(archive) => archive,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                load_relations(conn, std::slice::from_mut(&mut archive), &preloads)?;
                Ok(Some(archive))
            })
            .await
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl QueryExecutor for SqliteStore {
    async fn execute(&self, query: &CompiledQuery) -> Result<QueryRows, catalog_core::Error> {
        Ok(self.query_rows(query).await?)
    }

    async fn find_archive(&self, id: i64, preloads: &[Taxonomy]) -> Result<Option<Archive>, catalog_core::Error> {
        Ok(self.get_archive(id, preloads).await?)
    }
}
