//! Collaborator fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::Error;
use crate::compile::CompiledQuery;
use crate::model::{Archive, Taxonomy, TaxonomyEntry};
use crate::normalize::slugify;
use crate::store::{QueryExecutor, QueryRows, TaxonomyPage, TaxonomyProvider};

#[derive(Default)]
pub struct StaticTaxonomies {
    entries: HashMap<Taxonomy, Vec<TaxonomyEntry>>,
    failing: bool,
    calls: AtomicUsize,
}

impl StaticTaxonomies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, taxonomy: Taxonomy, names: &[&str]) -> Self {
        let list = self.entries.entry(taxonomy).or_default();
        for name in names {
            list.push(TaxonomyEntry {
                id: list.len() as i64 + 1,
                name: (*name).to_string(),
                slug: slugify(name),
                count: Some(1),
            });
        }
        list.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaxonomyProvider for StaticTaxonomies {
    async fn list_taxonomy(&self, taxonomy: Taxonomy, limit: Option<u32>, offset: u64) -> Result<TaxonomyPage, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Persistence("taxonomy store offline".into()));
        }
        let all = self.entries.get(&taxonomy).cloned().unwrap_or_default();
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit.map_or(usize::MAX, |l| l as usize))
            .collect();
        Ok(TaxonomyPage { items, total })
    }
}

/// Executor returning canned rows and recording every compiled query it sees.
#[derive(Default)]
pub struct CountingExecutor {
    rows: Vec<Archive>,
    failing: bool,
    seen: Mutex<Vec<CompiledQuery>>,
    lookups: AtomicUsize,
}

impl CountingExecutor {
    pub fn new(rows: Vec<Archive>) -> Self {
        Self { rows, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { failing: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<CompiledQuery> {
        self.seen.lock().last().cloned()
    }
}

#[async_trait]
impl QueryExecutor for CountingExecutor {
    async fn execute(&self, query: &CompiledQuery) -> Result<QueryRows, Error> {
        self.seen.lock().push(query.clone());
        if self.failing {
            return Err(Error::Persistence("database is locked".into()));
        }
        Ok(QueryRows { rows: self.rows.clone(), total: self.rows.len() as i64 })
    }

    async fn find_archive(&self, id: i64, _preloads: &[Taxonomy]) -> Result<Option<Archive>, Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Persistence("database is locked".into()));
        }
        Ok(self.rows.iter().find(|a| a.id == id).cloned())
    }
}

pub fn archive(id: i64, title: &str) -> Archive {
    Archive {
        id,
        title: title.to_string(),
        slug: slugify(title),
        path: format!("/archives/{}.zip", slugify(title)),
        pages: 20,
        created_at: "2024-01-01T00:00:00Z".into(),
        updated_at: "2024-01-01T00:00:00Z".into(),
        published_at: Some("2024-01-02T00:00:00Z".into()),
        ..Default::default()
    }
}
