//! Predicate compiler.
//!
//! Turns a [`FilterQuery`] into parameterized SQL fragments. Values never
//! reach the SQL text; every one travels as a positional `?` argument.
//!
//! Fragment order: path, title, each taxonomy (artist, circle, magazine,
//! parody, tag), pages, then the base visibility filter.

use serde::Serialize;

use crate::model::Taxonomy;
use crate::query::{FilterQuery, SortField, SortOrder, TaxonomyFilter, TitleFilter};

/// Base visibility filter appended to every compiled query.
pub const VISIBLE: &str = "archive.published_at IS NOT NULL AND archive.expunged = 0";

/// Positional argument of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

/// One parameterized condition. The number of `?` in `condition` equals `args.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub condition: String,
    pub args: Vec<SqlValue>,
}

impl Fragment {
    pub fn new(condition: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self { condition: condition.into(), args }
    }

    /// OR-join alternatives into one parenthesized fragment.
    pub fn any_of(mut fragments: Vec<Fragment>) -> Self {
        if fragments.len() == 1
            && let Some(only) = fragments.pop()
        {
            return only;
        }
        let mut conditions = Vec::with_capacity(fragments.len());
        let mut args = Vec::new();
        for fragment in fragments {
            conditions.push(fragment.condition);
            args.extend(fragment.args);
        }
        Self { condition: format!("({})", conditions.join(" OR ")), args }
    }
}

/// AND-join fragments into a `WHERE` body and its flattened arguments.
pub fn where_clause(fragments: &[Fragment]) -> (String, Vec<SqlValue>) {
    let condition = fragments.iter().map(|f| f.condition.as_str()).collect::<Vec<_>>().join(" AND ");
    let args = fragments.iter().flat_map(|f| f.args.iter().cloned()).collect();
    (condition, args)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub field: SortField,
    pub order: SortOrder,
}

impl OrderBy {
    /// `ORDER BY` body; ties broken by id in the same direction.
    pub fn to_sql(&self) -> String {
        let dir = self.order.as_sql();
        match self.field {
            SortField::Id => format!("archive.id {dir}"),
            field => format!("archive.{} {dir}, archive.id {dir}", field.as_str()),
        }
    }
}

/// Row retrieval: filters plus ordering, pagination and relation preloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowQuery {
    pub filters: Vec<Fragment>,
    pub order: OrderBy,
    /// `None` means no `LIMIT` clause.
    pub limit: Option<u32>,
    pub offset: u64,
    pub preloads: Vec<Taxonomy>,
}

/// Total count: the same filters, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountQuery {
    pub filters: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub rows: RowQuery,
    pub count: CountQuery,
}

/// Compile `query` into a row query and a count query sharing one filter list.
pub fn compile(query: &FilterQuery) -> CompiledQuery {
    let mut filters = Vec::new();

    // the needle is already lowercased; the store keeps a lowercased path copy
    if let Some(path) = query.path() {
        filters.push(Fragment::new(
            r"archive.path_folded LIKE '%' || ? || '%' ESCAPE '\'",
            vec![escape_like(path).into()],
        ));
    }

    match query.title() {
        Some(TitleFilter::Match(slug)) => filters.push(Fragment::new("archive.slug = ?", vec![slug.as_str().into()])),
        Some(TitleFilter::Wildcard(slug)) => {
            filters.push(Fragment::new("archive.slug LIKE '%' || ? || '%'", vec![slug.as_str().into()]))
        }
        None => {}
    }

    for taxonomy in Taxonomy::ALL {
        compile_taxonomy(taxonomy, query.taxonomy(taxonomy), &mut filters);
    }

    if let Some(pages) = query.pages() {
        let condition = format!("archive.pages {} ?", pages.op.symbol());
        filters.push(Fragment::new(condition, vec![i64::from(pages.value).into()]));
    }

    filters.push(Fragment::new(VISIBLE, Vec::new()));

    let limit = match query.limit() {
        0 => None,
        n => Some(n),
    };

    CompiledQuery {
        count: CountQuery { filters: filters.clone() },
        rows: RowQuery {
            filters,
            order: OrderBy { field: query.sort(), order: query.order() },
            limit,
            offset: query.offset(),
            preloads: query.preloads().to_vec(),
        },
    }
}

#[derive(Clone, Copy)]
enum Membership {
    Exact,
    Substring,
}

fn membership(taxonomy: Taxonomy, how: Membership, negated: bool, value: &str) -> Fragment {
    let table = taxonomy.table();
    let join = taxonomy.join_table();
    let fk = taxonomy.foreign_key();
    let cmp = match how {
        Membership::Exact => "= ?",
        Membership::Substring => "LIKE '%' || ? || '%'",
    };
    let not = if negated { "NOT " } else { "" };
    Fragment::new(
        format!(
            "{not}EXISTS (SELECT 1 FROM {join} JOIN {table} ON {table}.id = {join}.{fk} \
             WHERE {join}.archive_id = archive.id AND {table}.slug {cmp})"
        ),
        vec![value.into()],
    )
}

fn compile_taxonomy(taxonomy: Taxonomy, filter: &TaxonomyFilter, out: &mut Vec<Fragment>) {
    let any = |values: &[String], how: Membership| {
        Fragment::any_of(values.iter().map(|v| membership(taxonomy, how, false, v)).collect())
    };

    if !filter.matches.is_empty() {
        out.push(any(&filter.matches, Membership::Exact));
    }
    out.extend(filter.matches_all.iter().map(|v| membership(taxonomy, Membership::Exact, false, v)));
    if !filter.wildcards.is_empty() {
        out.push(any(&filter.wildcards, Membership::Substring));
    }
    out.extend(filter.wildcards_all.iter().map(|v| membership(taxonomy, Membership::Substring, false, v)));
    out.extend(filter.excluded_matches.iter().map(|v| membership(taxonomy, Membership::Exact, true, v)));
    out.extend(filter.excluded_wildcards.iter().map(|v| membership(taxonomy, Membership::Substring, true, v)));
}

/// Escape `LIKE` metacharacters for use with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
