//! Accumulates directives and request options into a [`FilterQuery`].

use std::collections::BTreeMap;

use super::directive::{Combinator, Directive, Field};
use super::{Comparison, FilterQuery, PageConstraint, SortField, SortOrder, TaxonomyFilter, TitleFilter};
use crate::model::Taxonomy;
use crate::normalize::Normalizer;

pub const DEFAULT_LIMIT: i64 = 25;
pub const MAX_LIMIT: i64 = 100;

/// Mutable collector; [`build`](Self::build) freezes it.
///
/// Values are kept raw until `build`, so the same builder can be rebuilt with
/// a different normalizer in tests.
#[derive(Debug, Clone)]
pub struct FilterQueryBuilder {
    taxonomies: BTreeMap<Taxonomy, TaxonomyFilter>,
    title_match: Option<String>,
    title_wildcard: Option<String>,
    pages: BTreeMap<Comparison, u32>,
    path: Option<String>,
    sort: String,
    order: String,
    limit: i64,
    offset: i64,
    unbounded: bool,
    preloads: Vec<String>,
}

impl Default for FilterQueryBuilder {
    fn default() -> Self {
        Self {
            taxonomies: BTreeMap::new(),
            title_match: None,
            title_wildcard: None,
            pages: BTreeMap::new(),
            path: None,
            sort: String::new(),
            order: String::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            unbounded: false,
            preloads: Vec::new(),
        }
    }
}

impl FilterQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed directive into the collector.
    pub fn apply(&mut self, directive: &Directive) -> &mut Self {
        match directive.field {
            Field::Taxonomy(taxonomy) => {
                let filter = self.taxonomies.entry(taxonomy).or_default();
                let slot = match (directive.negated, directive.wildcard, directive.combinator) {
                    (true, false, _) => &mut filter.excluded_matches,
                    (true, true, _) => &mut filter.excluded_wildcards,
                    (false, false, Combinator::Or) => &mut filter.matches,
                    (false, false, Combinator::And) => &mut filter.matches_all,
                    (false, true, Combinator::Or) => &mut filter.wildcards,
                    (false, true, Combinator::And) => &mut filter.wildcards_all,
                };
                slot.extend(directive.values.iter().cloned());
            }
            Field::Title => {
                let value = directive.values.join(",");
                if directive.wildcard {
                    self.title_wildcard = Some(value);
                } else {
                    self.title_match = Some(value);
                }
            }
            Field::Pages => {
                if let (Some(op), Some(count)) = (directive.comparison, directive.page_count()) {
                    self.pages.insert(op, count);
                }
            }
        }
        self
    }

    pub fn apply_all<'a>(&mut self, directives: impl IntoIterator<Item = &'a Directive>) -> &mut Self {
        for directive in directives {
            self.apply(directive);
        }
        self
    }

    /// Add an exact, OR-combined identifier for `taxonomy`.
    pub fn add_match(&mut self, taxonomy: Taxonomy, value: impl Into<String>) -> &mut Self {
        self.taxonomies.entry(taxonomy).or_default().matches.push(value.into());
        self
    }

    /// Case-insensitive substring match against the stored path.
    pub fn path(&mut self, text: impl Into<String>) -> &mut Self {
        self.path = Some(text.into());
        self
    }

    pub fn sort(&mut self, field: impl Into<String>) -> &mut Self {
        self.sort = field.into();
        self
    }

    pub fn order(&mut self, order: impl Into<String>) -> &mut Self {
        self.order = order.into();
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = offset;
        self
    }

    /// Disable limit and offset entirely.
    pub fn unbounded(&mut self, unbounded: bool) -> &mut Self {
        self.unbounded = unbounded;
        self
    }

    /// Request a relation to be loaded with each row. Unknown names are ignored at build.
    pub fn preload(&mut self, relation: impl Into<String>) -> &mut Self {
        self.preloads.push(relation.into());
        self
    }

    pub fn preloads<I, S>(&mut self, relations: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preloads.extend(relations.into_iter().map(Into::into));
        self
    }

    /// Normalize, clamp and canonicalize into an immutable [`FilterQuery`].
    pub fn build(&self, normalizer: &Normalizer) -> FilterQuery {
        let canonical = |values: &[String]| -> Vec<String> {
            let mut out = normalizer.normalize_all(values.iter().map(String::as_str));
            out.sort();
            out.dedup();
            out
        };
        let taxonomy = |t: Taxonomy| -> TaxonomyFilter {
            let Some(raw) = self.taxonomies.get(&t) else {
                return TaxonomyFilter::default();
            };
            TaxonomyFilter {
                matches: canonical(&raw.matches),
                matches_all: canonical(&raw.matches_all),
                wildcards: canonical(&raw.wildcards),
                wildcards_all: canonical(&raw.wildcards_all),
                excluded_matches: canonical(&raw.excluded_matches),
                excluded_wildcards: canonical(&raw.excluded_wildcards),
            }
        };

        let title = self
            .title_match
            .as_deref()
            .map(|v| normalizer.normalize(v))
            .filter(|v| !v.is_empty())
            .map(TitleFilter::Match)
            .or_else(|| {
                self.title_wildcard
                    .as_deref()
                    .map(|v| normalizer.normalize(v))
                    .filter(|v| !v.is_empty())
                    .map(TitleFilter::Wildcard)
            });

        // first key in priority order wins
        let pages = self.pages.iter().next().map(|(op, value)| PageConstraint { op: *op, value: *value });

        let path = self.path.as_deref().map(|p| p.trim().to_lowercase()).filter(|p| !p.is_empty());

        let (limit, offset) = if self.unbounded {
            (0, 0)
        } else {
            (self.limit.clamp(0, MAX_LIMIT) as u32, self.offset.max(0) as u64)
        };

        let mut preloads: Vec<Taxonomy> = self.preloads.iter().filter_map(|r| Taxonomy::from_relation(r)).collect();
        preloads.sort();
        preloads.dedup();

        FilterQuery {
            path,
            title,
            artists: taxonomy(Taxonomy::Artist),
            circles: taxonomy(Taxonomy::Circle),
            magazines: taxonomy(Taxonomy::Magazine),
            parodies: taxonomy(Taxonomy::Parody),
            tags: taxonomy(Taxonomy::Tag),
            pages,
            sort: SortField::parse(&self.sort),
            order: SortOrder::parse(&self.order),
            limit,
            offset,
            unbounded: self.unbounded,
            preloads,
        }
    }
}
