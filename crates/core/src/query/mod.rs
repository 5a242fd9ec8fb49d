//! The search-box query language and the Filter Query it produces.
//!
//! Raw text flows through [`directive::scan`], then either into
//! [`FilterQueryBuilder::apply`] or, when nothing structured was found, into
//! [`fallback::resolve_free_text`]. [`FilterQueryBuilder::build`] freezes the
//! result into a canonical [`FilterQuery`].

pub mod builder;
pub mod directive;
pub mod fallback;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::canonical_key;
use crate::model::Taxonomy;

pub use builder::FilterQueryBuilder;
pub use directive::{Combinator, Directive, Field, Scan, scan};
pub use fallback::{FreeTextMatch, resolve_free_text};

/// The six independent value slots of one taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyFilter {
    /// Exact identifiers, any one suffices.
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,
    /// Exact identifiers, every one required.
    #[serde(rename = "matchAnd", default, skip_serializing_if = "Vec::is_empty")]
    pub matches_all: Vec<String>,
    /// Substrings, any one suffices.
    #[serde(rename = "wildcard", default, skip_serializing_if = "Vec::is_empty")]
    pub wildcards: Vec<String>,
    /// Substrings, every one required.
    #[serde(rename = "wildcardAnd", default, skip_serializing_if = "Vec::is_empty")]
    pub wildcards_all: Vec<String>,
    #[serde(rename = "excludedMatch", default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_matches: Vec<String>,
    #[serde(rename = "excludedWildcard", default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_wildcards: Vec<String>,
}

impl TaxonomyFilter {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
            && self.matches_all.is_empty()
            && self.wildcards.is_empty()
            && self.wildcards_all.is_empty()
            && self.excluded_matches.is_empty()
            && self.excluded_wildcards.is_empty()
    }
}

/// Title constraint; an exact match wins over a substring when both were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleFilter {
    Match(String),
    Wildcard(String),
}

/// Numeric comparison for the page count, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

/// The single page-count constraint that survived priority resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConstraint {
    pub op: Comparison,
    pub value: u32,
}

/// Sortable archive columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    #[default]
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    Title,
    Pages,
}

impl SortField {
    const ALL: [SortField; 6] = [
        SortField::Id,
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::PublishedAt,
        SortField::Title,
        SortField::Pages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::PublishedAt => "published_at",
            SortField::Title => "title",
            SortField::Pages => "pages",
        }
    }

    /// Case-insensitive parse; anything unrecognized sorts by creation time.
    pub fn parse(name: &str) -> Self {
        Self::ALL.into_iter().find(|f| f.as_str().eq_ignore_ascii_case(name.trim())).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Case-insensitive parse; anything but `asc` is descending.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("asc") { SortOrder::Asc } else { SortOrder::Desc }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Normalized, immutable filter for one archive listing request.
///
/// Built by [`FilterQueryBuilder::build`]; every identifier set is sorted and
/// deduplicated, so semantically identical requests serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<TitleFilter>,
    #[serde(skip_serializing_if = "TaxonomyFilter::is_empty")]
    pub(crate) artists: TaxonomyFilter,
    #[serde(skip_serializing_if = "TaxonomyFilter::is_empty")]
    pub(crate) circles: TaxonomyFilter,
    #[serde(skip_serializing_if = "TaxonomyFilter::is_empty")]
    pub(crate) magazines: TaxonomyFilter,
    #[serde(skip_serializing_if = "TaxonomyFilter::is_empty")]
    pub(crate) parodies: TaxonomyFilter,
    #[serde(skip_serializing_if = "TaxonomyFilter::is_empty")]
    pub(crate) tags: TaxonomyFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pages: Option<PageConstraint>,
    pub(crate) sort: SortField,
    pub(crate) order: SortOrder,
    pub(crate) limit: u32,
    pub(crate) offset: u64,
    pub(crate) unbounded: bool,
    pub(crate) preloads: Vec<Taxonomy>,
}

impl FilterQuery {
    pub fn taxonomy(&self, taxonomy: Taxonomy) -> &TaxonomyFilter {
        match taxonomy {
            Taxonomy::Artist => &self.artists,
            Taxonomy::Circle => &self.circles,
            Taxonomy::Magazine => &self.magazines,
            Taxonomy::Parody => &self.parodies,
            Taxonomy::Tag => &self.tags,
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn title(&self) -> Option<&TitleFilter> {
        self.title.as_ref()
    }

    pub fn pages(&self) -> Option<PageConstraint> {
        self.pages
    }

    pub fn sort(&self) -> SortField {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Row limit; 0 means no limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    pub fn preloads(&self) -> &[Taxonomy] {
        &self.preloads
    }

    /// Whether any filtering slot is populated (visibility aside).
    pub fn has_filters(&self) -> bool {
        self.path.is_some()
            || self.title.is_some()
            || self.pages.is_some()
            || Taxonomy::ALL.iter().any(|t| !self.taxonomy(*t).is_empty())
    }

    /// Hex digest of the canonical serialization.
    pub fn cache_key(&self) -> Result<String, Error> {
        canonical_key(self)
    }
}
