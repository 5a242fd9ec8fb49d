//! Archive and taxonomy records shared with the persistence collaborator.

use serde::{Deserialize, Serialize};

use crate::Error;

/// A classification dimension of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Artist,
    Circle,
    Magazine,
    Parody,
    Tag,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 5] =
        [Taxonomy::Artist, Taxonomy::Circle, Taxonomy::Magazine, Taxonomy::Parody, Taxonomy::Tag];

    /// Singular name, also the name of the taxonomy's table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Artist => "artist",
            Taxonomy::Circle => "circle",
            Taxonomy::Magazine => "magazine",
            Taxonomy::Parody => "parody",
            Taxonomy::Tag => "tag",
        }
    }

    /// Plural name: relation name for preloads and cache namespace for listings.
    pub fn plural(&self) -> &'static str {
        match self {
            Taxonomy::Artist => "artists",
            Taxonomy::Circle => "circles",
            Taxonomy::Magazine => "magazines",
            Taxonomy::Parody => "parodies",
            Taxonomy::Tag => "tags",
        }
    }

    pub fn table(&self) -> &'static str {
        self.as_str()
    }

    /// Join table linking archives to this taxonomy (`archive_artists`, ...).
    pub fn join_table(&self) -> &'static str {
        match self {
            Taxonomy::Artist => "archive_artists",
            Taxonomy::Circle => "archive_circles",
            Taxonomy::Magazine => "archive_magazines",
            Taxonomy::Parody => "archive_parodies",
            Taxonomy::Tag => "archive_tags",
        }
    }

    /// Foreign key column in the join table.
    pub fn foreign_key(&self) -> &'static str {
        match self {
            Taxonomy::Artist => "artist_id",
            Taxonomy::Circle => "circle_id",
            Taxonomy::Magazine => "magazine_id",
            Taxonomy::Parody => "parody_id",
            Taxonomy::Tag => "tag_id",
        }
    }

    /// Parse a singular name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Parse a relation (plural) name, case-insensitively.
    pub fn from_relation(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.plural().eq_ignore_ascii_case(name.trim()))
    }
}

/// One artist, circle, magazine, parody or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Number of visible archives, present in listings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// An archive row, with whichever relations were preloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub path: String,
    pub pages: i64,
    pub size: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<TaxonomyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub circles: Vec<TaxonomyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub magazines: Vec<TaxonomyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parodies: Vec<TaxonomyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TaxonomyEntry>,
}

impl Archive {
    pub fn relation_mut(&mut self, taxonomy: Taxonomy) -> &mut Vec<TaxonomyEntry> {
        match taxonomy {
            Taxonomy::Artist => &mut self.artists,
            Taxonomy::Circle => &mut self.circles,
            Taxonomy::Magazine => &mut self.magazines,
            Taxonomy::Parody => &mut self.parodies,
            Taxonomy::Tag => &mut self.tags,
        }
    }

    pub fn relation(&self, taxonomy: Taxonomy) -> &[TaxonomyEntry] {
        match taxonomy {
            Taxonomy::Artist => &self.artists,
            Taxonomy::Circle => &self.circles,
            Taxonomy::Magazine => &self.magazines,
            Taxonomy::Parody => &self.parodies,
            Taxonomy::Tag => &self.tags,
        }
    }
}

/// Archive listing handed to the presentation layer.
///
/// Identical whether served from cache or freshly executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchiveListing {
    pub items: Vec<Archive>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

/// Result of a single-archive lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchiveLookup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<Archive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

/// One page of a taxonomy listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxonomyListing {
    pub items: Vec<TaxonomyEntry>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}
