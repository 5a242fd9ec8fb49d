//! Free-text fallback for queries without any directive.

use super::FilterQueryBuilder;
use crate::model::Taxonomy;
use crate::taxonomy::TaxonomyIndex;

/// Which check of the fallback produced the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeTextMatch {
    /// The whole text is a known identifier of this taxonomy.
    Taxonomy(Taxonomy),
    /// This many whitespace-separated tokens are known tags.
    Tags(usize),
    /// Nothing matched; the text became a path substring filter.
    Path,
    /// Blank input, no filter added.
    Empty,
}

/// Resolve unstructured text into a single filter on `builder`.
///
/// Checks run in order and the first one that yields anything governs:
/// artist, circle, parody, tag (whole text, then each token), path.
pub async fn resolve_free_text(text: &str, index: &TaxonomyIndex, builder: &mut FilterQueryBuilder) -> FreeTextMatch {
    let text = text.trim();
    if text.is_empty() {
        return FreeTextMatch::Empty;
    }

    for taxonomy in [Taxonomy::Artist, Taxonomy::Circle, Taxonomy::Parody, Taxonomy::Tag] {
        if index.is_valid(taxonomy, text).await {
            builder.add_match(taxonomy, text);
            return FreeTextMatch::Taxonomy(taxonomy);
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() > 1 {
        let mut found = 0;
        for token in tokens {
            if index.is_valid(Taxonomy::Tag, token).await {
                builder.add_match(Taxonomy::Tag, token);
                found += 1;
            }
        }
        if found > 0 {
            return FreeTextMatch::Tags(found);
        }
    }

    builder.path(text);
    FreeTextMatch::Path
}
