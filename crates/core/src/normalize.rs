//! Identifier normalization.
//!
//! Display names ("Zero Gravity", "ZERO  GRAVITY", "zero_gravity") fold into
//! one slug identifier ("zero-gravity"). Every equality filter and every
//! cache key depends on this folding being stable.

use std::collections::HashMap;

use parking_lot::RwLock;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fixed symbol substitutions applied after lower-casing.
const SUBSTITUTIONS: &[(char, &str)] =
    &[('❤', ""), ('♥', ""), ('☆', "-"), ('★', "-"), ('&', ""), ('♀', "bjb"), ('_', "-")];

/// Turn free text into a URL-safe slug identifier.
///
/// Pure and idempotent: `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut substituted = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => substituted.push_str(to),
            None => substituted.push(c),
        }
    }

    let mut slug = String::with_capacity(substituted.len());
    let mut pending_separator = false;
    for c in substituted.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Memoizing front-end for [`slugify`].
///
/// The memo is keyed by the lower-cased raw input and only ever grows.
/// Readers never block each other; a miss takes the write lock once.
#[derive(Debug, Default)]
pub struct Normalizer {
    memo: RwLock<HashMap<String, String>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `text` into its identifier form.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let key = text.to_lowercase();
        if let Some(hit) = self.memo.read().get(&key) {
            return hit.clone();
        }

        let slug = slugify(&key);
        self.memo.write().entry(key).or_insert_with(|| slug.clone());
        slug
    }

    /// Normalize every value, dropping the ones that fold to nothing.
    pub fn normalize_all<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        values.into_iter().map(|v| self.normalize(v)).filter(|v| !v.is_empty()).collect()
    }

    /// Number of memoized inputs.
    pub fn memoized(&self) -> usize {
        self.memo.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_spacing_fold_together() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("Zero Gravity"), "zero-gravity");
        assert_eq!(n.normalize("zero-gravity"), "zero-gravity");
        assert_eq!(n.normalize("ZERO  GRAVITY"), "zero-gravity");
        assert_eq!(n.normalize("zero_gravity"), "zero-gravity");
    }

    #[test]
    fn test_diacritics_are_folded() {
        assert_eq!(slugify("Café Olé"), "cafe-ole");
        assert_eq!(slugify("Pokémon"), slugify("pokemon"));
    }

    #[test]
    fn test_substitution_table() {
        assert_eq!(slugify("Love❤Live"), "lovelive");
        assert_eq!(slugify("Star☆Girl"), "star-girl");
        assert_eq!(slugify("Cats & Dogs"), "cats-dogs");
        assert_eq!(slugify("♀ Nurse"), "bjb-nurse");
        assert_eq!(slugify("big_breasts"), "big-breasts");
    }

    #[test]
    fn test_trims_and_collapses_separators() {
        assert_eq!(slugify("  --Hello,,  World!!  "), "hello-world");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_non_latin_letters_survive() {
        assert_eq!(slugify("東方 Project"), "東方-project");
    }

    #[test]
    fn test_idempotent() {
        for input in ["Zero Gravity", "Café ☆ Olé", "A&B_c", "東方 Project", "  x  ", "♀♀"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_memo_does_not_change_results() {
        let n = Normalizer::new();
        let first = n.normalize("Hello World");
        let second = n.normalize("HELLO WORLD");
        assert_eq!(first, second);
        assert_eq!(n.memoized(), 1);
        assert_eq!(first, slugify("Hello World"));
    }

    #[test]
    fn test_normalize_all_drops_empty() {
        let n = Normalizer::new();
        let values = n.normalize_all(["Foo", "!!", "", "Bar Baz"]);
        assert_eq!(values, vec!["foo".to_string(), "bar-baz".to_string()]);
    }
}
