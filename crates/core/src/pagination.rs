//! Page-number window for listing navigation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of page links shown at once.
pub const WINDOW: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    /// Up to [`WINDOW`] consecutive page numbers around `current`.
    pub pages: Vec<u32>,
}

impl Pagination {
    /// Build the window for `current` out of `total_pages`.
    ///
    /// `current` is clamped into `1..=total_pages`; with no pages the window is empty.
    pub fn new(current: u32, total_pages: u32) -> Self {
        let current = current.clamp(1, total_pages.max(1));

        let (first, last) = if total_pages == 0 {
            (1, 0)
        } else if total_pages <= WINDOW {
            (1, total_pages)
        } else {
            let before = WINDOW / 2;
            let after = WINDOW.div_ceil(2) - 1;
            if current <= before {
                (1, WINDOW)
            } else if current + after >= total_pages {
                (total_pages - WINDOW + 1, total_pages)
            } else {
                (current - before, current + after)
            }
        };

        Self { current, total_pages, pages: (first..=last).collect() }
    }

    /// Window for a listing of `total` rows shown `page_size` at a time.
    pub fn from_total(current: u32, total: i64, page_size: u32) -> Self {
        let total = u64::try_from(total).unwrap_or(0);
        let pages = if page_size == 0 { 1 } else { total.div_ceil(u64::from(page_size)) };
        Self::new(current, u32::try_from(pages).unwrap_or(u32::MAX))
    }
}
