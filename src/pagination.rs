//! Bounded pages over an ordered collection.
//!
//! Page numbers are 1-based and forgiving: anything that is not a
//! positive integer counts as page 1, and a number past the end is
//! clamped to the last page. An empty collection still has one
//! (empty) page so every listing URL renders.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Knows how a collection of `total` items splits into pages of
/// `per_page` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: u64,
    per_page: NonZeroU32,
}

impl Paginator {
    #[must_use]
    pub const fn new(total: u64, per_page: NonZeroU32) -> Self {
        Self { total, per_page }
    }

    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        let per_page = self.per_page.get() as u64;
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(per_page)
        }
    }

    /// Returns the requested page, clamped into the valid
    /// `1..=num_pages` range.
    #[must_use]
    pub fn page(&self, requested: u64) -> Page {
        let number = requested.clamp(1, self.num_pages());
        Page {
            number,
            per_page: self.per_page.get() as u64,
            total: self.total,
            num_pages: self.num_pages(),
        }
    }
}

/// One slice of a paginated collection, with enough metadata to
/// render pager controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: u64,
    pub per_page: u64,
    pub total: u64,
    pub num_pages: u64,
}

impl Page {
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page as i64
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        ((self.number - 1) * self.per_page) as i64
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

/// A page of rows together with its metadata, ready to be handed
/// to a template as `page_obj`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: Page,
}

/// The `?page=` query parameter of every listing route.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Lenient parse: a missing, malformed or non-positive value
    /// falls back to the first page.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn per_page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn splits_thirteen_posts_into_ten_and_three() {
        let paginator = Paginator::new(13, per_page(10));
        assert_eq!(paginator.num_pages(), 2);

        let first = paginator.page(1);
        assert_eq!(first.limit(), 10);
        assert_eq!(first.offset(), 0);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let second = paginator.page(2);
        assert_eq!(second.offset(), 10);
        assert!(!second.has_next());
        assert!(second.has_previous());
    }

    #[test]
    fn clamps_out_of_range_pages() {
        let paginator = Paginator::new(13, per_page(10));
        assert_eq!(paginator.page(0).number, 1);
        assert_eq!(paginator.page(99).number, 2);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let paginator = Paginator::new(0, per_page(10));
        assert_eq!(paginator.num_pages(), 1);

        let page = paginator.page(7);
        assert_eq!(page.number, 1);
        assert_eq!(page.offset(), 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn exact_multiple_has_no_trailer_page() {
        let paginator = Paginator::new(20, per_page(10));
        assert_eq!(paginator.num_pages(), 2);
    }

    #[test]
    fn page_query_is_lenient() {
        let requested = |raw: Option<&str>| PageQuery {
            page: raw.map(str::to_string),
        }
        .requested();

        assert_eq!(requested(None), 1);
        assert_eq!(requested(Some("2")), 2);
        assert_eq!(requested(Some(" 3 ")), 3);
        assert_eq!(requested(Some("0")), 1);
        assert_eq!(requested(Some("-1")), 1);
        assert_eq!(requested(Some("two")), 1);
        assert_eq!(requested(Some("")), 1);
    }
}
