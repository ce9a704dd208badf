//! Pagination metadata and page results.

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to every list response.
///
/// `total_pages` is `ceil(total / limit)`; an empty result set has zero
/// pages. Callers construct this through [`Pagination::new`], which
/// requires `limit >= 1` (the compiler guarantees it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pagination {
    /// 1-based page this result covers.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total matching records across all pages.
    pub total: u64,
    /// Number of pages the total spans at this limit.
    pub total_pages: u64,
}

impl Pagination {
    /// Metadata for `total` matching records viewed at `page`/`limit`.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }

    /// Zero-based row offset of this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub fn has_previous(self) -> bool {
        self.page > 1
    }
}

/// One page of rows plus the metadata describing the full result set.
///
/// When `page` points past the last page, `rows` is empty but the
/// metadata still describes the full set; out-of-range pages are not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PageResult<T> {
    /// An empty page that still carries correct metadata.
    #[must_use]
    pub fn empty(pagination: Pagination) -> Self {
        Self { rows: Vec::new(), pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(1, 3, 7).total_pages, 3);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::new(1, 10, 50).offset(), 0);
        assert_eq!(Pagination::new(3, 10, 50).offset(), 20);
        assert_eq!(Pagination::new(2, 25, 50).offset(), 25);
    }

    #[test]
    fn navigation_flags() {
        let first = Pagination::new(1, 10, 25);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next());
        assert!(last.has_previous());

        let beyond = Pagination::new(9, 10, 25);
        assert!(!beyond.has_next());
    }

    #[test]
    fn serializes_with_camel_case_total_pages() {
        let json = serde_json::to_value(Pagination::new(2, 10, 35)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 2, "limit": 10, "total": 35, "totalPages": 4})
        );
    }

    #[test]
    fn empty_page_keeps_metadata() {
        let result: PageResult<String> = PageResult::empty(Pagination::new(5, 10, 12));
        assert!(result.rows.is_empty());
        assert_eq!(result.pagination.total, 12);
        assert_eq!(result.pagination.total_pages, 2);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // rows per page sum to total: last page holds the remainder.
            #[test]
            fn page_sizes_partition_the_total(total in 0u64..10_000, limit in 1u32..=100) {
                let pages = Pagination::new(1, limit, total).total_pages;
                let mut seen = 0u64;
                for page in 1..=pages {
                    let p = Pagination::new(u32::try_from(page).unwrap(), limit, total);
                    let remaining = total - p.offset();
                    seen += remaining.min(u64::from(limit));
                }
                prop_assert_eq!(seen, total);
            }
        }
    }
}
