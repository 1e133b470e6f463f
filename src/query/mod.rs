//! Query shaping shared by every listing endpoint: filters, sorting and
//! pagination, extraction from an HTTP query string, and rendering to SQL
//! fragments.
//!
//! The flow is always the same: the HTTP layer extracts a [`Filters`] map,
//! a [`Sorting`] and a [`Pagination`] from the request, hands them to a
//! repository, and the repository renders them against its own
//! [`sql::DatabaseFields`] mapping so only known fields ever reach the
//! database.

pub mod http;
pub mod sql;

use std::collections::BTreeMap;

use serde::Serialize;

/// Maximum limit allowed in a pagination. Anything above it (or not
/// positive) is forced back to this value.
const MAX_LIMIT: i64 = 100;

/// Pagination holds the information needed to handle a paginated request
/// and response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Offset determines from where the limit applies; it is what moves
    /// between pages.
    pub offset: i64,
    /// Limit is the maximum number of items per page.
    pub limit: i64,
    /// Total number of items the store holds for the queried resource.
    pub total_items: i64,
}

impl Pagination {
    /// Build a pagination from the provided offset and limit, clamping the
    /// limit into `[1, MAX_LIMIT]` and the offset to be non-negative.
    pub fn new(offset: i64, limit: i64) -> Self {
        let limit = if limit > MAX_LIMIT || limit <= 0 {
            MAX_LIMIT
        } else {
            limit
        };
        let offset = offset.max(0);

        Self {
            offset,
            limit,
            total_items: 0,
        }
    }

    /// Whether the current offset already covers the last page.
    pub fn last_page(&self) -> bool {
        self.offset + self.limit >= self.total_items
    }
}

/// Sorting holds the information needed to handle a sorted request.
/// Currently a query sorts by a single column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sorting {
    pub sort_by: String,
    /// True applies a descending order, otherwise ascending.
    pub descending: bool,
}

impl Sorting {
    /// `DESC` when descending, `ASC` otherwise.
    pub fn sql_direction(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}

/// From/to bounds of a range filter. Either half may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeFilter {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A single filter to apply to one field. The variant determines the kind
/// of predicate rendered against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    In(Vec<String>),
    NotIn(Vec<String>),
    Equal(String),
    NotEqual(String),
    Greater(String),
    GreaterEqual(String),
    Lower(String),
    LowerEqual(String),
    Range(RangeFilter),
    Like(String),
}

/// The filters applicable to one query, keyed by field name. A field holds
/// at most one filter. Ordered so rendering is deterministic.
pub type Filters = BTreeMap<String, Filter>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_limit_and_offset() {
        let cases = [
            // (offset, limit) -> (offset, limit)
            ((0, 10), (0, 10)),
            ((0, 0), (0, 100)),
            ((0, -5), (0, 100)),
            ((0, 101), (0, 100)),
            ((0, 100), (0, 100)),
            ((0, 1), (0, 1)),
            ((-3, 10), (0, 10)),
            ((40, 2000), (40, 100)),
        ];

        for ((offset, limit), (want_offset, want_limit)) in cases {
            let p = Pagination::new(offset, limit);
            assert_eq!(p.offset, want_offset, "offset for ({offset}, {limit})");
            assert_eq!(p.limit, want_limit, "limit for ({offset}, {limit})");
        }
    }

    #[test]
    fn last_page_compares_offset_plus_limit_to_total() {
        let mut p = Pagination::new(90, 10);
        p.total_items = 100;
        assert!(p.last_page());

        let mut p = Pagination::new(80, 10);
        p.total_items = 100;
        assert!(!p.last_page());

        let mut p = Pagination::new(0, 100);
        p.total_items = 7;
        assert!(p.last_page());
    }

    #[test]
    fn sorting_direction() {
        let asc = Sorting {
            sort_by: "name".to_string(),
            descending: false,
        };
        assert_eq!(asc.sql_direction(), "ASC");

        let desc = Sorting {
            sort_by: "name".to_string(),
            descending: true,
        };
        assert_eq!(desc.sql_direction(), "DESC");
    }
}
