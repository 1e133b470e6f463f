//! Extraction of query options from an HTTP query string.
//!
//! The reserved parameters `limit`, `offset`, `sort_by` and `descending`
//! shape pagination and sorting; every other parameter becomes a filter,
//! with the operator encoded in the parameter name:
//!
//! - `foo[]`      -> IN (one value per occurrence)
//! - `foo_from`   -> RANGE lower bound (merged with an existing `foo_to`)
//! - `foo_to`     -> RANGE upper bound (merged with an existing `foo_from`)
//! - `foo_not`    -> NOT EQUAL
//! - `foo_like`   -> LIKE
//! - `foo`        -> EQUAL
//!
//! The suffix is stripped from the field name stored in the filters map.

use url::form_urlencoded;

use crate::error::{AppError, AppResult};

use super::{Filter, Filters, Pagination, RangeFilter, Sorting};

const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";
const SORT_BY_PARAM: &str = "sort_by";
const DESCENDING_PARAM: &str = "descending";

/// Retrieve limit and offset from the query string. Fails when either is
/// present but not an integer.
pub fn pagination_from_query(query: &str) -> AppResult<Pagination> {
    let mut limit: i64 = 0;
    let mut offset: i64 = 0;

    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            LIMIT_PARAM => {
                limit = value.parse().map_err(|_| {
                    AppError::Validation("error parsing limit query parameter".to_string())
                })?;
            }
            OFFSET_PARAM => {
                offset = value.parse().map_err(|_| {
                    AppError::Validation("error parsing offset query parameter".to_string())
                })?;
            }
            _ => {}
        }
    }

    Ok(Pagination::new(offset, limit))
}

/// Retrieve the sort field and direction from the query string. Descending
/// order applies only when the parameter is literally `"true"`.
pub fn sorting_from_query(query: &str) -> Sorting {
    let mut sorting = Sorting::default();

    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            SORT_BY_PARAM => sorting.sort_by = value.into_owned(),
            DESCENDING_PARAM => sorting.descending = value == "true",
            _ => {}
        }
    }

    sorting
}

/// Build the filters map out of every non-reserved query parameter.
pub fn filters_from_query(query: &str) -> Filters {
    let mut filters = Filters::new();

    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        if is_reserved(&name) {
            continue;
        }

        let field = clean_up_field(&name);
        let filter = filter_from_param(&name, value.into_owned(), filters.remove(&field));
        filters.insert(field, filter);
    }

    filters
}

fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        LIMIT_PARAM | OFFSET_PARAM | SORT_BY_PARAM | DESCENDING_PARAM
    )
}

/// Transform one query parameter into a [`Filter`], merging with whatever
/// filter the field already accumulated (repeated `[]` occurrences, the
/// two halves of a range).
fn filter_from_param(name: &str, value: String, existing: Option<Filter>) -> Filter {
    if name.ends_with("[]") {
        let mut values = match existing {
            Some(Filter::In(values)) => values,
            _ => Vec::new(),
        };
        values.push(value);
        return Filter::In(values);
    }

    if name.ends_with("_from") {
        let to = match existing {
            Some(Filter::Range(range)) => range.to,
            _ => None,
        };
        return Filter::Range(RangeFilter {
            from: Some(value),
            to,
        });
    }

    if name.ends_with("_to") {
        let from = match existing {
            Some(Filter::Range(range)) => range.from,
            _ => None,
        };
        return Filter::Range(RangeFilter {
            from,
            to: Some(value),
        });
    }

    if name.ends_with("_not") {
        return Filter::NotEqual(value);
    }

    if name.ends_with("_like") {
        return Filter::Like(value);
    }

    Filter::Equal(value)
}

/// Strip the operator suffixes (`[]`, `_from`, `_to`, `_like`, `_not`)
/// from a query parameter name.
fn clean_up_field(field: &str) -> String {
    for suffix in ["[]", "_from", "_to", "_like", "_not"] {
        if let Some(stripped) = field.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    field.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_parses_limit_and_offset() {
        let p = pagination_from_query("limit=25&offset=50").unwrap();
        assert_eq!(p.limit, 25);
        assert_eq!(p.offset, 50);
    }

    #[test]
    fn pagination_defaults_when_params_absent() {
        let p = pagination_from_query("category=BOOK").unwrap();
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn pagination_rejects_non_integers() {
        let err = pagination_from_query("limit=ten").unwrap_err();
        assert_eq!(err.to_string(), "error parsing limit query parameter");

        let err = pagination_from_query("limit=10&offset=x").unwrap_err();
        assert_eq!(err.to_string(), "error parsing offset query parameter");
    }

    #[test]
    fn sorting_reads_field_and_direction() {
        let s = sorting_from_query("sort_by=created_at&descending=true");
        assert_eq!(s.sort_by, "created_at");
        assert!(s.descending);

        // Anything but the literal "true" keeps ascending order.
        let s = sorting_from_query("sort_by=created_at&descending=TRUE");
        assert!(!s.descending);

        let s = sorting_from_query("");
        assert_eq!(s.sort_by, "");
        assert!(!s.descending);
    }

    #[test]
    fn filters_skip_reserved_parameters() {
        let f = filters_from_query("limit=10&offset=0&sort_by=name&descending=true&status=ACTIVE");
        assert_eq!(f.len(), 1);
        assert_eq!(f.get("status"), Some(&Filter::Equal("ACTIVE".to_string())));
    }

    #[test]
    fn filters_map_suffixes_to_operators() {
        let f = filters_from_query("name=John&status_not=SUSPENDED&title_like=1984");
        assert_eq!(f.get("name"), Some(&Filter::Equal("John".to_string())));
        assert_eq!(
            f.get("status"),
            Some(&Filter::NotEqual("SUSPENDED".to_string()))
        );
        assert_eq!(f.get("title"), Some(&Filter::Like("1984".to_string())));
    }

    #[test]
    fn repeated_bracket_params_accumulate_into_in() {
        let f = filters_from_query("category[]=BOOK&category[]=DVD&category[]=CD");
        assert_eq!(
            f.get("category"),
            Some(&Filter::In(vec![
                "BOOK".to_string(),
                "DVD".to_string(),
                "CD".to_string()
            ]))
        );
    }

    #[test]
    fn range_halves_merge_in_either_order() {
        let expected = Filter::Range(RangeFilter {
            from: Some("2020-01-01".to_string()),
            to: Some("2020-12-31".to_string()),
        });

        let f = filters_from_query("created_at_from=2020-01-01&created_at_to=2020-12-31");
        assert_eq!(f.get("created_at"), Some(&expected));

        let f = filters_from_query("created_at_to=2020-12-31&created_at_from=2020-01-01");
        assert_eq!(f.get("created_at"), Some(&expected));
    }

    #[test]
    fn half_open_ranges_keep_one_bound() {
        let f = filters_from_query("due_at_from=2025-06-01");
        assert_eq!(
            f.get("due_at"),
            Some(&Filter::Range(RangeFilter {
                from: Some("2025-06-01".to_string()),
                to: None,
            }))
        );
    }
}
