//! Rendering of query options into SQL fragments.
//!
//! Fragments keep the textual shape a reader expects (`LIMIT … OFFSET …`,
//! `ORDER BY col DIR`, `AND`-joined predicates) but every runtime value is
//! replaced by a `$n` placeholder and returned alongside the fragment so
//! the caller binds it through the driver.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{Filter, Filters, Pagination, Sorting};

/// Translation from public field names to the database column expression
/// to use for them. Needed especially when joining tables, for example
/// `{"company_name": "company.name"}` lets callers filter and sort by
/// `company_name` while the query addresses the joined alias. Fields not
/// present in the mapping are skipped silently.
#[derive(Debug, Clone, Default)]
pub struct DatabaseFields(BTreeMap<String, String>);

impl DatabaseFields {
    pub fn new<const N: usize>(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(field, column)| (field.to_string(), column.to_string()))
                .collect(),
        )
    }

    fn column(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

/// A rendered WHERE fragment plus the parameters to bind, in placeholder
/// order starting at `$1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<String>,
}

impl SqlFilter {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Render the pagination as a `LIMIT … OFFSET …` fragment, or an empty
/// string when no pagination applies. Both values are clamped integers so
/// they are written directly.
pub fn sql_paginate_by(pagination: Option<&Pagination>) -> String {
    match pagination {
        Some(p) => format!("LIMIT {} OFFSET {}", p.limit, p.offset),
        None => String::new(),
    }
}

/// Render the sorts as an `ORDER BY` fragment. Sort fields missing from
/// the database fields mapping are skipped; an empty string is returned
/// when nothing remains.
pub fn sql_sort_by(sorts: &[Sorting], db_fields: &DatabaseFields) -> String {
    let mut q = String::new();
    for sort in sorts {
        let Some(column) = db_fields.column(&sort.sort_by) else {
            continue;
        };
        if q.is_empty() {
            let _ = write!(q, "ORDER BY {} {}", column, sort.sql_direction());
        } else {
            let _ = write!(q, ", {} {}", column, sort.sql_direction());
        }
    }
    q
}

/// Render the filters as an `AND`-joined predicate fragment with `$n`
/// placeholders, collecting the bound values. Filter fields missing from
/// the database fields mapping are skipped.
pub fn sql_filter_by(filters: &Filters, db_fields: &DatabaseFields) -> SqlFilter {
    let mut rendered = SqlFilter::default();

    for (field, filter) in filters {
        let Some(column) = db_fields.column(field) else {
            continue;
        };

        let predicate = filter_predicate(filter, column, &mut rendered.params);
        if predicate.is_empty() {
            continue;
        }

        if rendered.clause.is_empty() {
            rendered.clause = predicate;
        } else {
            rendered.clause = format!("{} AND {}", rendered.clause, predicate);
        }
    }

    rendered
}

/// Render one predicate, pushing its values onto `params`. Placeholder
/// numbers continue from whatever the params vector already holds.
fn filter_predicate(filter: &Filter, column: &str, params: &mut Vec<String>) -> String {
    let mut bind = |value: String| {
        params.push(value);
        format!("${}", params.len())
    };

    match filter {
        Filter::Equal(v) => format!("{} = {}", column, bind(v.clone())),
        Filter::NotEqual(v) => format!("{} <> {}", column, bind(v.clone())),
        Filter::Greater(v) => format!("{} > {}", column, bind(v.clone())),
        Filter::GreaterEqual(v) => format!("{} >= {}", column, bind(v.clone())),
        Filter::Lower(v) => format!("{} < {}", column, bind(v.clone())),
        Filter::LowerEqual(v) => format!("{} <= {}", column, bind(v.clone())),
        Filter::In(values) | Filter::NotIn(values) => {
            if values.is_empty() {
                return String::new();
            }
            let placeholders: Vec<String> =
                values.iter().map(|v| bind(v.clone())).collect();
            let keyword = if matches!(filter, Filter::In(_)) {
                "IN"
            } else {
                "NOT IN"
            };
            format!("{} {} ({})", column, keyword, placeholders.join(","))
        }
        Filter::Range(range) => {
            let mut q = String::new();
            if let Some(from) = &range.from {
                q = format!("{} >= {}", column, bind(from.clone()));
            }
            if let Some(to) = &range.to {
                let upper = format!("{} <= {}", column, bind(to.clone()));
                if q.is_empty() {
                    q = upper;
                } else {
                    q = format!("{} AND {}", q, upper);
                }
            }
            q
        }
        Filter::Like(v) => format!("{} LIKE {}", column, bind(format!("%{}%", v))),
    }
}
