//! Compiled storage predicates and the query-to-predicate translation.
//!
//! [`translate`] turns a [`CanonicalQuery`] into a [`PredicateSet`]: a
//! flat AND of data-source conditions plus an optional ordering, both
//! expressed against storage column names. Nothing user-controlled
//! reaches a column name directly; every column in the output comes from
//! the resource's static [`ResourceSpec`] tables.

use serde::Serialize;

use crate::query::{CanonicalQuery, SortDirection};
use crate::spec::{FieldKind, FieldSpec, ResourceSpec};

/// One boolean condition against a record.
///
/// Conditions in a [`PredicateSet`] are combined with logical AND; the
/// set semantics (`MemberOf`, `BucketIn`, `SubstringAny`) are the OR
/// within a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// `column` equals `value`. On list-valued columns, equality means
    /// the list contains `value`.
    Eq {
        column: &'static str,
        value: String,
    },
    /// `column` is one of `values`. On list-valued columns, membership
    /// means the lists intersect.
    MemberOf {
        column: &'static str,
        values: Vec<String>,
    },
    /// Numeric `column` lies within the inclusive bounds. Either bound
    /// may be absent; both absent never occurs (the translator drops the
    /// predicate instead).
    Range {
        column: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Case-insensitive substring match of `needle` against any of
    /// `columns`.
    SubstringAny {
        columns: &'static [&'static str],
        needle: String,
    },
    /// The floor of numeric `column` is one of `levels`. Floor, not
    /// round: a 4.9 average sits in bucket 4.
    BucketIn {
        column: &'static str,
        levels: Vec<u8>,
    },
}

/// Ordering for a predicate set.
///
/// Rows comparing equal on `column` are tie-broken by record id
/// ascending, so a fixed dataset always pages identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// The compiled filter/sort program one repository read executes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredicateSet {
    pub conditions: Vec<Predicate>,
    pub order: Option<OrderBy>,
}

impl PredicateSet {
    /// Whether the set matches every record (no conditions).
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Translates a compiled query into the predicate set for `spec`.
///
/// Driven entirely by the spec's field tables, in table order, so the
/// output is deterministic for a given query: per-field conditions first,
/// then merged range bounds, then the search condition. Filter entries
/// whose key the spec does not declare produce no condition. Range bounds
/// that do not parse as finite decimals are dropped with a debug log
/// rather than failing the request.
#[must_use]
pub fn translate(query: &CanonicalQuery, spec: &ResourceSpec) -> PredicateSet {
    let mut conditions = Vec::new();
    // (column, min, max) in first-encounter order.
    let mut ranges: Vec<(&'static str, Option<f64>, Option<f64>)> = Vec::new();

    for field in spec.fields {
        let Some(value) = query.filter(field.key) else {
            continue;
        };
        match field.kind {
            FieldKind::Enumerated(_) | FieldKind::Keyword => {
                let tokens = value.to_vec();
                match tokens.len() {
                    0 => {}
                    1 => conditions.push(Predicate::Eq {
                        column: field.column,
                        value: tokens.into_iter().next().unwrap_or_default(),
                    }),
                    _ => conditions.push(Predicate::MemberOf {
                        column: field.column,
                        values: tokens,
                    }),
                }
            }
            FieldKind::Bucket(domain) => {
                let mut levels: Vec<u8> =
                    value.iter().filter_map(|token| domain.level(token)).collect();
                levels.sort_unstable();
                levels.dedup();
                if !levels.is_empty() {
                    conditions.push(Predicate::BucketIn {
                        column: field.column,
                        levels,
                    });
                }
            }
            FieldKind::RangeMin => {
                if let Some(bound) = parse_bound(field, value.iter().next()) {
                    range_slot(&mut ranges, field.column).1 = Some(bound);
                }
            }
            FieldKind::RangeMax => {
                if let Some(bound) = parse_bound(field, value.iter().next()) {
                    range_slot(&mut ranges, field.column).2 = Some(bound);
                }
            }
        }
    }

    for (column, min, max) in ranges {
        if min.is_some() || max.is_some() {
            conditions.push(Predicate::Range { column, min, max });
        }
    }

    if !query.search.is_empty() && !spec.search_columns.is_empty() {
        conditions.push(Predicate::SubstringAny {
            columns: spec.search_columns,
            needle: query.search.clone(),
        });
    }

    let order = query
        .sort_key
        .as_deref()
        .and_then(|key| spec.sortable(key))
        .map(|sortable| OrderBy {
            column: sortable.column,
            direction: query.sort_dir,
        });

    PredicateSet { conditions, order }
}

fn parse_bound(field: &FieldSpec, raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(bound) if bound.is_finite() => Some(bound),
        _ => {
            tracing::debug!(key = field.key, value = raw, "dropping unparseable range bound");
            None
        }
    }
}

fn range_slot<'a>(
    ranges: &'a mut Vec<(&'static str, Option<f64>, Option<f64>)>,
    column: &'static str,
) -> &'a mut (&'static str, Option<f64>, Option<f64>) {
    if let Some(index) = ranges.iter().position(|(c, _, _)| *c == column) {
        &mut ranges[index]
    } else {
        ranges.push((column, None, None));
        let last = ranges.len() - 1;
        &mut ranges[last]
    }
}
