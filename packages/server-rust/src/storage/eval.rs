//! Predicate evaluation and ordering over records.
//!
//! This is the in-memory execution of a `PredicateSet`: conditions
//! AND-combine, membership is OR within a field, and ordering always
//! tie-breaks on record id ascending so a fixed dataset pages
//! identically across requests regardless of sort direction.

use std::cmp::Ordering;

use ngopi_core::{OrderBy, Predicate, SortDirection};

use crate::storage::record::Record;

/// Whether `record` satisfies every condition.
pub fn matches<R: Record>(record: &R, conditions: &[Predicate]) -> bool {
    conditions.iter().all(|p| matches_one(record, p))
}

fn matches_one<R: Record>(record: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq { column, value } => record
            .field(column)
            .is_some_and(|field| field.matches_token(value)),
        Predicate::MemberOf { column, values } => record
            .field(column)
            .is_some_and(|field| values.iter().any(|v| field.matches_token(v))),
        Predicate::Range { column, min, max } => record
            .field(column)
            .and_then(|field| field.as_f64())
            .is_some_and(|value| {
                min.is_none_or(|bound| value >= bound) && max.is_none_or(|bound| value <= bound)
            }),
        Predicate::SubstringAny { columns, needle } => {
            let needle = needle.to_lowercase();
            columns.iter().any(|column| {
                record
                    .field(column)
                    .and_then(|field| field.as_text().map(str::to_lowercase))
                    .is_some_and(|text| text.contains(&needle))
            })
        }
        Predicate::BucketIn { column, levels } => record
            .field(column)
            .and_then(|field| field.as_f64())
            .and_then(bucket_of)
            .is_some_and(|bucket| levels.contains(&bucket)),
    }
}

/// Floor bucket of a rating-like value. Floor, not round: 4.9 -> 4.
fn bucket_of(value: f64) -> Option<u8> {
    if value.is_finite() && (0.0..=f64::from(u8::MAX)).contains(&value) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(value.floor() as u8)
    } else {
        None
    }
}

/// Total order of two records under `order`.
///
/// A record missing the sort column sorts before one that has it (before
/// the direction flip). Equal keys fall back to id ascending, never
/// flipped by direction.
pub fn compare<R: Record>(a: &R, b: &R, order: Option<&OrderBy>) -> Ordering {
    let primary = order.map_or(Ordering::Equal, |order| {
        let by_column = match (a.field(order.column), b.field(order.column)) {
            (Some(left), Some(right)) => left.compare(&right),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        match order.direction {
            SortDirection::Asc => by_column,
            SortDirection::Desc => by_column.reverse(),
        }
    });
    primary.then_with(|| a.id().cmp(b.id()))
}

/// Sorts records in place under `order` (id ascending when `None`).
pub fn sort<R: Record>(rows: &mut [R], order: Option<&OrderBy>) {
    rows.sort_by(|a, b| compare(a, b, order));
}
