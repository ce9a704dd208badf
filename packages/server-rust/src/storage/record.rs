//! Column-addressable record model.
//!
//! The predicate evaluator never sees concrete row structs. Each catalog
//! row implements [`Record`], exposing its columns as [`FieldValue`]s
//! under the column names the resource specs reference. Computed columns
//! (such as a cafe's price rank) live here too, so sorting by them needs
//! no storage support.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

/// One column value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    StrList(Vec<String>),
}

impl FieldValue {
    /// Numeric view, for range and bucket predicates.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Text view, for substring search.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this value equals the filter token `token`.
    ///
    /// Strings compare exactly, lists by containment, numbers and bools by
    /// parsing the token. A token that does not parse never matches.
    #[must_use]
    pub fn matches_token(&self, token: &str) -> bool {
        match self {
            Self::Str(value) => value == token,
            Self::StrList(values) => values.iter().any(|v| v == token),
            Self::Int(value) => token.parse::<i64>() == Ok(*value),
            Self::Float(value) => token.parse::<f64>().is_ok_and(|t| t == *value),
            Self::Bool(value) => token.parse::<bool>() == Ok(*value),
        }
    }

    /// Total order across values of the same column.
    ///
    /// Numeric variants compare numerically across `Int`/`Float` (via
    /// `OrderedFloat`); otherwise same-variant values compare naturally
    /// and mixed variants fall back to a fixed variant order so sorting
    /// stays total.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::StrList(a), Self::StrList(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)),
                _ => variant_rank(a).cmp(&variant_rank(b)),
            },
        }
    }
}

fn variant_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Bool(_) => 0,
        FieldValue::Int(_) | FieldValue::Float(_) => 1,
        FieldValue::Str(_) => 2,
        FieldValue::StrList(_) => 3,
    }
}

/// A storable catalog row addressable by column name.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable unique id; also the deterministic sort tie-break.
    fn id(&self) -> &str;

    /// The value of `column`, or `None` when the record has no such
    /// column.
    fn field(&self, column: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_matching_per_variant() {
        assert!(FieldValue::Str("sukapura".into()).matches_token("sukapura"));
        assert!(!FieldValue::Str("sukapura".into()).matches_token("Sukapura"));
        assert!(FieldValue::StrList(vec!["wifi".into(), "mushola".into()]).matches_token("wifi"));
        assert!(FieldValue::Int(4).matches_token("4"));
        assert!(!FieldValue::Int(4).matches_token("4.0"));
        assert!(FieldValue::Float(4.5).matches_token("4.5"));
        assert!(!FieldValue::Float(4.5).matches_token("four-and-a-half"));
    }

    #[test]
    fn numeric_comparison_crosses_int_and_float() {
        assert_eq!(FieldValue::Int(4).compare(&FieldValue::Float(4.5)), Ordering::Less);
        assert_eq!(FieldValue::Float(5.0).compare(&FieldValue::Int(5)), Ordering::Equal);
    }

    #[test]
    fn string_comparison_is_lexical() {
        let a = FieldValue::Str("Jurnal Risa".into());
        let b = FieldValue::Str("Kopi Nako".into());
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
