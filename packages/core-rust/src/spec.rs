//! Declarative per-resource query specifications.
//!
//! A [`ResourceSpec`] is a static description of everything the query
//! pipeline needs to know about one list endpoint: which wire keys are
//! filters and how their tokens are interpreted, which columns free-text
//! search scans, and which sort keys are allowed. Compilation
//! ([`ResourceSpec::compile`]) and predicate translation
//! ([`translate`](crate::predicate::translate)) are both driven entirely
//! by these tables, so adding a filter to a resource is a one-line table
//! edit.

use crate::domain::DomainField;
use crate::query::SortDirection;

/// Interpretation of one filter field's tokens.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Tokens resolve through the domain field's alias table; unresolved
    /// tokens are dropped. Matches the target column by equality, or set
    /// membership when several tokens survive.
    Enumerated(&'static DomainField),
    /// Free-form identity token (an id or slug) matched exactly. No alias
    /// resolution; tokens are only trimmed and de-duplicated.
    Keyword,
    /// Inclusive lower bound on a numeric column. Takes a single decimal
    /// value; unparseable input drops the bound rather than failing.
    RangeMin,
    /// Inclusive upper bound on a numeric column, same tolerance as
    /// [`FieldKind::RangeMin`].
    RangeMax,
    /// Tokens resolve through the domain field, then match the numeric
    /// column by integer floor bucket (a 4.9 average sits in bucket 4).
    Bucket(&'static DomainField),
}

/// One filterable field of a resource.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire key the filter arrives under.
    pub key: &'static str,
    /// Record column the resulting predicate targets.
    pub column: &'static str,
    /// How tokens under this key are interpreted.
    pub kind: FieldKind,
}

/// One allow-listed sort key of a resource.
#[derive(Debug, Clone, Copy)]
pub struct SortableField {
    /// Wire token accepted in `orderBy`.
    pub key: &'static str,
    /// Record column the ordering compares.
    pub column: &'static str,
}

/// Static query contract of one list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// Resource name, used in logs and error messages.
    pub name: &'static str,
    /// URL path of the list endpoint, e.g. `/api/cafes`.
    pub endpoint: &'static str,
    /// Filterable fields, in wire-key order.
    pub fields: &'static [FieldSpec],
    /// Allow-listed sort keys. `orderBy` values outside this list fail
    /// validation.
    pub sortable: &'static [SortableField],
    /// Columns scanned by the free-text `search` term.
    pub search_columns: &'static [&'static str],
    /// Sort applied when the query carries no `orderBy`.
    pub default_sort: Option<(&'static str, SortDirection)>,
}

impl ResourceSpec {
    /// The filter spec registered under wire key `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// The sortable field registered under `orderBy` token `key`.
    #[must_use]
    pub fn sortable(&self, key: &str) -> Option<&'static SortableField> {
        self.sortable.iter().find(|s| s.key == key)
    }

    /// All accepted `orderBy` tokens, for allow-list error messages.
    #[must_use]
    pub fn sort_keys(&self) -> Vec<&'static str> {
        self.sortable.iter().map(|s| s.key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::REGION;

    static SPEC: ResourceSpec = ResourceSpec {
        name: "test",
        endpoint: "/api/test",
        fields: &[FieldSpec {
            key: "region",
            column: "region",
            kind: FieldKind::Enumerated(&REGION),
        }],
        sortable: &[
            SortableField { key: "name", column: "name" },
            SortableField { key: "createdAt", column: "created_at" },
        ],
        search_columns: &["name"],
        default_sort: Some(("name", SortDirection::Asc)),
    };

    #[test]
    fn field_lookup_by_wire_key() {
        assert!(SPEC.field("region").is_some());
        assert!(SPEC.field("price").is_none());
    }

    #[test]
    fn sortable_lookup_maps_to_column() {
        assert_eq!(SPEC.sortable("createdAt").unwrap().column, "created_at");
        assert!(SPEC.sortable("rating").is_none());
    }

    #[test]
    fn sort_keys_lists_wire_tokens() {
        assert_eq!(SPEC.sort_keys(), vec!["name", "createdAt"]);
    }
}
