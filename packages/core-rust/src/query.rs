//! Canonical query model and its query-string wire codec.
//!
//! [`CanonicalQuery`] is the single normalized request shape passed between
//! client and server: bounded pagination, free-text search, alias-resolved
//! filters, and an allow-listed sort. It serializes to a flat query string
//! and back losslessly, which makes the encoded form double as the fetch
//! cache key.
//!
//! # Wire format
//!
//! Reserved keys are `page`, `limit`, `search`, `orderBy`, `orderDir`;
//! every other key is a resource-specific filter. Multi-value filters are
//! accepted in both forms on decode (`region=skp,btn` and
//! `region=skp&region=btn`) and always encoded comma-joined. Encoding
//! order is deterministic: reserved keys first, then filters sorted by
//! key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved query key: 1-based page number.
pub const PAGE_KEY: &str = "page";
/// Reserved query key: page size.
pub const LIMIT_KEY: &str = "limit";
/// Reserved query key: free-text search term.
pub const SEARCH_KEY: &str = "search";
/// Reserved query key: logical sort field.
pub const ORDER_BY_KEY: &str = "orderBy";
/// Reserved query key: sort direction.
pub const ORDER_DIR_KEY: &str = "orderDir";

/// All reserved keys; anything else in a raw query is a filter.
pub const RESERVED_KEYS: [&str; 5] = [PAGE_KEY, LIMIT_KEY, SEARCH_KEY, ORDER_BY_KEY, ORDER_DIR_KEY];

/// Default page when the raw input carries none.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the raw input carries none.
pub const DEFAULT_LIMIT: u32 = 10;
/// Hard upper bound on page size; larger requests fail validation.
pub const MAX_LIMIT: u32 = 100;

/// Whether `key` is one of the reserved pagination/search/sort keys.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

// ---------------------------------------------------------------------------
// Sort direction
// ---------------------------------------------------------------------------

/// Sort direction for query ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire token for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Parses a wire token, tolerating case. `None` for anything else.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter values
// ---------------------------------------------------------------------------

/// Value of one filter entry: a single token or a set of tokens.
///
/// Semantically always a set -- `One` is just the set of one, kept distinct
/// so equality filters stay distinguishable from membership filters when
/// translated to predicates. [`FilterValue::toggled`] therefore never
/// special-cases scalars: toggling a second value onto a `One` yields a
/// two-element `Many`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Builds a filter value from a token list.
    ///
    /// Empty -> `None` (no filter), one token -> `One`, otherwise `Many`.
    #[must_use]
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => Some(Self::One(values.remove(0))),
            _ => Some(Self::Many(values)),
        }
    }

    /// Iterates the contained tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
        .map(String::as_str)
    }

    /// The tokens as an owned list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// Whether the value holds no tokens (only possible for an empty `Many`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `token` is among the contained tokens.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.iter().any(|t| t == token)
    }

    /// Set-toggle of `token`: removes it when present, appends it when
    /// absent. Returns `None` when the result is empty (filter cleared).
    ///
    /// Applied twice, this returns the filter to its original token set.
    #[must_use]
    pub fn toggled(&self, token: &str) -> Option<Self> {
        let mut values = self.to_vec();
        if let Some(pos) = values.iter().position(|t| t == token) {
            values.remove(pos);
        } else {
            values.push(token.to_string());
        }
        Self::from_values(values)
    }
}

// ---------------------------------------------------------------------------
// Canonical query
// ---------------------------------------------------------------------------

/// The normalized request shape: the single source of truth for one
/// list-view fetch.
///
/// Constructed fresh on every interaction by
/// [`ResourceSpec::compile`](crate::spec::ResourceSpec::compile); filter
/// tokens are already alias-resolved to canonical domain values. `filters`
/// uses a `BTreeMap` so encoding order (and thus the cache key) is
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size, `1..=MAX_LIMIT`.
    pub limit: u32,
    /// Free-text search term; empty means no search.
    pub search: String,
    /// Filter entries keyed by wire key. Unknown raw keys survive here as
    /// opaque entries so the wire round-trip stays lossless.
    pub filters: BTreeMap<String, FilterValue>,
    /// Logical sort key from the resource's allow-list.
    pub sort_key: Option<String>,
    /// Sort direction; meaningful only when `sort_key` is set.
    pub sort_dir: SortDirection,
}

impl Default for CanonicalQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            filters: BTreeMap::new(),
            sort_key: None,
            sort_dir: SortDirection::Asc,
        }
    }
}

impl CanonicalQuery {
    /// The filter entry for `key`, if set.
    #[must_use]
    pub fn filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    /// Sets or clears the filter entry for `key` (`None` clears).
    pub fn set_filter(&mut self, key: &str, value: Option<FilterValue>) {
        match value {
            Some(value) if !value.is_empty() => {
                self.filters.insert(key.to_string(), value);
            }
            _ => {
                self.filters.remove(key);
            }
        }
    }

    /// Serializes to flat `(key, value)` pairs in deterministic order:
    /// reserved keys first (`page`, `limit`, `search?`, `orderBy?`,
    /// `orderDir?`), then filters sorted by key with multi-values
    /// comma-joined. `search` is omitted when empty; `orderBy`/`orderDir`
    /// are omitted when no sort key is set.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(5 + self.filters.len());
        pairs.push((PAGE_KEY.to_string(), self.page.to_string()));
        pairs.push((LIMIT_KEY.to_string(), self.limit.to_string()));
        if !self.search.is_empty() {
            pairs.push((SEARCH_KEY.to_string(), self.search.clone()));
        }
        if let Some(sort_key) = &self.sort_key {
            pairs.push((ORDER_BY_KEY.to_string(), sort_key.clone()));
            pairs.push((ORDER_DIR_KEY.to_string(), self.sort_dir.as_str().to_string()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.to_vec().join(",")));
        }
        pairs
    }

    /// Serializes to a percent-encoded query string (no leading `?`).
    ///
    /// Deterministic for a given query, so the result doubles as a fetch
    /// cache key.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }
}

// ---------------------------------------------------------------------------
// Raw query input
// ---------------------------------------------------------------------------

/// Loosely-typed query input: an ordered string multimap, as decoded from
/// a URL query string or assembled from form state.
///
/// Repeated keys accumulate values in arrival order; comma-splitting of
/// individual values is left to the compiler/normalizer so both wire
/// forms behave identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery {
    pairs: Vec<(String, Vec<String>)>,
}

impl RawQuery {
    /// Empty input (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from `(key, value)` pairs, merging repeated keys.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw = Self::new();
        for (key, value) in pairs {
            raw.append(key, value);
        }
        raw
    }

    /// Decodes a percent-encoded query string (leading `?` tolerated).
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned())),
        )
    }

    /// Appends one value under `key`, preserving arrival order.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some((_, values)) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            values.push(value);
        } else {
            self.pairs.push((key, vec![value]));
        }
    }

    /// All values collected for `key`.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value for `key`, if any.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values(key).and_then(|values| {
            values.first().map(String::as_str)
        })
    }

    /// First value for `key`, or a field-level [`ValidationError`] when the
    /// key is absent or blank. Used by single-item contexts that require an
    /// identity parameter.
    pub fn require(&self, key: &str) -> Result<&str, ValidationError> {
        match self.first(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ValidationError::missing(key)),
        }
    }

    /// Iterates `(key, values)` entries in first-arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.pairs
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Whether no pairs were provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
