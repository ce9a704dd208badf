//! Raw query input -> [`CanonicalQuery`] compilation.
//!
//! Compilation is strict about the reserved keys (`page`, `limit`,
//! `orderBy`, `orderDir`) and deliberately permissive about filter
//! content: malformed filter tokens degrade to "no constraint" via the
//! alias normalizer instead of failing the request. Pure, no side
//! effects, safe to run on both client and server.

use crate::alias;
use crate::error::ValidationError;
use crate::query::{
    CanonicalQuery, FilterValue, RawQuery, SortDirection, LIMIT_KEY, MAX_LIMIT, ORDER_BY_KEY,
    ORDER_DIR_KEY, PAGE_KEY, SEARCH_KEY,
};
use crate::query::{is_reserved_key, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::spec::{FieldKind, ResourceSpec};

impl ResourceSpec {
    /// Compiles loosely-typed query input into a validated
    /// [`CanonicalQuery`] for this resource.
    ///
    /// Fails only on the reserved keys: a non-positive or unparseable
    /// `page`/`limit`, a `limit` above [`MAX_LIMIT`], an `orderBy` outside
    /// the resource's allow-list, or an `orderDir` that is neither `asc`
    /// nor `desc`. Filter fields never fail; unknown tokens are dropped
    /// and fully-unknown filters compile to no constraint.
    pub fn compile(&self, raw: &RawQuery) -> Result<CanonicalQuery, ValidationError> {
        let page = parse_positive(raw, PAGE_KEY, DEFAULT_PAGE)?;
        let limit = parse_positive(raw, LIMIT_KEY, DEFAULT_LIMIT)?;
        if limit > MAX_LIMIT {
            return Err(ValidationError::out_of_range(
                LIMIT_KEY,
                &limit.to_string(),
                1,
                MAX_LIMIT,
            ));
        }

        let search = raw
            .first(SEARCH_KEY)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let (sort_key, sort_dir) = self.compile_sort(raw)?;

        let mut query = CanonicalQuery {
            page,
            limit,
            search,
            sort_key,
            sort_dir,
            ..CanonicalQuery::default()
        };

        for (key, values) in raw.iter() {
            if is_reserved_key(key) {
                continue;
            }
            let value = match self.field(key).map(|f| f.kind) {
                Some(FieldKind::Enumerated(field) | FieldKind::Bucket(field)) => {
                    alias::normalize(values, field).and_then(FilterValue::from_values)
                }
                Some(FieldKind::Keyword) => FilterValue::from_values(keyword_tokens(values)),
                Some(FieldKind::RangeMin | FieldKind::RangeMax) => values
                    .iter()
                    .map(|v| v.trim())
                    .find(|v| !v.is_empty())
                    .map(|v| FilterValue::One(v.to_string())),
                // Unknown key: preserved opaque so the wire form round-trips,
                // but the translator will produce no predicate for it.
                None => FilterValue::from_values(opaque_tokens(values)),
            };
            query.set_filter(key, value);
        }

        Ok(query)
    }

    fn compile_sort(
        &self,
        raw: &RawQuery,
    ) -> Result<(Option<String>, SortDirection), ValidationError> {
        let explicit_dir = match raw.first(ORDER_DIR_KEY).map(str::trim) {
            None | Some("") => None,
            Some(token) => Some(SortDirection::parse(token).ok_or_else(|| {
                ValidationError::not_allowed(ORDER_DIR_KEY, token, &["asc", "desc"])
            })?),
        };

        match raw.first(ORDER_BY_KEY).map(str::trim) {
            Some(token) if !token.is_empty() => {
                if self.sortable(token).is_none() {
                    return Err(ValidationError::not_allowed(
                        ORDER_BY_KEY,
                        token,
                        &self.sort_keys(),
                    ));
                }
                Ok((
                    Some(token.to_string()),
                    explicit_dir.unwrap_or(SortDirection::Asc),
                ))
            }
            _ => match self.default_sort {
                Some((key, dir)) => Ok((Some(key.to_string()), explicit_dir.unwrap_or(dir))),
                None => Ok((None, explicit_dir.unwrap_or_default())),
            },
        }
    }
}

/// Parses an optional positive integer under `key`, falling back to
/// `default` when absent or blank.
fn parse_positive(raw: &RawQuery, key: &str, default: u32) -> Result<u32, ValidationError> {
    match raw.first(key).map(str::trim) {
        None | Some("") => Ok(default),
        Some(text) => match text.parse::<u32>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(ValidationError::not_a_positive_integer(key, text)),
        },
    }
}

/// Token list for a keyword (identity) filter: comma-split, trimmed,
/// de-duplicated, arrival order preserved.
fn keyword_tokens(values: &[String]) -> Vec<String> {
    let mut tokens = Vec::new();
    for value in values {
        for token in value.split(',') {
            let token = token.trim();
            if !token.is_empty() && !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
    }
    tokens
}

/// Token list for an unrecognized filter key: comma-split and trimmed
/// only, multiplicity preserved verbatim.
fn opaque_tokens(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
