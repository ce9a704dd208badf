//! Catalog rows, write payloads, and seed data.
//!
//! Each row type implements [`Record`](crate::storage::Record) so the
//! predicate evaluator can address its columns, and each write payload
//! validates into a canonicalized attribute set before touching storage.
//! Write validation is strict where read filtering is permissive: an
//! unknown region in a filter silently drops, but an unknown region in a
//! create/update is a field-level rejection.

pub mod cafe;
pub mod facility;
pub mod review;
pub mod seed;
pub mod term;

pub use cafe::{Cafe, CafeAttributes, CafeDraft};
pub use facility::{Facility, FacilityDraft};
pub use review::{Review, ReviewDraft};
pub use term::{Term, TermDraft};

use std::sync::Arc;

use ngopi_core::domain::{self, DomainField};
use ngopi_core::ValidationError;

use crate::storage::MemoryDataSource;

/// The four resource collections one server instance serves.
#[derive(Clone)]
pub struct Catalog {
    pub cafes: Arc<MemoryDataSource<Cafe>>,
    pub reviews: Arc<MemoryDataSource<Review>>,
    pub facilities: Arc<MemoryDataSource<Facility>>,
    pub terms: Arc<MemoryDataSource<Term>>,
}

impl Catalog {
    /// Empty collections, for tests and cold starts.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cafes: Arc::new(MemoryDataSource::new()),
            reviews: Arc::new(MemoryDataSource::new()),
            facilities: Arc::new(MemoryDataSource::new()),
            terms: Arc::new(MemoryDataSource::new()),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trimmed `value`, or a rejection naming `key` when blank.
pub(crate) fn non_empty(key: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::missing(key))
    } else {
        Ok(value.to_string())
    }
}

/// Canonical token for `value` under `field`, accepting aliases.
pub(crate) fn canonical(
    key: &'static str,
    field: &DomainField,
    value: &str,
) -> Result<String, ValidationError> {
    field
        .resolve(value.trim())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::not_allowed(key, value, field.values))
}

/// Well-formed slug, or a rejection naming `key`.
pub(crate) fn valid_slug(key: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if domain::is_valid_slug(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(
            key,
            "must be lowercase alphanumeric segments joined by single hyphens",
        ))
    }
}
