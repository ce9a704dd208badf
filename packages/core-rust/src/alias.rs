//! Alias normalization for enumerated filter fields.
//!
//! One permissive resolver shared by every resource, replacing the
//! per-resource copies the original screens grew. Raw filter input arrives
//! as either a comma-joined string (`region=skp,btn`) or repeated values
//! (`region=skp&region=btn`); both collapse to the same canonical token
//! list here.
//!
//! Unrecognized tokens are dropped, never rejected: a malformed filter
//! value degrades to "no filter" instead of failing the whole request.

use crate::domain::DomainField;

/// Normalizes raw filter values against a domain field.
///
/// `raw` holds the values collected for one query key; each element may
/// itself be a comma-joined list. Tokens are resolved through the field's
/// alias map (exact, then lower-cased) with a case-tolerant canonical
/// fallback, deduplicated preserving first-seen order, and unknown tokens
/// are silently dropped.
///
/// Returns `None` when nothing resolves -- meaning "no constraint", not an
/// error. Pure function of its inputs.
#[must_use]
pub fn normalize(raw: &[String], field: &DomainField) -> Option<Vec<String>> {
    let mut resolved: Vec<String> = Vec::new();

    for value in raw {
        for token in value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match field.resolve(token) {
                Some(canonical) => {
                    if !resolved.iter().any(|r| r == canonical) {
                        resolved.push(canonical.to_string());
                    }
                }
                None => {
                    tracing::debug!(
                        field = field.name,
                        token,
                        "dropping unrecognized filter token"
                    );
                }
            }
        }
    }

    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Convenience wrapper for a single raw value.
#[must_use]
pub fn normalize_one(raw: &str, field: &DomainField) -> Option<Vec<String>> {
    normalize(std::slice::from_ref(&raw.to_string()), field)
}
