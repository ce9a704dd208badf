//! Field-level validation errors.

use serde::Serialize;

/// Rejection produced while compiling raw query input.
///
/// Always names the offending wire key so callers can surface the problem
/// next to the right control. Compilation stops at the first failure; there
/// is no multi-error accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid query parameter `{field}`: {message}")]
pub struct ValidationError {
    /// Wire key the rejected value arrived under.
    pub field: String,
    /// Human-readable description of what was wrong.
    pub message: String,
}

impl ValidationError {
    /// Rejection of `field` with a custom description.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Required `field` was absent or blank.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "value is required")
    }

    /// `field` held `value`, which does not parse as a positive integer.
    #[must_use]
    pub fn not_a_positive_integer(field: impl Into<String>, value: &str) -> Self {
        Self::new(field, format!("`{value}` is not a positive integer"))
    }

    /// `field` held `value`, which is outside the closed range `min..=max`.
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: &str, min: u32, max: u32) -> Self {
        Self::new(field, format!("`{value}` is outside {min}..={max}"))
    }

    /// `field` held `value`, which is not one of `allowed`.
    #[must_use]
    pub fn not_allowed(field: impl Into<String>, value: &str, allowed: &[&str]) -> Self {
        Self::new(
            field,
            format!("`{value}` is not one of: {}", allowed.join(", ")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = ValidationError::not_a_positive_integer("page", "zero");
        assert_eq!(
            err.to_string(),
            "invalid query parameter `page`: `zero` is not a positive integer"
        );
    }

    #[test]
    fn not_allowed_lists_the_allow_list() {
        let err = ValidationError::not_allowed("orderBy", "color", &["name", "rating"]);
        assert!(err.message.contains("name, rating"));
        assert_eq!(err.field, "orderBy");
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let err = ValidationError::out_of_range("limit", "500", 1, 100);
        assert!(err.message.contains("1..=100"));
    }
}
