//! Taxonomy term rows.

use ngopi_core::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{non_empty, valid_slug};
use crate::storage::{FieldValue, Record};

/// A taxonomy term, grouped by vocabulary (`brew-method`, `ambience`,
/// ...). Vocabularies are free-form keys, not a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub id: String,
    pub vocabulary: String,
    pub name: String,
    pub slug: String,
    pub created_at: i64,
}

impl Record for Term {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Str(self.id.clone())),
            "vocabulary" => Some(FieldValue::Str(self.vocabulary.clone())),
            "name" => Some(FieldValue::Str(self.name.clone())),
            "slug" => Some(FieldValue::Str(self.slug.clone())),
            "created_at" => Some(FieldValue::Int(self.created_at)),
            _ => None,
        }
    }
}

/// Create/update payload for a term.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TermDraft {
    pub vocabulary: String,
    pub name: String,
    pub slug: String,
}

impl TermDraft {
    pub fn build(&self, id: String, now: i64) -> Result<Term, ValidationError> {
        Ok(Term {
            id,
            vocabulary: valid_slug("vocabulary", &self.vocabulary)?,
            name: non_empty("name", &self.name)?,
            slug: valid_slug("slug", &self.slug)?,
            created_at: now,
        })
    }
}
