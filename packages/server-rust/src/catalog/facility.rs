//! Facility vocabulary rows.

use ngopi_core::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{non_empty, valid_slug};
use crate::storage::{FieldValue, Record};

/// An amenity cafes can offer (wifi, mushola, outdoor seating, ...).
/// Cafes reference facilities by id in their `facility_ids` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub created_at: i64,
}

impl Record for Facility {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Str(self.id.clone())),
            "slug" => Some(FieldValue::Str(self.slug.clone())),
            "name" => Some(FieldValue::Str(self.name.clone())),
            "created_at" => Some(FieldValue::Int(self.created_at)),
            _ => None,
        }
    }
}

/// Create/update payload for a facility.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDraft {
    pub slug: String,
    pub name: String,
}

impl FacilityDraft {
    pub fn validated(&self) -> Result<(String, String), ValidationError> {
        Ok((
            valid_slug("slug", &self.slug)?,
            non_empty("name", &self.name)?,
        ))
    }

    pub fn build(&self, id: String, now: i64) -> Result<Facility, ValidationError> {
        let (slug, name) = self.validated()?;
        Ok(Facility { id, slug, name, created_at: now })
    }
}
