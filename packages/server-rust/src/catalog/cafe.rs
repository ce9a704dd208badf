//! Cafe rows and write payloads.

use ngopi_core::domain::{self, CAFE_TYPE, CONTENT_STATUS, PRICE_RANGE, REGION};
use ngopi_core::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{canonical, non_empty, valid_slug};
use crate::storage::{FieldValue, Record};

/// One cafe as stored and served.
///
/// Enumerated fields hold canonical domain tokens; `average_rating` and
/// `review_count` are maintained by the review rollup, not by cafe
/// writes. Timestamps are unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cafe {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub region: String,
    pub cafe_type: String,
    pub price_range: String,
    pub status: String,
    pub average_rating: f64,
    pub review_count: u32,
    pub facility_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cafe {
    /// Folds one newly published review rating into the tallies.
    pub fn absorb_rating(&mut self, rating: u8, now: i64) {
        let sum = self.average_rating * f64::from(self.review_count) + f64::from(rating);
        self.review_count += 1;
        self.average_rating = sum / f64::from(self.review_count);
        self.updated_at = now;
    }

    /// Backs one rating out of the tallies when its review is archived.
    pub fn release_rating(&mut self, rating: u8, now: i64) {
        if self.review_count <= 1 {
            self.review_count = 0;
            self.average_rating = 0.0;
        } else {
            let sum = self.average_rating * f64::from(self.review_count) - f64::from(rating);
            self.review_count -= 1;
            self.average_rating = sum / f64::from(self.review_count);
        }
        self.updated_at = now;
    }
}

impl Record for Cafe {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Str(self.id.clone())),
            "slug" => Some(FieldValue::Str(self.slug.clone())),
            "name" => Some(FieldValue::Str(self.name.clone())),
            "description" => Some(FieldValue::Str(self.description.clone())),
            "address" => Some(FieldValue::Str(self.address.clone())),
            "region" => Some(FieldValue::Str(self.region.clone())),
            "cafe_type" => Some(FieldValue::Str(self.cafe_type.clone())),
            "price_range" => Some(FieldValue::Str(self.price_range.clone())),
            // Computed: orders budget < moderate < premium.
            "price_rank" => domain::price_rank(&self.price_range)
                .map(|rank| FieldValue::Int(i64::from(rank))),
            "status" => Some(FieldValue::Str(self.status.clone())),
            "average_rating" => Some(FieldValue::Float(self.average_rating)),
            "review_count" => Some(FieldValue::Int(i64::from(self.review_count))),
            "facility_ids" => Some(FieldValue::StrList(self.facility_ids.clone())),
            "created_at" => Some(FieldValue::Int(self.created_at)),
            "updated_at" => Some(FieldValue::Int(self.updated_at)),
            _ => None,
        }
    }
}

/// Create/update payload for a cafe, as submitted by the admin UI.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeDraft {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub region: String,
    pub cafe_type: String,
    pub price_range: String,
    /// Defaults to `draft` when omitted.
    pub status: Option<String>,
    #[serde(default)]
    pub facility_ids: Vec<String>,
}

/// A draft that passed field validation, enumerated fields canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct CafeAttributes {
    slug: String,
    name: String,
    description: String,
    address: String,
    region: String,
    cafe_type: String,
    price_range: String,
    status: String,
    facility_ids: Vec<String>,
}

impl CafeDraft {
    /// Field-level validation. Aliases are accepted and canonicalized;
    /// anything unresolvable is rejected naming the offending field.
    pub fn validated(&self) -> Result<CafeAttributes, ValidationError> {
        let status = match &self.status {
            Some(status) => canonical("status", &CONTENT_STATUS, status)?,
            None => "draft".to_string(),
        };
        Ok(CafeAttributes {
            slug: valid_slug("slug", &self.slug)?,
            name: non_empty("name", &self.name)?,
            description: self.description.trim().to_string(),
            address: self.address.trim().to_string(),
            region: canonical("region", &REGION, &self.region)?,
            cafe_type: canonical("cafeType", &CAFE_TYPE, &self.cafe_type)?,
            price_range: canonical("priceRange", &PRICE_RANGE, &self.price_range)?,
            status,
            facility_ids: self.facility_ids.clone(),
        })
    }
}

impl CafeAttributes {
    /// Builds a brand-new row. Rating tallies start at zero.
    #[must_use]
    pub fn into_cafe(self, id: String, now: i64) -> Cafe {
        Cafe {
            id,
            slug: self.slug,
            name: self.name,
            description: self.description,
            address: self.address,
            region: self.region,
            cafe_type: self.cafe_type,
            price_range: self.price_range,
            status: self.status,
            average_rating: 0.0,
            review_count: 0,
            facility_ids: self.facility_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites an existing row in place, preserving its id, rating
    /// tallies, and creation time. Infallible so it can run inside a
    /// single guarded storage update.
    pub fn apply_to(self, cafe: &mut Cafe, now: i64) {
        cafe.slug = self.slug;
        cafe.name = self.name;
        cafe.description = self.description;
        cafe.address = self.address;
        cafe.region = self.region;
        cafe.cafe_type = self.cafe_type;
        cafe.price_range = self.price_range;
        cafe.status = self.status;
        cafe.facility_ids = self.facility_ids;
        cafe.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CafeDraft {
        CafeDraft {
            slug: "kopi-nako".into(),
            name: "Kopi Nako".into(),
            description: "Spacious rooftop".into(),
            address: "Jl. Sukapura 10".into(),
            region: "skp".into(),
            cafe_type: "cs".into(),
            price_range: "$$".into(),
            status: Some("pub".into()),
            facility_ids: vec!["wifi".into()],
        }
    }

    #[test]
    fn draft_canonicalizes_aliases() {
        let attrs = draft().validated().unwrap();
        let cafe = attrs.into_cafe("cafe-1".into(), 1_000);
        assert_eq!(cafe.region, "sukapura");
        assert_eq!(cafe.cafe_type, "coffee_shop");
        assert_eq!(cafe.price_range, "moderate");
        assert_eq!(cafe.status, "published");
        assert_eq!(cafe.review_count, 0);
    }

    #[test]
    fn omitted_status_defaults_to_draft() {
        let mut input = draft();
        input.status = None;
        assert_eq!(input.validated().unwrap().status, "draft");
    }

    #[test]
    fn invalid_fields_are_rejected_by_name() {
        let mut input = draft();
        input.region = "atlantis".into();
        assert_eq!(input.validated().unwrap_err().field, "region");

        let mut input = draft();
        input.slug = "Kopi Nako".into();
        assert_eq!(input.validated().unwrap_err().field, "slug");

        let mut input = draft();
        input.name = "  ".into();
        assert_eq!(input.validated().unwrap_err().field, "name");

        let mut input = draft();
        input.price_range = "$$$$".into();
        assert_eq!(input.validated().unwrap_err().field, "priceRange");
    }

    #[test]
    fn apply_preserves_identity_and_tallies() {
        let mut cafe = draft().validated().unwrap().into_cafe("cafe-1".into(), 1_000);
        cafe.absorb_rating(4, 2_000);

        let mut update = draft();
        update.name = "Kopi Nako Dago".into();
        update.validated().unwrap().apply_to(&mut cafe, 3_000);

        assert_eq!(cafe.id, "cafe-1");
        assert_eq!(cafe.name, "Kopi Nako Dago");
        assert_eq!(cafe.review_count, 1);
        assert_eq!(cafe.created_at, 1_000);
        assert_eq!(cafe.updated_at, 3_000);
    }

    #[test]
    fn rating_rollup_averages_incrementally() {
        let mut cafe = draft().validated().unwrap().into_cafe("cafe-1".into(), 0);
        cafe.absorb_rating(4, 1);
        cafe.absorb_rating(5, 2);
        assert_eq!(cafe.review_count, 2);
        assert!((cafe.average_rating - 4.5).abs() < 1e-9);
    }

    #[test]
    fn released_rating_undoes_an_absorbed_one() {
        let mut cafe = draft().validated().unwrap().into_cafe("cafe-1".into(), 0);
        cafe.absorb_rating(4, 1);
        cafe.absorb_rating(5, 2);
        cafe.release_rating(5, 3);
        assert_eq!(cafe.review_count, 1);
        assert!((cafe.average_rating - 4.0).abs() < 1e-9);

        cafe.release_rating(4, 4);
        assert_eq!(cafe.review_count, 0);
        assert!((cafe.average_rating - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_rank_column_is_computed() {
        let cafe = draft().validated().unwrap().into_cafe("cafe-1".into(), 0);
        assert_eq!(cafe.field("price_rank"), Some(FieldValue::Int(1)));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let cafe = draft().validated().unwrap().into_cafe("cafe-1".into(), 0);
        let json = serde_json::to_value(&cafe).unwrap();
        assert!(json["cafeType"].is_string());
        assert!(json["priceRange"].is_string());
        assert!(json["averageRating"].is_number());
        assert!(json["facilityIds"].is_array());
        assert!(json.get("cafe_type").is_none());
    }
}
