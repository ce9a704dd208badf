//! Review rows and write payloads.

use ngopi_core::domain::VISITOR_TYPE;
use ngopi_core::ValidationError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::{canonical, non_empty};
use crate::storage::{FieldValue, Record};

/// One visitor review of a cafe.
///
/// `rating` is a whole star count (1..=5). New reviews are published
/// immediately; moderation happens by flipping `status` afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub cafe_id: String,
    pub author: String,
    pub content: String,
    pub rating: u8,
    pub visitor_type: String,
    pub status: String,
    pub created_at: i64,
}

impl Record for Review {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(FieldValue::Str(self.id.clone())),
            "cafe_id" => Some(FieldValue::Str(self.cafe_id.clone())),
            "author" => Some(FieldValue::Str(self.author.clone())),
            "content" => Some(FieldValue::Str(self.content.clone())),
            "rating" => Some(FieldValue::Int(i64::from(self.rating))),
            "visitor_type" => Some(FieldValue::Str(self.visitor_type.clone())),
            "status" => Some(FieldValue::Str(self.status.clone())),
            "created_at" => Some(FieldValue::Int(self.created_at)),
            _ => None,
        }
    }
}

/// Public review submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub cafe_id: String,
    pub author: String,
    pub content: String,
    pub rating: u8,
    pub visitor_type: String,
}

/// A validated submission, visitor type canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAttributes {
    cafe_id: String,
    author: String,
    content: String,
    rating: u8,
    visitor_type: String,
}

impl ReviewDraft {
    pub fn validated(&self) -> Result<ReviewAttributes, ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::out_of_range(
                "rating",
                &self.rating.to_string(),
                1,
                5,
            ));
        }
        Ok(ReviewAttributes {
            cafe_id: non_empty("cafeId", &self.cafe_id)?,
            author: non_empty("author", &self.author)?,
            content: non_empty("content", &self.content)?,
            rating: self.rating,
            visitor_type: canonical("visitorType", &VISITOR_TYPE, &self.visitor_type)?,
        })
    }
}

impl ReviewAttributes {
    /// The cafe this review targets.
    #[must_use]
    pub fn cafe_id(&self) -> &str {
        &self.cafe_id
    }

    /// The submitted star count.
    #[must_use]
    pub fn rating(&self) -> u8 {
        self.rating
    }

    #[must_use]
    pub fn into_review(self, id: String, now: i64) -> Review {
        Review {
            id,
            cafe_id: self.cafe_id,
            author: self.author,
            content: self.content,
            rating: self.rating,
            visitor_type: self.visitor_type,
            status: "published".to_string(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReviewDraft {
        ReviewDraft {
            cafe_id: "cafe-1".into(),
            author: "Rani".into(),
            content: "Enak banget kopinya".into(),
            rating: 5,
            visitor_type: "cp".into(),
        }
    }

    #[test]
    fn submission_canonicalizes_visitor_type() {
        let review = draft().validated().unwrap().into_review("rev-1".into(), 10);
        assert_eq!(review.visitor_type, "couple");
        assert_eq!(review.status, "published");
        assert_eq!(review.created_at, 10);
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        for rating in [0u8, 6, 200] {
            let mut input = draft();
            input.rating = rating;
            let err = input.validated().unwrap_err();
            assert_eq!(err.field, "rating");
        }
    }

    #[test]
    fn blank_content_is_rejected() {
        let mut input = draft();
        input.content = "  ".into();
        assert_eq!(input.validated().unwrap_err().field, "content");
    }

    #[test]
    fn unknown_visitor_type_is_rejected() {
        let mut input = draft();
        input.visitor_type = "ghost".into();
        assert_eq!(input.validated().unwrap_err().field, "visitorType");
    }
}
