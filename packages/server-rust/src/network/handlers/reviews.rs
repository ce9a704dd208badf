//! Review listing, public submission, and moderation handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ngopi_core::{ErrorEnvelope, ListEnvelope, RawQuery};
use uuid::Uuid;

use super::{now_millis, ApiError, AppState};
use crate::catalog::{Review, ReviewDraft};
use crate::network::auth::AdminAccess;

/// Lists reviews with filtering, search, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "reviews",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number, defaults to 1"),
        ("limit" = Option<u32>, Query, description = "Page size, 1..=100, defaults to 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match over content and author"),
        ("orderBy" = Option<String>, Query, description = "Sort key: created_at or rating"),
        ("orderDir" = Option<String>, Query, description = "asc or desc"),
        ("cafe" = Option<String>, Query, description = "Cafe ids to restrict to"),
        ("rating" = Option<String>, Query, description = "Whole-star values, e.g. 4,5"),
        ("visitor" = Option<String>, Query, description = "Visitor type tokens, e.g. couple or cp"),
        ("status" = Option<String>, Query, description = "Editorial status tokens"),
    ),
    responses(
        (status = 200, description = "One page of reviews", body = ListEnvelope<Review>),
        (status = 400, description = "Malformed reserved parameter", body = ErrorEnvelope),
    ),
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListEnvelope<Review>>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let query = state.reviews.spec().compile(&RawQuery::from_pairs(pairs))?;
    let page = state.reviews.query(&query).await?;
    Ok(Json(page.into()))
}

/// Submits a review. Public, no credentials required.
///
/// The review publishes immediately and its rating is folded into the
/// cafe's `averageRating`/`reviewCount` tallies in the same request. The
/// tallies are updated first, so a submission against a vanished cafe
/// leaves no orphaned review behind.
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "reviews",
    request_body = ReviewDraft,
    responses(
        (status = 201, description = "Published review", body = Review),
        (status = 400, description = "Rejected field", body = ErrorEnvelope),
        (status = 404, description = "The addressed cafe does not exist", body = ErrorEnvelope),
    ),
)]
pub async fn create_review(
    State(state): State<AppState>,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let attributes = draft.validated()?;
    let now = now_millis();
    let rating = attributes.rating();

    state
        .catalog
        .cafes
        .update(attributes.cafe_id(), |cafe| cafe.absorb_rating(rating, now))
        .ok_or(ApiError::NotFound("cafe"))?;

    let review = attributes.into_review(Uuid::new_v4().to_string(), now);
    state.catalog.reviews.insert(review.clone());

    tracing::info!(id = %review.id, cafe = %review.cafe_id, rating, "review published");
    Ok((StatusCode::CREATED, Json(review)))
}

/// Archives a review. Admin only.
///
/// Archiving is the moderation path: the row stays queryable under
/// `status=archived` but its rating is backed out of the cafe tallies.
/// Archiving an already-archived review is a no-op for the tallies.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "reviews",
    security(("admin_token" = [])),
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Archived review", body = Review),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
        (status = 404, description = "No review with that id", body = ErrorEnvelope),
    ),
)]
pub async fn archive_review(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<String>,
) -> Result<Json<Review>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let now = now_millis();

    let mut was_published = false;
    let review = state
        .catalog
        .reviews
        .update(&id, |review| {
            was_published = review.status == "published";
            review.status = "archived".to_string();
        })
        .ok_or(ApiError::NotFound("review"))?;

    if was_published {
        state
            .catalog
            .cafes
            .update(&review.cafe_id, |cafe| {
                cafe.release_rating(review.rating, now);
            });
        tracing::info!(id = %review.id, cafe = %review.cafe_id, "review archived");
    }

    Ok(Json(review))
}
