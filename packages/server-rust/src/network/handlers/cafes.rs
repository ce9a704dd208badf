//! Cafe listing, lookup, and admin mutation handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ngopi_core::{ErrorEnvelope, ListEnvelope, RawQuery};
use uuid::Uuid;

use super::{now_millis, ApiError, AppState};
use crate::catalog::{Cafe, CafeDraft};
use crate::network::auth::AdminAccess;

/// Lists cafes with filtering, search, sorting, and pagination.
///
/// Filter values accept canonical tokens, aliases, or comma-joined
/// mixtures of both; unknown tokens are dropped rather than rejected.
/// Reserved parameters (`page`, `limit`, `orderBy`, `orderDir`) are
/// validated strictly and reject the request when malformed.
#[utoipa::path(
    get,
    path = "/api/cafes",
    tag = "cafes",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number, defaults to 1"),
        ("limit" = Option<u32>, Query, description = "Page size, 1..=100, defaults to 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match over name, description, and address"),
        ("orderBy" = Option<String>, Query, description = "Sort key: name, rating, price, or created_at"),
        ("orderDir" = Option<String>, Query, description = "asc or desc"),
        ("region" = Option<String>, Query, description = "Region tokens, e.g. sukapura or skp"),
        ("type" = Option<String>, Query, description = "Cafe type tokens, e.g. coffee_shop or cs"),
        ("price" = Option<String>, Query, description = "Price range tokens, e.g. moderate or $$"),
        ("rating" = Option<String>, Query, description = "Whole-star buckets, e.g. 4 matches [4.0, 5.0)"),
        ("status" = Option<String>, Query, description = "Editorial status tokens"),
        ("facility" = Option<String>, Query, description = "Facility ids the cafe must offer"),
        ("minRating" = Option<f64>, Query, description = "Inclusive lower rating bound"),
        ("maxRating" = Option<f64>, Query, description = "Inclusive upper rating bound"),
    ),
    responses(
        (status = 200, description = "One page of cafes", body = ListEnvelope<Cafe>),
        (status = 400, description = "Malformed reserved parameter", body = ErrorEnvelope),
    ),
)]
pub async fn list_cafes(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListEnvelope<Cafe>>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let query = state.cafes.spec().compile(&RawQuery::from_pairs(pairs))?;
    let page = state.cafes.query(&query).await?;
    Ok(Json(page.into()))
}

/// Fetches one cafe by id, falling back to slug lookup.
#[utoipa::path(
    get,
    path = "/api/cafes/{id}",
    tag = "cafes",
    params(("id" = String, Path, description = "Cafe id or slug")),
    responses(
        (status = 200, description = "The cafe", body = Cafe),
        (status = 404, description = "No cafe with that id or slug", body = ErrorEnvelope),
    ),
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Cafe>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let found = match state.cafes.find_by_id(&id).await? {
        Some(cafe) => Some(cafe),
        None => state.cafes.find_by_slug(&id).await?,
    };
    found.map(Json).ok_or(ApiError::NotFound("cafe"))
}

/// Creates a cafe. Admin only.
#[utoipa::path(
    post,
    path = "/api/cafes",
    tag = "cafes",
    request_body = CafeDraft,
    security(("admin_token" = [])),
    responses(
        (status = 201, description = "Created cafe", body = Cafe),
        (status = 400, description = "Rejected field", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
    ),
)]
pub async fn create_cafe(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Json(draft): Json<CafeDraft>,
) -> Result<(StatusCode, Json<Cafe>), ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let attributes = draft.validated()?;
    let cafe = attributes.into_cafe(Uuid::new_v4().to_string(), now_millis());
    state.catalog.cafes.insert(cafe.clone());

    tracing::info!(id = %cafe.id, slug = %cafe.slug, "cafe created");
    Ok((StatusCode::CREATED, Json(cafe)))
}

/// Replaces a cafe's attributes, including its facility associations.
/// Admin only.
///
/// Rating tallies and the creation timestamp survive the rewrite; the
/// facility list is replaced wholesale in the same guarded step as the
/// rest of the row, so readers never observe a half-updated cafe.
#[utoipa::path(
    put,
    path = "/api/cafes/{id}",
    tag = "cafes",
    request_body = CafeDraft,
    security(("admin_token" = [])),
    params(("id" = String, Path, description = "Cafe id")),
    responses(
        (status = 200, description = "Updated cafe", body = Cafe),
        (status = 400, description = "Rejected field", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
        (status = 404, description = "No cafe with that id", body = ErrorEnvelope),
    ),
)]
pub async fn update_cafe(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<String>,
    Json(draft): Json<CafeDraft>,
) -> Result<Json<Cafe>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let attributes = draft.validated()?;
    let now = now_millis();
    state
        .catalog
        .cafes
        .update(&id, |cafe| attributes.apply_to(cafe, now))
        .map(Json)
        .ok_or(ApiError::NotFound("cafe"))
}

/// Deletes a cafe and every review attached to it. Admin only.
#[utoipa::path(
    delete,
    path = "/api/cafes/{id}",
    tag = "cafes",
    security(("admin_token" = [])),
    params(("id" = String, Path, description = "Cafe id")),
    responses(
        (status = 204, description = "Cafe and its reviews removed"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
        (status = 404, description = "No cafe with that id", body = ErrorEnvelope),
    ),
)]
pub async fn delete_cafe(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    state
        .catalog
        .cafes
        .remove(&id)
        .ok_or(ApiError::NotFound("cafe"))?;

    let dropped = state.catalog.reviews.retain(|review| review.cafe_id != id);
    tracing::info!(id = %id, reviews_dropped = dropped, "cafe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{seed, Catalog};
    use crate::network::{NetworkConfig, ShutdownController};

    fn test_state(catalog: Catalog) -> AppState {
        let config = NetworkConfig {
            admin_token: Some("rahasia".to_string()),
            ..NetworkConfig::default()
        };
        AppState::new(
            catalog,
            Arc::new(ShutdownController::new()),
            Arc::new(config),
        )
    }

    fn pairs(query: &str) -> Query<Vec<(String, String)>> {
        Query(
            query
                .split('&')
                .filter(|part| !part.is_empty())
                .map(|part| {
                    let (key, value) = part.split_once('=').unwrap();
                    (key.to_string(), value.to_string())
                })
                .collect(),
        )
    }

    fn draft(slug: &str) -> CafeDraft {
        CafeDraft {
            slug: slug.to_string(),
            name: "Toko Kopi Baru".to_string(),
            description: String::new(),
            address: String::new(),
            region: "cbl".to_string(),
            cafe_type: "ro".to_string(),
            price_range: "$".to_string(),
            status: Some("pub".to_string()),
            facility_ids: vec!["fac-01".to_string()],
        }
    }

    #[tokio::test]
    async fn list_returns_envelope_with_pagination() {
        let state = test_state(seed::demo());

        let response = list_cafes(State(state), pairs("limit=3")).await.unwrap();
        let envelope = response.0;

        assert_eq!(envelope.data.len(), 3);
        assert_eq!(envelope.pagination.page, 1);
        assert_eq!(envelope.pagination.limit, 3);
        assert_eq!(envelope.pagination.total, 7);
        assert_eq!(envelope.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn list_applies_alias_filters() {
        let state = test_state(seed::demo());

        let response = list_cafes(State(state), pairs("region=skp"))
            .await
            .unwrap();

        assert_eq!(response.0.pagination.total, 2);
        assert!(response
            .0
            .data
            .iter()
            .all(|cafe| cafe.region == "sukapura"));
    }

    #[tokio::test]
    async fn list_rejects_bad_page_with_validation_error() {
        let state = test_state(seed::demo());

        let err = list_cafes(State(state), pairs("page=0")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn list_page_past_the_end_is_empty_with_real_totals() {
        let state = test_state(seed::demo());

        let response = list_cafes(State(state), pairs("page=9&limit=5"))
            .await
            .unwrap();

        assert!(response.0.data.is_empty());
        assert_eq!(response.0.pagination.total, 7);
        assert_eq!(response.0.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn get_resolves_id_then_slug() {
        let state = test_state(seed::demo());

        let by_id = get_cafe(State(state.clone()), Path("cafe-01".to_string()))
            .await
            .unwrap();
        assert_eq!(by_id.0.name, "Kopi Nako");

        let by_slug = get_cafe(State(state.clone()), Path("sejiwa-coffee".to_string()))
            .await
            .unwrap();
        assert_eq!(by_slug.0.id, "cafe-02");

        let missing = get_cafe(State(state), Path("tidak-ada".to_string())).await;
        assert!(matches!(missing, Err(ApiError::NotFound("cafe"))));
    }

    #[tokio::test]
    async fn create_canonicalizes_and_stores() {
        let state = test_state(Catalog::empty());

        let (status, cafe) = create_cafe(
            State(state.clone()),
            AdminAccess,
            Json(draft("toko-kopi-baru")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(cafe.0.region, "coblong");
        assert_eq!(cafe.0.price_range, "budget");
        assert_eq!(state.catalog.cafes.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_slug() {
        let state = test_state(Catalog::empty());

        let err = create_cafe(State(state), AdminAccess, Json(draft("Toko Baru")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn update_preserves_tallies_and_rewrites_facilities() {
        let state = test_state(seed::demo());
        let before = state
            .cafes
            .find_by_id("cafe-01")
            .await
            .unwrap()
            .unwrap();

        let mut change = draft("kopi-nako");
        change.facility_ids = vec!["fac-03".to_string()];
        let updated = update_cafe(
            State(state),
            AdminAccess,
            Path("cafe-01".to_string()),
            Json(change),
        )
        .await
        .unwrap();

        assert_eq!(updated.0.review_count, before.review_count);
        assert_eq!(updated.0.created_at, before.created_at);
        assert_eq!(updated.0.facility_ids, vec!["fac-03".to_string()]);
    }

    #[tokio::test]
    async fn update_missing_cafe_is_not_found() {
        let state = test_state(Catalog::empty());

        let err = update_cafe(
            State(state),
            AdminAccess,
            Path("cafe-99".to_string()),
            Json(draft("apa-saja")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("cafe")));
    }

    #[tokio::test]
    async fn delete_cascades_to_reviews() {
        let state = test_state(seed::demo());
        let reviews_before = state.catalog.reviews.len();

        let status = delete_cafe(State(state.clone()), AdminAccess, Path("cafe-01".to_string()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.catalog.cafes.remove("cafe-01").is_none());
        assert!(state.catalog.reviews.len() < reviews_before);
        assert!(state
            .catalog
            .reviews
            .snapshot()
            .iter()
            .all(|review| review.cafe_id != "cafe-01"));
    }
}
