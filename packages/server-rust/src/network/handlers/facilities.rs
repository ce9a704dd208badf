//! Facility listing and admin mutation handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ngopi_core::{ErrorEnvelope, ListEnvelope, RawQuery};
use uuid::Uuid;

use super::{now_millis, ApiError, AppState};
use crate::catalog::{Facility, FacilityDraft};
use crate::network::auth::AdminAccess;

/// Lists facilities with search, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/facilities",
    tag = "facilities",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number, defaults to 1"),
        ("limit" = Option<u32>, Query, description = "Page size, 1..=100, defaults to 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match over the name"),
        ("orderBy" = Option<String>, Query, description = "Sort key: name or created_at"),
        ("orderDir" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "One page of facilities", body = ListEnvelope<Facility>),
        (status = 400, description = "Malformed reserved parameter", body = ErrorEnvelope),
    ),
)]
pub async fn list_facilities(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListEnvelope<Facility>>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let query = state
        .facilities
        .spec()
        .compile(&RawQuery::from_pairs(pairs))?;
    let page = state.facilities.query(&query).await?;
    Ok(Json(page.into()))
}

/// Creates a facility. Admin only.
#[utoipa::path(
    post,
    path = "/api/facilities",
    tag = "facilities",
    request_body = FacilityDraft,
    security(("admin_token" = [])),
    responses(
        (status = 201, description = "Created facility", body = Facility),
        (status = 400, description = "Rejected field", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
    ),
)]
pub async fn create_facility(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Json(draft): Json<FacilityDraft>,
) -> Result<(StatusCode, Json<Facility>), ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let facility = draft.build(Uuid::new_v4().to_string(), now_millis())?;
    state.catalog.facilities.insert(facility.clone());

    tracing::info!(id = %facility.id, slug = %facility.slug, "facility created");
    Ok((StatusCode::CREATED, Json(facility)))
}

/// Deletes a facility and detaches it from every cafe. Admin only.
///
/// The detach runs per cafe through the guarded update path, so each
/// cafe's facility list changes in one step even while list queries are
/// running.
#[utoipa::path(
    delete,
    path = "/api/facilities/{id}",
    tag = "facilities",
    security(("admin_token" = [])),
    params(("id" = String, Path, description = "Facility id")),
    responses(
        (status = 204, description = "Facility removed and detached"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
        (status = 404, description = "No facility with that id", body = ErrorEnvelope),
    ),
)]
pub async fn delete_facility(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    state
        .catalog
        .facilities
        .remove(&id)
        .ok_or(ApiError::NotFound("facility"))?;

    let now = now_millis();
    let mut detached = 0usize;
    for cafe in state.catalog.cafes.snapshot() {
        if cafe.facility_ids.iter().any(|facility| facility == &id) {
            state.catalog.cafes.update(&cafe.id, |cafe| {
                cafe.facility_ids.retain(|facility| facility != &id);
                cafe.updated_at = now;
            });
            detached += 1;
        }
    }

    tracing::info!(id = %id, cafes_detached = detached, "facility deleted");
    Ok(StatusCode::NO_CONTENT)
}
