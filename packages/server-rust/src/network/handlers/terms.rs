//! Taxonomy term listing and admin mutation handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use ngopi_core::{ErrorEnvelope, ListEnvelope, RawQuery};
use uuid::Uuid;

use super::{now_millis, ApiError, AppState};
use crate::catalog::{Term, TermDraft};
use crate::network::auth::AdminAccess;

/// Lists taxonomy terms with filtering, search, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/terms",
    tag = "terms",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number, defaults to 1"),
        ("limit" = Option<u32>, Query, description = "Page size, 1..=100, defaults to 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match over the name"),
        ("orderBy" = Option<String>, Query, description = "Sort key: name or created_at"),
        ("orderDir" = Option<String>, Query, description = "asc or desc"),
        ("vocabulary" = Option<String>, Query, description = "Vocabulary keys, e.g. brew-method"),
    ),
    responses(
        (status = 200, description = "One page of terms", body = ListEnvelope<Term>),
        (status = 400, description = "Malformed reserved parameter", body = ErrorEnvelope),
    ),
)]
pub async fn list_terms(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListEnvelope<Term>>, ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let query = state.terms.spec().compile(&RawQuery::from_pairs(pairs))?;
    let page = state.terms.query(&query).await?;
    Ok(Json(page.into()))
}

/// Creates a term. Admin only.
#[utoipa::path(
    post,
    path = "/api/terms",
    tag = "terms",
    request_body = TermDraft,
    security(("admin_token" = [])),
    responses(
        (status = 201, description = "Created term", body = Term),
        (status = 400, description = "Rejected field", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid admin token", body = ErrorEnvelope),
    ),
)]
pub async fn create_term(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Json(draft): Json<TermDraft>,
) -> Result<(StatusCode, Json<Term>), ApiError> {
    let _guard = state.shutdown.in_flight_guard();
    let term = draft.build(Uuid::new_v4().to_string(), now_millis())?;
    state.catalog.terms.insert(term.clone());

    tracing::info!(id = %term.id, vocabulary = %term.vocabulary, "term created");
    Ok((StatusCode::CREATED, Json(term)))
}
