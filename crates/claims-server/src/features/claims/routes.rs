//! Claim API routes
//!
//! - `GET /api/v1/claims` - List claims with filters and pagination
//! - `GET /api/v1/claims/filters` - Status and insurer filter choices
//! - `GET /api/v1/claims/:claim_id` - One claim with details, flags and notes
//! - `GET /api/v1/claims/:claim_id/flags-notes` - Open flags and recent notes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::queries::{
    ClaimFiltersError, ClaimFiltersQuery, ClaimFlagsNotesError, ClaimFlagsNotesQuery,
    GetClaimError, GetClaimQuery, ListClaimsError, ListClaimsQuery,
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn claims_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", get(list_claims))
        .route("/filters", get(claim_filters))
        .route("/:claim_id", get(get_claim))
        .route("/:claim_id/flags-notes", get(claim_flags_notes))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List claims
///
/// # Endpoint
///
/// `GET /api/v1/claims?search=doe&status=under_review&insurer=acme&min_billed=100&page=1&per_page=25`
///
/// # Response
///
/// - `200 OK` - Claims with pagination metadata
/// - `400 Bad Request` - Invalid pagination parameters
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(
    skip(pool, query),
    fields(page = ?query.page, per_page = ?query.per_page, status = ?query.status)
)]
async fn list_claims(
    State(pool): State<SqlitePool>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Response, ClaimsApiError> {
    let response = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Claims listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

/// Filter choices
///
/// # Endpoint
///
/// `GET /api/v1/claims/filters`
///
/// # Response
///
/// - `200 OK` - `{"statuses": [{"value", "label"}], "insurers": [...]}`
#[tracing::instrument(skip(pool))]
async fn claim_filters(State(pool): State<SqlitePool>) -> Result<Response, ClaimsApiError> {
    let response = super::queries::filters::handle(pool, ClaimFiltersQuery).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// One claim with its details, flags and notes
///
/// # Endpoint
///
/// `GET /api/v1/claims/:claim_id`
///
/// # Response
///
/// - `200 OK` - Claim found
/// - `404 Not Found` - No such claim
#[tracing::instrument(skip(pool))]
async fn get_claim(
    State(pool): State<SqlitePool>,
    Path(claim_id): Path<i64>,
) -> Result<Response, ClaimsApiError> {
    let response = super::queries::get::handle(pool, GetClaimQuery { claim_id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Open flags and the ten most recent notes
///
/// # Endpoint
///
/// `GET /api/v1/claims/:claim_id/flags-notes`
///
/// # Response
///
/// - `200 OK` - Flags, notes, `flag_count` and `note_count`
/// - `404 Not Found` - No such claim
#[tracing::instrument(skip(pool))]
async fn claim_flags_notes(
    State(pool): State<SqlitePool>,
    Path(claim_id): Path<i64>,
) -> Result<Response, ClaimsApiError> {
    let response =
        super::queries::flags_notes::handle(pool, ClaimFlagsNotesQuery { claim_id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum ClaimsApiError {
    List(ListClaimsError),
    Filters(ClaimFiltersError),
    Get(GetClaimError),
    FlagsNotes(ClaimFlagsNotesError),
}

impl From<ListClaimsError> for ClaimsApiError {
    fn from(err: ListClaimsError) -> Self {
        Self::List(err)
    }
}

impl From<ClaimFiltersError> for ClaimsApiError {
    fn from(err: ClaimFiltersError) -> Self {
        Self::Filters(err)
    }
}

impl From<GetClaimError> for ClaimsApiError {
    fn from(err: GetClaimError) -> Self {
        Self::Get(err)
    }
}

impl From<ClaimFlagsNotesError> for ClaimsApiError {
    fn from(err: ClaimFlagsNotesError) -> Self {
        Self::FlagsNotes(err)
    }
}

impl IntoResponse for ClaimsApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ClaimsApiError::List(ListClaimsError::Pagination(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            ClaimsApiError::Get(GetClaimError::NotFound(_))
            | ClaimsApiError::FlagsNotes(ClaimFlagsNotesError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            ClaimsApiError::List(ListClaimsError::Database(_))
            | ClaimsApiError::Filters(ClaimFiltersError::Database(_))
            | ClaimsApiError::Get(GetClaimError::Database(_))
            | ClaimsApiError::FlagsNotes(ClaimFlagsNotesError::Database(_)) => {
                tracing::error!("Database error during claim query: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response();
            },
        };

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}

impl std::fmt::Display for ClaimsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(e) => write!(f, "{}", e),
            Self::Filters(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
            Self::FlagsNotes(e) => write!(f, "{}", e),
        }
    }
}
