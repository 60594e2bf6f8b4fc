//! Flag API routes
//!
//! - `POST /api/v1/claims/:claim_id/flags` - Flag a claim for review
//! - `POST /api/v1/claims/:claim_id/flags/:flag_id/resolve` - Resolve a flag
//!
//! Both require the `x-user-id` header.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::ActingUser;

use super::commands::{CreateFlagCommand, CreateFlagError, ResolveFlagCommand, ResolveFlagError};

// ============================================================================
// Router Configuration
// ============================================================================

/// Routes carry their full `/claims/...` path and are merged, not nested
pub fn flags_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/claims/:claim_id/flags", post(create_flag))
        .route("/claims/:claim_id/flags/:flag_id/resolve", post(resolve_flag))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Flag a claim
///
/// # Endpoint
///
/// `POST /api/v1/claims/:claim_id/flags`
///
/// # Request Body
///
/// ```json
/// { "reason": "Possible duplicate billing" }
/// ```
///
/// The body, and `reason` within it, are optional; the reason defaults to
/// "Flagged for review".
///
/// # Response
///
/// - `201 Created` - The flag plus the claim's unresolved `flag_count`
/// - `401 Unauthorized` - Missing or unknown `x-user-id`
/// - `404 Not Found` - No such claim
/// - `409 Conflict` - Same user already has an unresolved flag with this reason
#[tracing::instrument(skip(pool, user, body))]
async fn create_flag(
    State(pool): State<SqlitePool>,
    user: ActingUser,
    Path(claim_id): Path<i64>,
    body: Option<Json<CreateFlagCommand>>,
) -> Result<Response, FlagsApiError> {
    let mut command = body.map(|Json(command)| command).unwrap_or_default();
    command.claim_id = claim_id;
    command.user_id = user.id();

    let response = super::commands::create::handle(pool, command).await?;

    tracing::info!(flag_id = response.flag.id, "Flag created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Resolve a flag
///
/// # Endpoint
///
/// `POST /api/v1/claims/:claim_id/flags/:flag_id/resolve`
///
/// # Response
///
/// - `200 OK` - The resolved flag plus the remaining `flag_count`
/// - `401 Unauthorized` - Missing or unknown `x-user-id`
/// - `404 Not Found` - No such flag on this claim
/// - `409 Conflict` - Flag already resolved
#[tracing::instrument(skip(pool, user))]
async fn resolve_flag(
    State(pool): State<SqlitePool>,
    user: ActingUser,
    Path((claim_id, flag_id)): Path<(i64, i64)>,
) -> Result<Response, FlagsApiError> {
    let command = ResolveFlagCommand {
        claim_id,
        flag_id,
        user_id: user.id(),
    };

    let response = super::commands::resolve::handle(pool, command).await?;

    tracing::info!(flag_id, "Flag resolved via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum FlagsApiError {
    Create(CreateFlagError),
    Resolve(ResolveFlagError),
}

impl From<CreateFlagError> for FlagsApiError {
    fn from(err: CreateFlagError) -> Self {
        Self::Create(err)
    }
}

impl From<ResolveFlagError> for FlagsApiError {
    fn from(err: ResolveFlagError) -> Self {
        Self::Resolve(err)
    }
}

impl IntoResponse for FlagsApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            FlagsApiError::Create(CreateFlagError::ReasonTooLong) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            FlagsApiError::Create(CreateFlagError::UnknownUser(_))
            | FlagsApiError::Resolve(ResolveFlagError::UnknownUser(_)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            },
            FlagsApiError::Create(CreateFlagError::ClaimNotFound(_))
            | FlagsApiError::Resolve(ResolveFlagError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            FlagsApiError::Create(CreateFlagError::DuplicateFlag(_))
            | FlagsApiError::Resolve(ResolveFlagError::AlreadyResolved(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            },
            FlagsApiError::Create(CreateFlagError::Database(_))
            | FlagsApiError::Resolve(ResolveFlagError::Database(_)) => {
                tracing::error!("Database error during flag command: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response();
            },
        };

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}

impl std::fmt::Display for FlagsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
            Self::Resolve(e) => write!(f, "{}", e),
        }
    }
}
