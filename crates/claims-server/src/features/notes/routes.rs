//! Note API routes
//!
//! - `POST /api/v1/claims/:claim_id/notes` - Add a note
//! - `PUT /api/v1/claims/:claim_id/notes/:note_id` - Edit a note
//!
//! Both require the `x-user-id` header.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::ActingUser;

use super::commands::{CreateNoteCommand, CreateNoteError, UpdateNoteCommand, UpdateNoteError};

// ============================================================================
// Router Configuration
// ============================================================================

/// Routes carry their full `/claims/...` path and are merged, not nested
pub fn notes_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/claims/:claim_id/notes", post(create_note))
        .route("/claims/:claim_id/notes/:note_id", put(update_note))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Add a note to a claim
///
/// # Endpoint
///
/// `POST /api/v1/claims/:claim_id/notes`
///
/// # Request Body
///
/// ```json
/// { "content": "Called the insurer, appeal pending" }
/// ```
///
/// # Response
///
/// - `201 Created` - The note plus the claim's `note_count`
/// - `400 Bad Request` - Blank or oversized content
/// - `401 Unauthorized` - Missing or unknown `x-user-id`
/// - `404 Not Found` - No such claim
#[tracing::instrument(skip(pool, user, command))]
async fn create_note(
    State(pool): State<SqlitePool>,
    user: ActingUser,
    Path(claim_id): Path<i64>,
    Json(mut command): Json<CreateNoteCommand>,
) -> Result<Response, NotesApiError> {
    command.claim_id = claim_id;
    command.user_id = user.id();

    let response = super::commands::create::handle(pool, command).await?;

    tracing::info!(note_id = response.note.id, "Note created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Edit a note
///
/// # Endpoint
///
/// `PUT /api/v1/claims/:claim_id/notes/:note_id`
///
/// # Request Body
///
/// ```json
/// { "content": "Appeal approved" }
/// ```
///
/// # Response
///
/// - `200 OK` - The updated note
/// - `400 Bad Request` - Blank or oversized content
/// - `401 Unauthorized` - Missing or unknown `x-user-id`
/// - `403 Forbidden` - Caller is not the author
/// - `404 Not Found` - No such note on this claim
#[tracing::instrument(skip(pool, user, command))]
async fn update_note(
    State(pool): State<SqlitePool>,
    user: ActingUser,
    Path((claim_id, note_id)): Path<(i64, i64)>,
    Json(mut command): Json<UpdateNoteCommand>,
) -> Result<Response, NotesApiError> {
    command.claim_id = claim_id;
    command.note_id = note_id;
    command.user_id = user.id();

    let response = super::commands::update::handle(pool, command).await?;

    tracing::info!(note_id, "Note updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum NotesApiError {
    Create(CreateNoteError),
    Update(UpdateNoteError),
}

impl From<CreateNoteError> for NotesApiError {
    fn from(err: CreateNoteError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateNoteError> for NotesApiError {
    fn from(err: UpdateNoteError) -> Self {
        Self::Update(err)
    }
}

impl IntoResponse for NotesApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            NotesApiError::Create(CreateNoteError::Content(_))
            | NotesApiError::Update(UpdateNoteError::Content(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },
            NotesApiError::Create(CreateNoteError::UnknownUser(_))
            | NotesApiError::Update(UpdateNoteError::UnknownUser(_)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            },
            NotesApiError::Update(UpdateNoteError::NotAuthor(_)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN")
            },
            NotesApiError::Create(CreateNoteError::ClaimNotFound(_))
            | NotesApiError::Update(UpdateNoteError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            NotesApiError::Create(CreateNoteError::Database(_))
            | NotesApiError::Update(UpdateNoteError::Database(_)) => {
                tracing::error!("Database error during note command: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response();
            },
        };

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}

impl std::fmt::Display for NotesApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
            Self::Update(e) => write!(f, "{}", e),
        }
    }
}
