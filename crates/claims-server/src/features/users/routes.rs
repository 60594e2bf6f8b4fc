//! User API routes
//!
//! - `POST /api/v1/users` - Create a reviewer

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{CreateUserCommand, CreateUserError};

pub fn users_routes() -> Router<SqlitePool> {
    Router::new().route("/", post(create_user))
}

/// Create a reviewer
///
/// # Endpoint
///
/// `POST /api/v1/users`
///
/// # Request Body
///
/// ```json
/// { "username": "alice" }
/// ```
///
/// # Response
///
/// - `201 Created` - User created
/// - `400 Bad Request` - Username blank or longer than 150 characters
/// - `409 Conflict` - Username taken
#[tracing::instrument(skip(pool, command), fields(username = %command.username))]
async fn create_user(
    State(pool): State<SqlitePool>,
    Json(command): Json<CreateUserCommand>,
) -> Result<Response, UsersApiError> {
    let user = super::commands::create::handle(pool, command).await?;

    tracing::info!(user_id = user.id, "User created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))).into_response())
}

#[derive(Debug)]
enum UsersApiError {
    Create(CreateUserError),
}

impl From<CreateUserError> for UsersApiError {
    fn from(err: CreateUserError) -> Self {
        Self::Create(err)
    }
}

impl IntoResponse for UsersApiError {
    fn into_response(self) -> Response {
        match self {
            UsersApiError::Create(
                CreateUserError::UsernameRequired | CreateUserError::UsernameTooLong,
            ) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UsersApiError::Create(CreateUserError::DuplicateUsername(ref name)) => {
                let error =
                    ErrorResponse::new("CONFLICT", format!("User '{}' already exists", name));
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            UsersApiError::Create(CreateUserError::Database(_)) => {
                tracing::error!("Database error during user creation: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for UsersApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "{}", e),
        }
    }
}
