//! Acting user for write operations
//!
//! Callers name themselves with the `x-user-id` header. The header is
//! trusted; commands still check that the user row exists.

use axum::{async_trait, extract::FromRequestParts};
use http::request::Parts;
use sqlx::SqliteConnection;

use crate::error::AppError;

/// Header carrying the acting user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// User id taken from the request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub i64);

impl ActingUser {
    pub fn id(self) -> i64 {
        self.0
    }

    /// Parse a raw header value
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        raw.trim()
            .parse::<i64>()
            .map(ActingUser)
            .map_err(|_| AppError::BadRequest(format!("Invalid {} header: '{}'", USER_ID_HEADER, raw)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(USER_ID_HEADER).ok_or_else(|| {
            AppError::Unauthorized(format!("Missing {} header", USER_ID_HEADER))
        })?;

        let raw = value
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} header", USER_ID_HEADER)))?;

        ActingUser::parse(raw)
    }
}

/// Username for an id, if the user exists
pub async fn find_username(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT username FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}
