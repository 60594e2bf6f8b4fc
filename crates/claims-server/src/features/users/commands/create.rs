//! Create user command
//!
//! Reviewer accounts exist only so flags and notes have an author.

use chrono::Utc;
use claims_common::db::User;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Longest accepted username, in characters
pub const MAX_USERNAME_LENGTH: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserCommand {
    pub username: String,
}

pub type CreateUserResponse = User;

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("Username is required and cannot be empty")]
    UsernameRequired,

    #[error("Username must be between 1 and {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    #[error("User '{0}' already exists")]
    DuplicateUsername(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CreateUserResponse, CreateUserError>> for CreateUserCommand {}

impl crate::cqrs::middleware::Command for CreateUserCommand {}

impl CreateUserCommand {
    /// Trimmed username if it is acceptable
    pub fn validate(&self) -> Result<&str, CreateUserError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(CreateUserError::UsernameRequired);
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(CreateUserError::UsernameTooLong);
        }
        Ok(username)
    }
}

#[tracing::instrument(skip(pool, command), fields(username = %command.username))]
pub async fn handle(
    pool: SqlitePool,
    command: CreateUserCommand,
) -> Result<CreateUserResponse, CreateUserError> {
    let username = command.validate()?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (username, created_at) VALUES (?1, ?2)
         RETURNING id, username, created_at",
    )
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return CreateUserError::DuplicateUsername(username.to_string());
            }
        }
        CreateUserError::Database(e)
    })?;

    tracing::info!(user_id = user.id, "User created");
    Ok(user)
}
