//! Create note command

use chrono::Utc;
use claims_common::db::ClaimNote;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{validate_content, ContentValidationError};
use crate::features::shared::{
    sql::{claim_exists, find_note, note_count},
    user::find_username,
};

/// Command to annotate a claim
///
/// `claim_id` and `user_id` come from the path and the `x-user-id` header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteCommand {
    #[serde(skip_deserializing)]
    pub claim_id: i64,

    #[serde(skip_deserializing)]
    pub user_id: i64,

    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteResponse {
    #[serde(flatten)]
    pub note: ClaimNote,
    /// Notes on the claim after the insert
    pub note_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateNoteError {
    #[error(transparent)]
    Content(#[from] ContentValidationError),

    #[error("Claim {0} not found")]
    ClaimNotFound(i64),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CreateNoteResponse, CreateNoteError>> for CreateNoteCommand {}

impl crate::cqrs::middleware::Command for CreateNoteCommand {}

impl CreateNoteCommand {
    pub fn validate(&self) -> Result<&str, CreateNoteError> {
        Ok(validate_content(&self.content)?)
    }
}

#[tracing::instrument(
    skip(pool, command),
    fields(claim_id = command.claim_id, user_id = command.user_id)
)]
pub async fn handle(
    pool: SqlitePool,
    command: CreateNoteCommand,
) -> Result<CreateNoteResponse, CreateNoteError> {
    let content = command.validate()?;

    let mut tx = pool.begin().await?;

    if !claim_exists(&mut tx, command.claim_id).await? {
        return Err(CreateNoteError::ClaimNotFound(command.claim_id));
    }
    if find_username(&mut tx, command.user_id).await?.is_none() {
        return Err(CreateNoteError::UnknownUser(command.user_id));
    }

    let now = Utc::now();
    let note_id = sqlx::query(
        "INSERT INTO claim_notes (claim_id, user_id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
    )
    .bind(command.claim_id)
    .bind(command.user_id)
    .bind(content)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let note = find_note(&mut tx, note_id).await?;
    let note_count = note_count(&mut tx, command.claim_id).await?;
    tx.commit().await?;

    tracing::info!(note_id, note_count, "Note created");
    Ok(CreateNoteResponse { note, note_count })
}
