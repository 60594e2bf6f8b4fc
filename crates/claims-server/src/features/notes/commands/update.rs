//! Update note command
//!
//! Only the author may edit a note. Editing replaces the content and bumps
//! `updated_at`; `created_at` is untouched.

use chrono::Utc;
use claims_common::db::ClaimNote;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{validate_content, ContentValidationError};
use crate::features::shared::{sql::find_note, user::find_username};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteCommand {
    #[serde(skip_deserializing)]
    pub claim_id: i64,

    #[serde(skip_deserializing)]
    pub note_id: i64,

    #[serde(skip_deserializing)]
    pub user_id: i64,

    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateNoteResponse {
    #[serde(flatten)]
    pub note: ClaimNote,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateNoteError {
    #[error(transparent)]
    Content(#[from] ContentValidationError),

    #[error("Note {note_id} not found on claim {claim_id}")]
    NotFound { claim_id: i64, note_id: i64 },

    #[error("Only the author can edit note {0}")]
    NotAuthor(i64),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<UpdateNoteResponse, UpdateNoteError>> for UpdateNoteCommand {}

impl crate::cqrs::middleware::Command for UpdateNoteCommand {}

impl UpdateNoteCommand {
    pub fn validate(&self) -> Result<&str, UpdateNoteError> {
        Ok(validate_content(&self.content)?)
    }
}

#[tracing::instrument(
    skip(pool, command),
    fields(claim_id = command.claim_id, note_id = command.note_id, user_id = command.user_id)
)]
pub async fn handle(
    pool: SqlitePool,
    command: UpdateNoteCommand,
) -> Result<UpdateNoteResponse, UpdateNoteError> {
    let content = command.validate()?;

    let mut tx = pool.begin().await?;

    if find_username(&mut tx, command.user_id).await?.is_none() {
        return Err(UpdateNoteError::UnknownUser(command.user_id));
    }

    let author: Option<i64> =
        sqlx::query_scalar("SELECT user_id FROM claim_notes WHERE id = ?1 AND claim_id = ?2")
            .bind(command.note_id)
            .bind(command.claim_id)
            .fetch_optional(&mut *tx)
            .await?;

    match author {
        None => {
            return Err(UpdateNoteError::NotFound {
                claim_id: command.claim_id,
                note_id: command.note_id,
            })
        },
        Some(author) if author != command.user_id => {
            return Err(UpdateNoteError::NotAuthor(command.note_id))
        },
        Some(_) => {},
    }

    sqlx::query("UPDATE claim_notes SET content = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(content)
        .bind(Utc::now())
        .bind(command.note_id)
        .execute(&mut *tx)
        .await?;

    let note = find_note(&mut tx, command.note_id).await?;
    tx.commit().await?;

    tracing::info!("Note updated");
    Ok(UpdateNoteResponse { note })
}
