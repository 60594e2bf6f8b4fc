//! Review side panel for one claim: open flags and the latest notes

use claims_common::db::{ClaimFlag, ClaimNote};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::sql::{
    claim_exists, note_count, unresolved_flag_count, FLAG_SELECT, NOTE_SELECT,
};

/// How many notes the panel shows
pub const RECENT_NOTES_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFlagsNotesQuery {
    pub claim_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimFlagsNotesResponse {
    pub claim_id: i64,
    pub flags: Vec<ClaimFlag>,
    pub notes: Vec<ClaimNote>,
    pub flag_count: i64,
    pub note_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimFlagsNotesError {
    #[error("Claim {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ClaimFlagsNotesResponse, ClaimFlagsNotesError>> for ClaimFlagsNotesQuery {}

impl crate::cqrs::middleware::Query for ClaimFlagsNotesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    query: ClaimFlagsNotesQuery,
) -> Result<ClaimFlagsNotesResponse, ClaimFlagsNotesError> {
    let mut conn = pool.acquire().await?;

    if !claim_exists(&mut conn, query.claim_id).await? {
        return Err(ClaimFlagsNotesError::NotFound(query.claim_id));
    }

    let flags: Vec<ClaimFlag> = sqlx::query_as(&format!(
        "{} WHERE f.claim_id = ?1 AND f.resolved = 0 ORDER BY f.created_at DESC, f.id DESC",
        FLAG_SELECT
    ))
    .bind(query.claim_id)
    .fetch_all(&mut *conn)
    .await?;

    let notes: Vec<ClaimNote> = sqlx::query_as(&format!(
        "{} WHERE n.claim_id = ?1 ORDER BY n.created_at DESC, n.id DESC LIMIT ?2",
        NOTE_SELECT
    ))
    .bind(query.claim_id)
    .bind(RECENT_NOTES_LIMIT)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ClaimFlagsNotesResponse {
        claim_id: query.claim_id,
        flags,
        notes,
        flag_count: unresolved_flag_count(&mut conn, query.claim_id).await?,
        note_count: note_count(&mut conn, query.claim_id).await?,
    })
}
