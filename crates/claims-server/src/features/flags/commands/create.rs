//! Create flag command
//!
//! A user may hold at most one unresolved flag per claim with the same
//! reason. Resolved flags do not count, so a reason can be raised again
//! once the previous flag was closed.

use chrono::Utc;
use claims_common::db::ClaimFlag;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::{
    sql::{claim_exists, find_flag, unresolved_flag_count},
    user::find_username,
};

/// Reason used when the request does not give one
pub const DEFAULT_FLAG_REASON: &str = "Flagged for review";

/// Longest accepted reason, in characters
pub const MAX_REASON_LENGTH: usize = 500;

/// Command to flag a claim for review
///
/// `claim_id` and `user_id` come from the path and the `x-user-id` header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFlagCommand {
    #[serde(skip_deserializing)]
    pub claim_id: i64,

    #[serde(skip_deserializing)]
    pub user_id: i64,

    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFlagResponse {
    #[serde(flatten)]
    pub flag: ClaimFlag,
    /// Unresolved flags on the claim after the insert
    pub flag_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateFlagError {
    #[error("Reason must be at most {MAX_REASON_LENGTH} characters")]
    ReasonTooLong,

    #[error("Claim {0} not found")]
    ClaimNotFound(i64),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("You already have an unresolved flag with this reason on claim {0}")]
    DuplicateFlag(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CreateFlagResponse, CreateFlagError>> for CreateFlagCommand {}

impl crate::cqrs::middleware::Command for CreateFlagCommand {}

impl CreateFlagCommand {
    pub fn validate(&self) -> Result<(), CreateFlagError> {
        if self.reason().chars().count() > MAX_REASON_LENGTH {
            return Err(CreateFlagError::ReasonTooLong);
        }
        Ok(())
    }

    /// Trimmed reason, or the default when blank
    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_FLAG_REASON)
    }
}

#[tracing::instrument(
    skip(pool, command),
    fields(claim_id = command.claim_id, user_id = command.user_id)
)]
pub async fn handle(
    pool: SqlitePool,
    command: CreateFlagCommand,
) -> Result<CreateFlagResponse, CreateFlagError> {
    command.validate()?;
    let reason = command.reason();

    let mut tx = pool.begin().await?;

    if !claim_exists(&mut tx, command.claim_id).await? {
        return Err(CreateFlagError::ClaimNotFound(command.claim_id));
    }
    if find_username(&mut tx, command.user_id).await?.is_none() {
        return Err(CreateFlagError::UnknownUser(command.user_id));
    }

    let duplicate: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM claim_flags
         WHERE claim_id = ?1 AND user_id = ?2 AND reason = ?3 AND resolved = 0",
    )
    .bind(command.claim_id)
    .bind(command.user_id)
    .bind(reason)
    .fetch_optional(&mut *tx)
    .await?;
    if duplicate.is_some() {
        return Err(CreateFlagError::DuplicateFlag(command.claim_id));
    }

    let flag_id = sqlx::query(
        "INSERT INTO claim_flags (claim_id, user_id, reason, created_at, resolved)
         VALUES (?1, ?2, ?3, ?4, 0)",
    )
    .bind(command.claim_id)
    .bind(command.user_id)
    .bind(reason)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let flag = find_flag(&mut tx, flag_id).await?;
    let flag_count = unresolved_flag_count(&mut tx, command.claim_id).await?;
    tx.commit().await?;

    tracing::info!(flag_id, flag_count, "Flag created");
    Ok(CreateFlagResponse { flag, flag_count })
}
