//! Resolve flag command

use chrono::Utc;
use claims_common::db::ClaimFlag;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::{
    sql::{find_flag, unresolved_flag_count},
    user::find_username,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveFlagCommand {
    pub claim_id: i64,
    pub flag_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveFlagResponse {
    #[serde(flatten)]
    pub flag: ClaimFlag,
    /// Unresolved flags left on the claim
    pub flag_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveFlagError {
    #[error("Flag {flag_id} not found on claim {claim_id}")]
    NotFound { claim_id: i64, flag_id: i64 },

    #[error("Flag {0} is already resolved")]
    AlreadyResolved(i64),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ResolveFlagResponse, ResolveFlagError>> for ResolveFlagCommand {}

impl crate::cqrs::middleware::Command for ResolveFlagCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    command: ResolveFlagCommand,
) -> Result<ResolveFlagResponse, ResolveFlagError> {
    let mut tx = pool.begin().await?;

    if find_username(&mut tx, command.user_id).await?.is_none() {
        return Err(ResolveFlagError::UnknownUser(command.user_id));
    }

    let resolved: Option<bool> =
        sqlx::query_scalar("SELECT resolved FROM claim_flags WHERE id = ?1 AND claim_id = ?2")
            .bind(command.flag_id)
            .bind(command.claim_id)
            .fetch_optional(&mut *tx)
            .await?;

    match resolved {
        None => {
            return Err(ResolveFlagError::NotFound {
                claim_id: command.claim_id,
                flag_id: command.flag_id,
            })
        },
        Some(true) => return Err(ResolveFlagError::AlreadyResolved(command.flag_id)),
        Some(false) => {},
    }

    sqlx::query(
        "UPDATE claim_flags SET resolved = 1, resolved_at = ?1, resolved_by = ?2
         WHERE id = ?3 AND resolved = 0",
    )
    .bind(Utc::now())
    .bind(command.user_id)
    .bind(command.flag_id)
    .execute(&mut *tx)
    .await?;

    let flag = find_flag(&mut tx, command.flag_id).await?;
    let flag_count = unresolved_flag_count(&mut tx, command.claim_id).await?;
    tx.commit().await?;

    tracing::info!(flag_count, "Flag resolved");
    Ok(ResolveFlagResponse { flag, flag_count })
}
