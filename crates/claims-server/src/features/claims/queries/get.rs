use claims_common::db::{Claim, ClaimDetail, ClaimFlag, ClaimNote, CLAIM_COLUMNS};
use mediator::Request;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::sql::{FLAG_SELECT, NOTE_SELECT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetClaimQuery {
    pub claim_id: i64,
}

/// A claim with everything attached to it
#[derive(Debug, Clone, Serialize)]
pub struct GetClaimResponse {
    #[serde(flatten)]
    pub claim: Claim,
    pub underpayment: Decimal,
    pub details: Vec<ClaimDetail>,
    pub flags: Vec<ClaimFlag>,
    pub notes: Vec<ClaimNote>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetClaimError {
    #[error("Claim {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<GetClaimResponse, GetClaimError>> for GetClaimQuery {}

impl crate::cqrs::middleware::Query for GetClaimQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    query: GetClaimQuery,
) -> Result<GetClaimResponse, GetClaimError> {
    let mut conn = pool.acquire().await?;

    let claim: Claim = sqlx::query_as(&format!(
        "SELECT {} FROM claims WHERE claim_id = ?1",
        CLAIM_COLUMNS
    ))
    .bind(query.claim_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(GetClaimError::NotFound(query.claim_id))?;

    let details: Vec<ClaimDetail> = sqlx::query_as(
        "SELECT id, claim_id, cpt_code, denial_reason FROM claim_details
         WHERE claim_id = ?1 ORDER BY id",
    )
    .bind(query.claim_id)
    .fetch_all(&mut *conn)
    .await?;

    let flags: Vec<ClaimFlag> = sqlx::query_as(&format!(
        "{} WHERE f.claim_id = ?1 ORDER BY f.created_at DESC, f.id DESC",
        FLAG_SELECT
    ))
    .bind(query.claim_id)
    .fetch_all(&mut *conn)
    .await?;

    let notes: Vec<ClaimNote> = sqlx::query_as(&format!(
        "{} WHERE n.claim_id = ?1 ORDER BY n.created_at DESC, n.id DESC",
        NOTE_SELECT
    ))
    .bind(query.claim_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(GetClaimResponse {
        underpayment: claim.underpayment(),
        claim,
        details,
        flags,
        notes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use claims_common::db::connect_in_memory;

    #[tokio::test]
    async fn test_not_found() {
        let pool = connect_in_memory().await.unwrap();
        let result = handle(pool, GetClaimQuery { claim_id: 404 }).await;
        assert!(matches!(result, Err(GetClaimError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_includes_children_newest_first() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, username, created_at) VALUES (1, 'reviewer', '2024-01-01T00:00:00Z');
             INSERT INTO claims (claim_id, patient_name, billed_amount_cents, paid_amount_cents,
                 status, insurer_name, discharge_date)
             VALUES (5, 'Ann', 20000, 5000, 'denied', 'Acme', '2024-02-01');
             INSERT INTO claim_details (claim_id, cpt_code, denial_reason) VALUES (5, '99213', 'Not covered');
             INSERT INTO claim_notes (claim_id, user_id, content, created_at, updated_at)
             VALUES (5, 1, 'first', '2024-02-02T10:00:00Z', '2024-02-02T10:00:00Z'),
                    (5, 1, 'second', '2024-02-03T10:00:00Z', '2024-02-03T10:00:00Z');",
        )
        .execute(&pool)
        .await
        .unwrap();

        let response = handle(pool, GetClaimQuery { claim_id: 5 }).await.unwrap();
        assert_eq!(response.underpayment.to_string(), "150.00");
        assert_eq!(response.details.len(), 1);
        assert_eq!(response.details[0].denial_reason.as_deref(), Some("Not covered"));
        assert_eq!(response.notes[0].content, "second");
        assert_eq!(response.notes[0].username, "reviewer");
        assert!(response.flags.is_empty());
    }
}
