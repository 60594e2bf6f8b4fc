//! Filter choices for the claim list

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::sql::{status_label, NORMALIZED_STATUS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimFiltersQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChoice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFiltersResponse {
    pub statuses: Vec<StatusChoice>,
    pub insurers: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimFiltersError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ClaimFiltersResponse, ClaimFiltersError>> for ClaimFiltersQuery {}

impl crate::cqrs::middleware::Query for ClaimFiltersQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    _query: ClaimFiltersQuery,
) -> Result<ClaimFiltersResponse, ClaimFiltersError> {
    let mut conn = pool.acquire().await?;

    let keys: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT DISTINCT {0} AS status_key FROM claims
         WHERE TRIM(status) <> '' ORDER BY status_key",
        NORMALIZED_STATUS
    ))
    .fetch_all(&mut *conn)
    .await?;

    let insurers: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT insurer_name FROM claims
         WHERE TRIM(insurer_name) <> '' ORDER BY insurer_name",
    )
    .fetch_all(&mut *conn)
    .await?;

    let statuses = keys
        .into_iter()
        .map(|value| StatusChoice {
            label: status_label(&value),
            value,
        })
        .collect();

    Ok(ClaimFiltersResponse { statuses, insurers })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use claims_common::db::connect_in_memory;

    #[tokio::test]
    async fn test_distinct_sorted_choices() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO claims (claim_id, status, insurer_name, discharge_date) VALUES
                (1, 'under_review', 'Cigna', '2024-01-01'),
                (2, 'Under Review', 'Acme', '2024-01-01'),
                (3, 'paid', 'Acme', '2024-01-01'),
                (4, 'pending', '', '2024-01-01')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let response = handle(pool, ClaimFiltersQuery).await.unwrap();
        let values: Vec<&str> = response.statuses.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["paid", "pending", "under_review"]);
        assert_eq!(response.statuses[2].label, "Under Review");
        assert_eq!(response.insurers, vec!["Acme", "Cigna"]);
    }
}
