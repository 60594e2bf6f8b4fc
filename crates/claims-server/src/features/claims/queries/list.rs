//! List claims query
//!
//! Filtered, paginated claim listing ordered by `claim_id DESC`. Each item
//! carries its unresolved-flag and note counts.

use claims_common::db::Claim;
use claims_common::types::normalize_key;
use mediator::Request;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::features::shared::{
    sql::{like_pattern, money_filter, non_blank, NORMALIZED_STATUS},
    Paginated, PaginationError, PaginationParams,
};

/// Query string of `GET /claims`
///
/// Money bounds arrive as text so that unparseable values can be ignored
/// instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListClaimsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_billed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_billed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimListItem {
    #[serde(flatten)]
    pub claim: Claim,
    pub underpayment: Decimal,
    pub flag_count: i64,
    pub note_count: i64,
}

pub type ListClaimsResponse = Paginated<ClaimListItem>;

#[derive(Debug, thiserror::Error)]
pub enum ListClaimsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListClaimsResponse, ListClaimsError>> for ListClaimsQuery {}

impl crate::cqrs::middleware::Query for ListClaimsQuery {}

/// Bound values shared by the count and page statements
#[derive(Debug, Default, PartialEq, Eq)]
struct Filters {
    search: Option<String>,
    status: Option<String>,
    insurer: Option<String>,
    min_cents: Option<i64>,
    max_cents: Option<i64>,
}

impl ListClaimsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListClaimsError> {
        self.pagination().validate()?;
        Ok(())
    }

    fn filters(&self) -> Filters {
        Filters {
            search: non_blank(self.search.as_deref()).map(like_pattern),
            status: non_blank(self.status.as_deref()).map(normalize_key),
            insurer: non_blank(self.insurer.as_deref()).map(like_pattern),
            min_cents: money_filter(self.min_billed.as_deref()),
            max_cents: money_filter(self.max_billed.as_deref()),
        }
    }
}

#[derive(FromRow)]
struct ClaimListRecord {
    #[sqlx(flatten)]
    claim: Claim,
    flag_count: i64,
    note_count: i64,
}

fn where_clause() -> String {
    format!(
        "WHERE (?1 IS NULL
                OR CAST(c.claim_id AS TEXT) LIKE ?1 ESCAPE '\\'
                OR LOWER(c.patient_name) LIKE ?1 ESCAPE '\\'
                OR LOWER(c.insurer_name) LIKE ?1 ESCAPE '\\')
           AND (?2 IS NULL OR {status} = ?2)
           AND (?3 IS NULL OR LOWER(c.insurer_name) LIKE ?3 ESCAPE '\\')
           AND (?4 IS NULL OR c.billed_amount_cents >= ?4)
           AND (?5 IS NULL OR c.billed_amount_cents <= ?5)",
        status = NORMALIZED_STATUS.replace("status", "c.status"),
    )
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    query: ListClaimsQuery,
) -> Result<ListClaimsResponse, ListClaimsError> {
    query.validate()?;

    let params = query.pagination();
    let filters = query.filters();
    let where_sql = where_clause();

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM claims c {}", where_sql))
        .bind(&filters.search)
        .bind(&filters.status)
        .bind(&filters.insurer)
        .bind(filters.min_cents)
        .bind(filters.max_cents)
        .fetch_one(&pool)
        .await?;

    let records: Vec<ClaimListRecord> = sqlx::query_as(&format!(
        "SELECT c.claim_id, c.patient_name, c.billed_amount_cents, c.paid_amount_cents,
                c.status, c.insurer_name, c.discharge_date,
                (SELECT COUNT(*) FROM claim_flags f
                  WHERE f.claim_id = c.claim_id AND f.resolved = 0) AS flag_count,
                (SELECT COUNT(*) FROM claim_notes n
                  WHERE n.claim_id = c.claim_id) AS note_count
         FROM claims c
         {}
         ORDER BY c.claim_id DESC
         LIMIT ?6 OFFSET ?7",
        where_sql
    ))
    .bind(&filters.search)
    .bind(&filters.status)
    .bind(&filters.insurer)
    .bind(filters.min_cents)
    .bind(filters.max_cents)
    .bind(params.per_page())
    .bind(params.offset())
    .fetch_all(&pool)
    .await?;

    let items = records
        .into_iter()
        .map(|r| ClaimListItem {
            underpayment: r.claim.underpayment(),
            claim: r.claim,
            flag_count: r.flag_count,
            note_count: r.note_count,
        })
        .collect();

    Ok(Paginated::from_items(items, &params, total))
}
