//! SQL used by the loader
//!
//! Every function takes the connection of the surrounding transaction, so
//! nothing here commits on its own.

use claims_common::db::{Claim, ClaimDetail, CLAIM_COLUMNS};
use claims_common::{money, CommonError};
use sqlx::SqliteConnection;

use crate::error::Result;

/// Row counts removed by [`clear_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleared {
    pub claims: u64,
    pub details: u64,
}

/// Delete every detail and claim. Flags and notes go with their claims.
pub async fn clear_all(conn: &mut SqliteConnection) -> Result<Cleared> {
    let details = sqlx::query("DELETE FROM claim_details")
        .execute(&mut *conn)
        .await?
        .rows_affected();
    let claims = sqlx::query("DELETE FROM claims")
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(Cleared { claims, details })
}

pub async fn claim_exists(conn: &mut SqliteConnection, claim_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT claim_id FROM claims WHERE claim_id = ?1")
        .bind(claim_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

fn cents(claim: &Claim) -> Result<(i64, i64)> {
    let billed = money::to_cents(claim.billed_amount).map_err(CommonError::from)?;
    let paid = money::to_cents(claim.paid_amount).map_err(CommonError::from)?;
    Ok((billed, paid))
}

pub async fn insert_claim(conn: &mut SqliteConnection, claim: &Claim) -> Result<()> {
    let (billed, paid) = cents(claim)?;
    sqlx::query(
        "INSERT INTO claims (claim_id, patient_name, billed_amount_cents, paid_amount_cents, \
         status, insurer_name, discharge_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(claim.claim_id)
    .bind(&claim.patient_name)
    .bind(billed)
    .bind(paid)
    .bind(claim.status.as_str())
    .bind(&claim.insurer_name)
    .bind(claim.discharge_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Replace every tracked field of an existing claim
pub async fn update_claim(conn: &mut SqliteConnection, claim: &Claim) -> Result<()> {
    let (billed, paid) = cents(claim)?;
    sqlx::query(
        "UPDATE claims SET patient_name = ?2, billed_amount_cents = ?3, paid_amount_cents = ?4, \
         status = ?5, insurer_name = ?6, discharge_date = ?7 WHERE claim_id = ?1",
    )
    .bind(claim.claim_id)
    .bind(&claim.patient_name)
    .bind(billed)
    .bind(paid)
    .bind(claim.status.as_str())
    .bind(&claim.insurer_name)
    .bind(claim.discharge_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Look up a detail by its composite key
pub async fn find_detail_id(
    conn: &mut SqliteConnection,
    claim_id: i64,
    cpt_code: &str,
) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT id FROM claim_details WHERE claim_id = ?1 AND cpt_code = ?2")
        .bind(claim_id)
        .bind(cpt_code)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn insert_detail(
    conn: &mut SqliteConnection,
    claim_id: i64,
    cpt_code: &str,
    denial_reason: Option<&str>,
) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO claim_details (claim_id, cpt_code, denial_reason) VALUES (?1, ?2, ?3)",
    )
    .bind(claim_id)
    .bind(cpt_code)
    .bind(denial_reason)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// The composite key is fixed, so only the denial reason changes
pub async fn update_detail(
    conn: &mut SqliteConnection,
    detail_id: i64,
    denial_reason: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE claim_details SET denial_reason = ?2 WHERE id = ?1")
        .bind(detail_id)
        .bind(denial_reason)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn all_claims(conn: &mut SqliteConnection) -> Result<Vec<Claim>> {
    let claims = sqlx::query_as(&format!(
        "SELECT {} FROM claims ORDER BY claim_id",
        CLAIM_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(claims)
}

pub async fn all_details(conn: &mut SqliteConnection) -> Result<Vec<ClaimDetail>> {
    let details = sqlx::query_as(
        "SELECT id, claim_id, cpt_code, denial_reason FROM claim_details ORDER BY claim_id, id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(details)
}
