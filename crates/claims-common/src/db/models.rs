//! Row models for the claims schema

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::types::{money, ClaimStatus};

/// Column list matching [`Claim`]'s `FromRow` implementation
pub const CLAIM_COLUMNS: &str = "claim_id, patient_name, billed_amount_cents, \
     paid_amount_cents, status, insurer_name, discharge_date";

/// A billing record submitted to an insurer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: i64,
    pub patient_name: String,
    pub billed_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: ClaimStatus,
    pub insurer_name: String,
    pub discharge_date: NaiveDate,
}

impl Claim {
    /// Amount billed but not paid
    pub fn underpayment(&self) -> Decimal {
        self.billed_amount - self.paid_amount
    }
}

impl<'r> FromRow<'r, SqliteRow> for Claim {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        // blank rows read as the column default
        let raw_status: String = row.try_get("status")?;
        let status = ClaimStatus::parse(&raw_status).unwrap_or_default();

        Ok(Self {
            claim_id: row.try_get("claim_id")?,
            patient_name: row.try_get("patient_name")?,
            billed_amount: money::from_cents(row.try_get("billed_amount_cents")?),
            paid_amount: money::from_cents(row.try_get("paid_amount_cents")?),
            status,
            insurer_name: row.try_get("insurer_name")?,
            discharge_date: row.try_get("discharge_date")?,
        })
    }
}

/// A procedure-code line item under a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClaimDetail {
    pub id: i64,
    pub claim_id: i64,
    pub cpt_code: String,
    pub denial_reason: Option<String>,
}

/// Reviewer account referenced by flags and notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A review flag raised on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClaimFlag {
    pub id: i64,
    pub claim_id: i64,
    pub user_id: i64,
    pub username: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i64>,
}

/// A free-text annotation on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClaimNote {
    pub id: i64,
    pub claim_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
