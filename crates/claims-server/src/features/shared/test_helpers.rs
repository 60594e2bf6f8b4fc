//! Test fixtures for database tests
//!
//! ```rust,ignore
//! let pool = connect_in_memory().await?;
//! let user = insert_user(&pool, "reviewer").await?;
//! TestClaim::new(7).billed("1200.00").status("denied").insert(&pool).await?;
//! ```

use claims_common::money;
use sqlx::SqlitePool;

/// Builder for claim rows
#[derive(Debug, Clone)]
pub struct TestClaim {
    pub claim_id: i64,
    pub patient_name: String,
    pub billed_cents: i64,
    pub paid_cents: i64,
    pub status: String,
    pub insurer_name: String,
    pub discharge_date: String,
}

impl TestClaim {
    pub fn new(claim_id: i64) -> Self {
        Self {
            claim_id,
            patient_name: format!("Patient {}", claim_id),
            billed_cents: 0,
            paid_cents: 0,
            status: "pending".to_string(),
            insurer_name: "Acme Health".to_string(),
            discharge_date: "2024-01-15".to_string(),
        }
    }

    pub fn billed(mut self, amount: &str) -> Self {
        self.billed_cents = cents(amount);
        self
    }

    pub fn paid(mut self, amount: &str) -> Self {
        self.paid_cents = cents(amount);
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn insurer(mut self, insurer: &str) -> Self {
        self.insurer_name = insurer.to_string();
        self
    }

    pub fn discharged(mut self, date: &str) -> Self {
        self.discharge_date = date.to_string();
        self
    }

    pub async fn insert(self, pool: &SqlitePool) -> sqlx::Result<i64> {
        sqlx::query(
            "INSERT INTO claims (claim_id, patient_name, billed_amount_cents, paid_amount_cents,
                 status, insurer_name, discharge_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(self.claim_id)
        .bind(&self.patient_name)
        .bind(self.billed_cents)
        .bind(self.paid_cents)
        .bind(&self.status)
        .bind(&self.insurer_name)
        .bind(&self.discharge_date)
        .execute(pool)
        .await?;
        Ok(self.claim_id)
    }
}

fn cents(amount: &str) -> i64 {
    money::parse_amount(amount)
        .and_then(money::to_cents)
        .unwrap_or_else(|e| panic!("bad test amount {}: {}", amount, e))
}

/// Insert a reviewer and return its id
pub async fn insert_user(pool: &SqlitePool, username: &str) -> sqlx::Result<i64> {
    let result = sqlx::query("INSERT INTO users (username, created_at) VALUES (?1, ?2)")
        .bind(username)
        .bind(chrono::Utc::now())
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}
