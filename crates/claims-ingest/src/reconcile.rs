//! Reconciliation of input records against stored claims and details
//!
//! Each record yields exactly one [`Outcome`]. Problems confined to a record
//! are logged and reported as [`Outcome::Error`]; database failures are
//! returned as errors and abort the surrounding run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::fmt;
use tracing::{debug, error, warn};

use crate::error::{RecordError, Result};
use crate::record::{ClaimRecord, DetailRecord, InputRecord};
use crate::store;

/// How a load treats existing data
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Create new entities; existing ones are skipped unless update-existing is set
    #[default]
    Append,
    /// Create new entities and update existing ones
    Overwrite,
    /// Empty the claims and details tables first, then create
    Clear,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Append => f.write_str("append"),
            LoadMode::Overwrite => f.write_str("overwrite"),
            LoadMode::Clear => f.write_str("clear"),
        }
    }
}

/// Mode plus the append-only update flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub mode: LoadMode,
    pub update_existing: bool,
}

impl Policy {
    pub fn new(mode: LoadMode, update_existing: bool) -> Self {
        Self {
            mode,
            update_existing,
        }
    }

    /// Whether an entity that already exists gets updated (otherwise skipped)
    pub fn updates_existing(&self) -> bool {
        match self.mode {
            LoadMode::Overwrite => true,
            LoadMode::Append => self.update_existing,
            // The store starts empty, so only in-file duplicates land here
            LoadMode::Clear => false,
        }
    }
}

/// Result of reconciling one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Skipped,
    Error,
}

impl Outcome {
    /// Collapse the outcomes of a fanned-out detail record.
    ///
    /// Uniform outcomes are reported as-is; any mix reports `Created`.
    /// A mix of, say, `Skipped` and `Updated` is therefore reported as
    /// `Created` even though nothing was created.
    pub fn combine(outcomes: &[Outcome]) -> Outcome {
        match outcomes.split_first() {
            None => Outcome::Error,
            Some((first, rest)) if rest.iter().all(|o| o == first) => *first,
            Some(_) => Outcome::Created,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => f.write_str("created"),
            Outcome::Updated => f.write_str("updated"),
            Outcome::Skipped => f.write_str("skipped"),
            Outcome::Error => f.write_str("error"),
        }
    }
}

/// Reconcile any decoded record
pub async fn reconcile(
    conn: &mut SqliteConnection,
    record: &InputRecord,
    policy: Policy,
    today: NaiveDate,
) -> Result<Outcome> {
    match record {
        InputRecord::Claim(claim) => reconcile_claim(conn, claim, policy, today).await,
        InputRecord::Detail(detail) => reconcile_detail(conn, detail, policy).await,
    }
}

/// Create, update or skip the claim a record describes
pub async fn reconcile_claim(
    conn: &mut SqliteConnection,
    record: &ClaimRecord,
    policy: Policy,
    today: NaiveDate,
) -> Result<Outcome> {
    let resolved = match record.resolve(today) {
        Ok(resolved) => resolved,
        Err(err) => return Ok(record_error(&err, record)),
    };
    let claim = resolved.claim;

    if let Some(rejected) = resolved.rejected_date {
        warn!(
            claim_id = claim.claim_id,
            value = %rejected,
            fallback = %today,
            "Could not parse discharge date, using today"
        );
    }

    let outcome = if store::claim_exists(conn, claim.claim_id).await? {
        if policy.updates_existing() {
            store::update_claim(conn, &claim).await?;
            Outcome::Updated
        } else {
            Outcome::Skipped
        }
    } else {
        store::insert_claim(conn, &claim).await?;
        Outcome::Created
    };

    debug!(claim_id = claim.claim_id, %outcome, "Reconciled claim");
    Ok(outcome)
}

/// Create, update or skip one detail row per CPT code in the record
pub async fn reconcile_detail(
    conn: &mut SqliteConnection,
    record: &DetailRecord,
    policy: Policy,
) -> Result<Outcome> {
    let detail = match record.resolve() {
        Ok(detail) => detail,
        Err(err) => return Ok(record_error(&err, record)),
    };

    if !store::claim_exists(conn, detail.claim_id).await? {
        return Ok(record_error(&RecordError::ClaimNotFound(detail.claim_id), record));
    }

    let denial_reason = detail.denial_reason.as_deref();
    let mut outcomes = Vec::with_capacity(detail.cpt_codes.len());
    for code in &detail.cpt_codes {
        let outcome = match store::find_detail_id(conn, detail.claim_id, code).await? {
            Some(id) if policy.updates_existing() => {
                store::update_detail(conn, id, denial_reason).await?;
                Outcome::Updated
            }
            Some(_) => Outcome::Skipped,
            None => {
                store::insert_detail(conn, detail.claim_id, code, denial_reason).await?;
                Outcome::Created
            }
        };
        debug!(claim_id = detail.claim_id, cpt_code = %code, %outcome, "Reconciled detail");
        outcomes.push(outcome);
    }

    Ok(Outcome::combine(&outcomes))
}

fn record_error(err: &RecordError, record: &impl fmt::Display) -> Outcome {
    error!(error = %err, record = %record, "Error processing record");
    Outcome::Error
}
