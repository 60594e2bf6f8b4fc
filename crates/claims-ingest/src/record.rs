//! Input records and their classification
//!
//! Each raw record is decoded once into [`InputRecord`]. Field presence picks
//! the variant: `patient_name` marks a claim, `claim_id` plus any of the
//! detail fields marks a detail. Records that match neither are rejected at
//! decode time rather than silently dropped.

use chrono::NaiveDate;
use claims_common::db::Claim;
use serde_json::Value;
use std::fmt;

use crate::error::RecordError;
use crate::fields;

/// A raw record keyed by field name
pub type RawRecord = serde_json::Map<String, Value>;

/// Fields that mark a detail record when present alongside `claim_id`
pub const DETAIL_MARKER_FIELDS: [&str; 3] = ["cpt_code", "cpt_codes", "denial_reason"];

/// Which entity a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Claim,
    Detail,
}

impl RecordKind {
    /// Classify by field names. Works for CSV headers and JSON keys alike.
    pub fn classify<F>(has_field: F) -> Option<Self>
    where
        F: Fn(&str) -> bool,
    {
        if has_field("patient_name") {
            Some(RecordKind::Claim)
        } else if has_field("claim_id") && DETAIL_MARKER_FIELDS.iter().any(|&f| has_field(f)) {
            Some(RecordKind::Detail)
        } else {
            None
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Claim => f.write_str("claim"),
            RecordKind::Detail => f.write_str("detail"),
        }
    }
}

/// A decoded input record
#[derive(Debug, Clone, PartialEq)]
pub enum InputRecord {
    Claim(ClaimRecord),
    Detail(DetailRecord),
}

impl InputRecord {
    /// Decode an unlabeled record by field presence.
    ///
    /// Returns the record back when it matches neither shape.
    pub fn decode(raw: RawRecord) -> Result<Self, RawRecord> {
        match RecordKind::classify(|name| raw.contains_key(name)) {
            Some(kind) => Ok(Self::labeled(kind, raw)),
            None => Err(raw),
        }
    }

    /// Wrap a record whose kind is already known (CSV header, JSON envelope)
    pub fn labeled(kind: RecordKind, raw: RawRecord) -> Self {
        match kind {
            RecordKind::Claim => InputRecord::Claim(ClaimRecord { raw }),
            RecordKind::Detail => InputRecord::Detail(DetailRecord { raw }),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            InputRecord::Claim(_) => RecordKind::Claim,
            InputRecord::Detail(_) => RecordKind::Detail,
        }
    }
}

/// Render a raw record for log output
fn display_raw(raw: &RawRecord, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match serde_json::to_string(raw) {
        Ok(json) => f.write_str(&json),
        Err(_) => write!(f, "{:?}", raw),
    }
}

/// A record describing a claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    raw: RawRecord,
}

/// Claim fields resolved from a [`ClaimRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClaim {
    pub claim: Claim,
    /// Discharge date text that could not be parsed
    pub rejected_date: Option<String>,
}

impl ClaimRecord {
    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    /// Coerce every tracked field. `today` replaces a missing or
    /// unparseable discharge date.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedClaim, RecordError> {
        let claim_id = fields::identifier(&self.raw, &["id", "claim_id"])?;
        let billed_amount = fields::amount(&self.raw, "billed_amount")?;
        let paid_amount = fields::amount(&self.raw, "paid_amount")?;
        let status = fields::status(&self.raw);
        let discharge = fields::date_or(&self.raw, "discharge_date", today);

        Ok(ResolvedClaim {
            claim: Claim {
                claim_id,
                patient_name: fields::text_or_empty(&self.raw, "patient_name"),
                billed_amount,
                paid_amount,
                status,
                insurer_name: fields::text_or_empty(&self.raw, "insurer_name"),
                discharge_date: discharge.date,
            },
            rejected_date: discharge.rejected,
        })
    }
}

impl fmt::Display for ClaimRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_raw(&self.raw, f)
    }
}

/// A record describing one or more claim line items
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    raw: RawRecord,
}

/// Detail fields resolved from a [`DetailRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDetail {
    pub claim_id: i64,
    /// One entry per sub-record; never empty
    pub cpt_codes: Vec<String>,
    pub denial_reason: Option<String>,
}

impl DetailRecord {
    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    pub fn resolve(&self) -> Result<ResolvedDetail, RecordError> {
        let claim_id = fields::identifier(&self.raw, &["claim_id"])?;
        let codes = fields::present(&self.raw, "cpt_codes")
            .or_else(|| fields::present(&self.raw, "cpt_code"));

        Ok(ResolvedDetail {
            claim_id,
            cpt_codes: fields::cpt_codes(codes),
            denial_reason: fields::present(&self.raw, "denial_reason").map(fields::text),
        })
    }
}

impl fmt::Display for DetailRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_raw(&self.raw, f)
    }
}
