//! Claim status enumeration
//!
//! Source files and older rows spell the same status several ways
//! (`under_review`, `Under Review`, `UNDER-REVIEW`). Everything funnels
//! through [`ClaimStatus::parse`] so call sites never compare raw strings.
//! Statuses outside the four known ones are kept as their normalised key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommonError;

/// Review status of a claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(into = "String", try_from = "String")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Paid,
    Denied,
    UnderReview,
    /// Any other status, held as its normalised key (`On Hold` -> `on_hold`)
    Other(String),
}

impl ClaimStatus {
    /// The known statuses in display order
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Pending,
        ClaimStatus::Paid,
        ClaimStatus::Denied,
        ClaimStatus::UnderReview,
    ];

    /// Normalise a textual status.
    ///
    /// Leading/trailing whitespace is ignored, case is folded, and runs of
    /// spaces or hyphens are treated as underscores. Unrecognised text becomes
    /// [`ClaimStatus::Other`]; only blank input returns `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_key(raw);
        let status = match key.as_str() {
            "" => return None,
            "pending" => ClaimStatus::Pending,
            "paid" => ClaimStatus::Paid,
            "denied" => ClaimStatus::Denied,
            "under_review" => ClaimStatus::UnderReview,
            _ => ClaimStatus::Other(key),
        };
        Some(status)
    }

    /// Canonical storage form
    pub fn as_str(&self) -> &str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Paid => "paid",
            ClaimStatus::Denied => "denied",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Other(key) => key,
        }
    }

    /// Human-readable label; unknown keys are title-cased word by word
    pub fn label(&self) -> String {
        match self {
            ClaimStatus::Pending => "Pending".to_string(),
            ClaimStatus::Paid => "Paid".to_string(),
            ClaimStatus::Denied => "Denied".to_string(),
            ClaimStatus::UnderReview => "Under Review".to_string(),
            ClaimStatus::Other(key) => key
                .split('_')
                .filter(|w| !w.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Whether this is one of the four known statuses
    pub fn is_known(&self) -> bool {
        !matches!(self, ClaimStatus::Other(_))
    }
}

/// Fold a status string to the lowercase snake key used for matching.
///
/// Mirrors the SQL expression `LOWER(REPLACE(TRIM(status), ' ', '_'))`
/// used by readers, extended to hyphens and repeated separators.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch == ' ' || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !key.is_empty() {
            key.push('_');
        }
        pending_sep = false;
        key.extend(ch.to_lowercase());
    }
    key
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::parse(s).ok_or(CommonError::BlankStatus)
    }
}

impl TryFrom<String> for ClaimStatus {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClaimStatus> for String {
    fn from(status: ClaimStatus) -> Self {
        match status {
            ClaimStatus::Other(key) => key,
            known => known.as_str().to_string(),
        }
    }
}
