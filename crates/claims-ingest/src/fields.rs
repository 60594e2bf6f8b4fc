//! Field coercion for raw input records
//!
//! CSV cells arrive as strings and JSON values keep their original type.
//! `null` and blank strings are treated as absent everywhere.

use chrono::NaiveDate;
use claims_common::money;
use claims_common::ClaimStatus;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::RecordError;
use crate::record::RawRecord;

/// Date layouts tried in order for discharge dates
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Look up a field, ignoring `null` and whitespace-only strings
pub fn present<'a>(raw: &'a RawRecord, name: &str) -> Option<&'a Value> {
    match raw.get(name)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value),
    }
}

/// Render a scalar value as trimmed text
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text field defaulting to an empty string
pub fn text_or_empty(raw: &RawRecord, name: &str) -> String {
    present(raw, name).map(text).unwrap_or_default()
}

/// Resolve an integer identifier from the first present candidate field.
///
/// Accepts JSON integers and strings holding an integer.
pub fn identifier(raw: &RawRecord, candidates: &[&'static str]) -> Result<i64, RecordError> {
    let found = candidates
        .iter()
        .find_map(|&name| present(raw, name).map(|value| (name, value)));

    let Some((field, value)) = found else {
        let field = candidates.last().copied().unwrap_or("id");
        return Err(RecordError::MissingField(field));
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| RecordError::InvalidInteger {
        field,
        value: text(value),
    })
}

/// Exact decimal amount; absent fields are zero
pub fn amount(raw: &RawRecord, field: &'static str) -> Result<Decimal, RecordError> {
    let Some(value) = present(raw, field) else {
        return Ok(Decimal::new(0, 2));
    };

    let parsed = match value {
        // Number::to_string keeps the literal digits, so no float round trip
        Value::Number(n) => money::parse_amount(&n.to_string()),
        Value::String(s) => money::parse_amount(s),
        other => Err(money::MoneyError::Invalid(other.to_string())),
    };
    parsed.map_err(|source| RecordError::InvalidAmount { field, source })
}

/// Claim status, defaulting to pending when absent.
///
/// Unrecognised text is kept as its normalised key.
pub fn status(raw: &RawRecord) -> ClaimStatus {
    let Some(status) = present(raw, "status").and_then(|value| ClaimStatus::parse(&text(value)))
    else {
        return ClaimStatus::default();
    };
    if !status.is_known() {
        tracing::debug!(status = %status, "Keeping unrecognised claim status");
    }
    status
}

/// Parse a date using [`DATE_FORMATS`]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Outcome of reading a date field that may need a fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateField {
    pub date: NaiveDate,
    /// The unparseable input, when the fallback was used
    pub rejected: Option<String>,
}

/// Read a date field, falling back to `today` when absent or unparseable
pub fn date_or(raw: &RawRecord, field: &str, today: NaiveDate) -> DateField {
    match present(raw, field) {
        None => DateField {
            date: today,
            rejected: None,
        },
        Some(value) => {
            let raw_text = text(value);
            match parse_date(&raw_text) {
                Some(date) => DateField {
                    date,
                    rejected: None,
                },
                None => DateField {
                    date: today,
                    rejected: Some(raw_text),
                },
            }
        }
    }
}

/// Split CPT codes on commas, trimming and dropping empties.
///
/// Arrays are flattened element by element. An empty result becomes a
/// single empty-string code.
pub fn cpt_codes(value: Option<&Value>) -> Vec<String> {
    let mut codes = Vec::new();
    let mut push_split = |s: &str| {
        codes.extend(
            s.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        );
    };

    match value {
        Some(Value::Array(items)) => {
            for item in items {
                push_split(&text(item));
            }
        }
        Some(other) => push_split(&text(other)),
        None => {}
    }

    if codes.is_empty() {
        codes.push(String::new());
    }
    codes
}
