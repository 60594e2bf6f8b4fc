//! Reading input files into decoded records
//!
//! Everything here runs before the load transaction opens, so a malformed
//! file is rejected without touching the database.

use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::format::{sniff_delimiter, FileFormat};
use crate::record::{InputRecord, RawRecord, RecordKind};

/// Records read from one input file, in file order
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub records: Vec<InputRecord>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count records of one kind
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }
}

/// Read and decode every record in `path`
#[tracing::instrument(skip_all, fields(path = %path.display(), format = %format))]
pub fn read_records(path: &Path, format: FileFormat) -> Result<RecordBatch> {
    let content = std::fs::read_to_string(path)?;
    let batch = match format {
        FileFormat::Csv => parse_csv(&content)?,
        FileFormat::Json => parse_json(&content)?,
    };

    info!(
        records = batch.len(),
        claims = batch.count(RecordKind::Claim),
        details = batch.count(RecordKind::Detail),
        "Parsed input file"
    );
    Ok(batch)
}

/// Parse CSV content. The header row decides the record kind for the whole file.
pub fn parse_csv(content: &str) -> Result<RecordBatch> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = sniff_delimiter(content.as_bytes());
    debug!(delimiter = %char::from(delimiter), "Detected CSV delimiter");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let kind = RecordKind::classify(|name| headers.iter().any(|h| h == name)).ok_or_else(|| {
        IngestError::FormatNotRecognized(headers.iter().map(str::to_string).collect())
    })?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        // Short rows leave trailing fields absent; extra cells are ignored
        let raw: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(InputRecord::labeled(kind, raw));
    }

    Ok(RecordBatch { records })
}

/// Parse JSON content: a flat array of records or a `claims`/`claim_details` envelope
pub fn parse_json(content: &str) -> Result<RecordBatch> {
    let document: Value = serde_json::from_str(content)?;

    let records = match document {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let raw = into_object(item, index)?;
                let record = InputRecord::decode(raw).map_err(|raw| {
                    IngestError::FormatNotRecognized(raw.keys().cloned().collect())
                })?;
                records.push(record);
            }
            records
        }
        Value::Object(mut envelope) => {
            let claims = envelope.remove("claims");
            let details = envelope.remove("claim_details");
            if claims.is_none() && details.is_none() {
                warn!(
                    keys = ?envelope.keys().collect::<Vec<_>>(),
                    "JSON object has neither 'claims' nor 'claim_details'; nothing to load"
                );
            }

            let mut records = section(claims, RecordKind::Claim)?;
            records.extend(section(details, RecordKind::Detail)?);
            records
        }
        other => {
            return Err(IngestError::UnexpectedStructure(format!(
                "expected an array or object at the top level, found {}",
                json_type(&other)
            )))
        }
    };

    Ok(RecordBatch { records })
}

/// Decode one labeled envelope section
fn section(value: Option<Value>, kind: RecordKind) -> Result<Vec<InputRecord>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| -> Result<InputRecord> {
                Ok(InputRecord::labeled(kind, into_object(item, index)?))
            })
            .collect(),
        Some(other) => Err(IngestError::UnexpectedStructure(format!(
            "{} section must be an array, found {}",
            kind,
            json_type(&other)
        ))),
    }
}

fn into_object(value: Value, index: usize) -> Result<RawRecord> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(IngestError::UnexpectedStructure(format!(
            "record {} is {}, expected an object",
            index,
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
