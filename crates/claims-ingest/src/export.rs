//! Export stored claims in a shape the loader accepts
//!
//! JSON uses the `{"claims": [...], "claim_details": [...]}` envelope. CSV
//! holds one record kind per file, so details go to a sibling
//! `<stem>_details.csv`.

use claims_common::db::{Claim, ClaimDetail};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::format::FileFormat;
use crate::store;

const CLAIM_HEADER: [&str; 7] = [
    "claim_id",
    "patient_name",
    "billed_amount",
    "paid_amount",
    "status",
    "insurer_name",
    "discharge_date",
];

const DETAIL_HEADER: [&str; 3] = ["claim_id", "cpt_code", "denial_reason"];

/// Claim as written to export files
#[derive(Debug, Serialize)]
struct ClaimRow<'a> {
    claim_id: i64,
    patient_name: &'a str,
    billed_amount: Decimal,
    paid_amount: Decimal,
    status: &'a str,
    insurer_name: &'a str,
    discharge_date: String,
}

impl<'a> From<&'a Claim> for ClaimRow<'a> {
    fn from(claim: &'a Claim) -> Self {
        Self {
            claim_id: claim.claim_id,
            patient_name: &claim.patient_name,
            billed_amount: claim.billed_amount,
            paid_amount: claim.paid_amount,
            status: claim.status.as_str(),
            insurer_name: &claim.insurer_name,
            discharge_date: claim.discharge_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Detail as written to export files
#[derive(Debug, Serialize)]
struct DetailRow<'a> {
    claim_id: i64,
    cpt_code: &'a str,
    denial_reason: Option<&'a str>,
}

impl<'a> From<&'a ClaimDetail> for DetailRow<'a> {
    fn from(detail: &'a ClaimDetail) -> Self {
        Self {
            claim_id: detail.claim_id,
            cpt_code: &detail.cpt_code,
            denial_reason: detail.denial_reason.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    claims: Vec<ClaimRow<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    claim_details: Option<Vec<DetailRow<'a>>>,
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub claims: usize,
    pub details: usize,
    pub files: Vec<PathBuf>,
}

/// Write every stored claim (and optionally its details) to `path`
#[tracing::instrument(skip_all, fields(path = %path.display(), include_details = include_details))]
pub async fn export_claims(
    pool: &SqlitePool,
    path: &Path,
    format: Option<FileFormat>,
    include_details: bool,
) -> Result<ExportSummary> {
    let format = FileFormat::detect(path, format)?;

    let mut conn = pool.acquire().await?;
    let claims = store::all_claims(&mut conn).await?;
    let details = if include_details {
        store::all_details(&mut conn).await?
    } else {
        Vec::new()
    };
    drop(conn);

    let files = match format {
        FileFormat::Json => {
            write_json(path, &claims, include_details.then_some(details.as_slice()))?;
            vec![path.to_path_buf()]
        }
        FileFormat::Csv => {
            write_csv(path, &CLAIM_HEADER, claims.iter().map(ClaimRow::from))?;
            let mut files = vec![path.to_path_buf()];
            if include_details {
                let details_path = details_sibling(path);
                write_csv(&details_path, &DETAIL_HEADER, details.iter().map(DetailRow::from))?;
                files.push(details_path);
            }
            files
        }
    };

    info!(claims = claims.len(), details = details.len(), "Export written");
    Ok(ExportSummary {
        claims: claims.len(),
        details: details.len(),
        files,
    })
}

fn write_json(path: &Path, claims: &[Claim], details: Option<&[ClaimDetail]>) -> Result<()> {
    let envelope = Envelope {
        claims: claims.iter().map(ClaimRow::from).collect(),
        claim_details: details.map(|d| d.iter().map(DetailRow::from).collect()),
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write rows under an explicit header so an empty export still loads
fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// `out/claims.csv` -> `out/claims_details.csv`
fn details_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "claims".to_string());
    path.with_file_name(format!("{}_details.csv", stem))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_details_sibling() {
        assert_eq!(
            details_sibling(Path::new("/tmp/out/claims.csv")),
            PathBuf::from("/tmp/out/claims_details.csv")
        );
    }
}
