//! Transactional load runs
//!
//! A run parses the whole file up front, then applies the optional clear step
//! and every record inside a single transaction. The transaction commits only
//! after the last record; any error on the way rolls everything back,
//! including the clear.

use chrono::{NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{IngestError, Result};
use crate::format::FileFormat;
use crate::reconcile::{self, LoadMode, Policy};
use crate::source::{self, RecordBatch};
use crate::store;
use crate::summary::LoadSummary;

/// Options for one load run
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub format: Option<FileFormat>,
    pub mode: LoadMode,
    pub update_existing: bool,
    /// Date used when a discharge date is missing or unparseable (default: today, UTC)
    pub reference_date: Option<NaiveDate>,
    pub show_progress: bool,
}

impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            mode: LoadMode::Append,
            update_existing: false,
            reference_date: None,
            show_progress: false,
        }
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn update_existing(mut self, update_existing: bool) -> Self {
        self.update_existing = update_existing;
        self
    }

    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn policy(&self) -> Policy {
        Policy::new(self.mode, self.update_existing)
    }
}

/// Read a file and load it into the store
#[tracing::instrument(skip_all, fields(path = %options.path.display(), mode = %options.mode))]
pub async fn load_file(pool: &SqlitePool, options: &LoadOptions) -> Result<LoadSummary> {
    let batch = prepare(&options.path, options.format)?;

    if options.update_existing && options.mode != LoadMode::Append {
        warn!(mode = %options.mode, "--update-existing only applies to append mode; ignoring");
    }

    load_batch(pool, &batch, options).await
}

/// Everything that can fail before the transaction opens
pub fn prepare(path: &Path, format: Option<FileFormat>) -> Result<RecordBatch> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }
    let format = FileFormat::detect(path, format)?;
    source::read_records(path, format)
}

/// Apply an already parsed batch inside one transaction
pub async fn load_batch(
    pool: &SqlitePool,
    batch: &RecordBatch,
    options: &LoadOptions,
) -> Result<LoadSummary> {
    let today = options
        .reference_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let progress = progress_bar(options.show_progress, batch.len() as u64);

    let mut tx = pool.begin().await?;
    match run(&mut tx, batch, options, today, &progress).await {
        Ok(summary) => {
            if let Err(err) = tx.commit().await {
                progress.abandon();
                return Err(IngestError::Aborted(Box::new(IngestError::Database(err))));
            }
            progress.finish_and_clear();
            info!(
                processed = summary.total_processed(),
                claim_errors = summary.claims.errors,
                detail_errors = summary.details.errors,
                "Load committed"
            );
            Ok(summary)
        }
        Err(err) => {
            progress.abandon();
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(IngestError::Aborted(Box::new(err)))
        }
    }
}

async fn run(
    tx: &mut Transaction<'_, Sqlite>,
    batch: &RecordBatch,
    options: &LoadOptions,
    today: NaiveDate,
    progress: &ProgressBar,
) -> Result<LoadSummary> {
    if options.mode == LoadMode::Clear {
        let cleared = store::clear_all(&mut **tx).await?;
        info!(
            claims = cleared.claims,
            details = cleared.details,
            "Cleared existing claims and details"
        );
    }

    let policy = options.policy();
    let mut summary = LoadSummary::default();
    for record in &batch.records {
        let outcome = reconcile::reconcile(&mut **tx, record, policy, today).await?;
        summary.record(record.kind(), outcome);
        progress.inc(1);
    }
    Ok(summary)
}

fn progress_bar(visible: bool, total: u64) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {pos}/{len} records {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message("reconciling");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
