//! Claims Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Bulk loading of claims and claim details from CSV or JSON files, plus an
//! export that writes the store back out in the same shapes.
//!
//! # Pipeline
//!
//! - **format**: extension-based format detection and CSV delimiter sniffing
//! - **source**: file parsing and per-record classification
//! - **reconcile**: create/update/skip decisions per record and load mode
//! - **load**: the single-transaction run and its [`LoadSummary`]
//!
//! # Example
//!
//! ```no_run
//! use claims_ingest::{load_file, LoadMode, LoadOptions};
//!
//! # async fn run(pool: sqlx::SqlitePool) -> claims_ingest::Result<()> {
//! let options = LoadOptions::new("claims.csv").mode(LoadMode::Overwrite);
//! let summary = load_file(&pool, &options).await?;
//! println!("{}", summary.to_table());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod export;
pub mod fields;
pub mod format;
pub mod load;
pub mod reconcile;
pub mod record;
pub mod source;
pub mod store;
pub mod summary;

pub use error::{IngestError, RecordError, Result};
pub use export::{export_claims, ExportSummary};
pub use format::FileFormat;
pub use load::{load_file, LoadOptions};
pub use reconcile::{LoadMode, Outcome, Policy};
pub use record::{InputRecord, RecordKind};
pub use summary::{LoadSummary, OutcomeCounts};
