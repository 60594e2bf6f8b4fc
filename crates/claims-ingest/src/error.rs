//! Error types for claims ingestion
//!
//! Two tiers: [`IngestError`] aborts a whole run, [`RecordError`] is caught
//! per record, logged, and tallied as an `error` outcome.

use claims_common::money::MoneyError;
use claims_common::CommonError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Fatal errors that stop a run
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File \"{0}\" does not exist.")]
    FileNotFound(PathBuf),

    #[error("Cannot detect file format of \"{0}\". Please specify --format.")]
    FormatUndetectable(PathBuf),

    #[error("File format not recognized. Expected either claims or details format.\nFound fields: {0:?}")]
    FormatNotRecognized(Vec<String>),

    #[error("File format not recognized: {0}")]
    UnexpectedStructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Common(#[from] CommonError),

    /// A failure inside the transactional run; every change was rolled back
    #[error("Error loading data: {0}")]
    Aborted(Box<IngestError>),
}

/// Recoverable problems with a single input record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid integer in '{field}': {value}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid amount in '{field}': {source}")]
    InvalidAmount {
        field: &'static str,
        #[source]
        source: MoneyError,
    },

    #[error("Claim {0} not found for detail record")]
    ClaimNotFound(i64),
}
