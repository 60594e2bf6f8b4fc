//! Error types shared across the claims workspace

use thiserror::Error;

use crate::types::money::MoneyError;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Main error type for the shared library
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyError),

    #[error("Claim status is blank")]
    BlankStatus,

    #[error("Configuration error: {0}")]
    Config(String),
}
