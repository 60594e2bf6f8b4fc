//! Claims Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, persistence helpers, and error handling for the claims
//! review workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Types**: [`ClaimStatus`] and exact money helpers
//! - **Database**: SQLite pool construction, embedded migrations, row models
//! - **Logging**: tracing subscriber bootstrap shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use claims_common::db::{self, DatabaseConfig};
//!
//! # async fn run() -> claims_common::Result<()> {
//! let pool = db::connect(&DatabaseConfig::from_env()).await?;
//! db::migrate(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{money, ClaimStatus};
