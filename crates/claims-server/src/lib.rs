//! Claims Review Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! JSON API over the claims database filled by `claims-ingest`.
//!
//! # Overview
//!
//! - **Claims**: filtered, paginated listing and per-claim detail
//! - **Review**: flags (raise, resolve) and notes (add, edit) by reviewers
//! - **Dashboard**: totals, financials, trends and reviewer activity
//! - **Configuration**: environment-based, `.env` aware
//! - **Middleware**: CORS, compression and request tracing
//!
//! # Architecture
//!
//! Features are vertical slices following a CQRS split:
//!
//! - **Commands** write review state and are reached through `POST`/`PUT`
//! - **Queries** read and are reached through `GET`
//!
//! Every command and query is a `mediator` request with its own error
//! enum; routes translate those errors into the shared JSON envelope.
//!
//! Reviewers identify themselves with the `x-user-id` header; there is no
//! authentication beyond checking that the user exists.
//!
//! # Example
//!
//! ```no_run
//! use claims_server::{api, config::Config};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let pool = claims_common::db::connect(&config.database).await?;
//! let app = api::create_router(pool, &config);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::AppError;
