//! Shared domain types

pub mod money;
mod status;

pub use status::{normalize_key, ClaimStatus};
