//! Shared utilities and types for feature modules
//!
//! - **pagination**: page/per_page handling for list queries
//! - **sql**: status normalisation and common lookups
//! - **user**: the `x-user-id` acting-user extractor

pub mod pagination;
pub mod sql;
pub mod user;

pub use pagination::{Paginated, PaginationError, PaginationMetadata, PaginationParams};
pub use user::ActingUser;

#[cfg(test)]
pub mod test_helpers;
