pub mod create;
pub mod resolve;

pub use create::{CreateFlagCommand, CreateFlagError, CreateFlagResponse, DEFAULT_FLAG_REASON};
pub use resolve::{ResolveFlagCommand, ResolveFlagError, ResolveFlagResponse};
