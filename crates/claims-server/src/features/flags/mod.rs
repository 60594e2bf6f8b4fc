//! Review flags raised on claims

pub mod commands;
pub mod routes;

pub use commands::{
    CreateFlagCommand, CreateFlagError, CreateFlagResponse, ResolveFlagCommand, ResolveFlagError,
    ResolveFlagResponse,
};

pub use routes::flags_routes;
