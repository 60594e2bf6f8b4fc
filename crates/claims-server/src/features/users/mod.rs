//! Reviewer accounts

pub mod commands;
pub mod routes;

pub use commands::{CreateUserCommand, CreateUserError, CreateUserResponse};

pub use routes::users_routes;
