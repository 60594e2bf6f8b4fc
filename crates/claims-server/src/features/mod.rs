//! Feature modules implementing the claims review API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes. Commands write (flags, notes, users); queries read.
//!
//! # Features
//!
//! - **claims**: listing, lookup and filter choices
//! - **flags**: raising and resolving review flags
//! - **notes**: adding and editing reviewer notes
//! - **users**: reviewer accounts
//! - **dashboard**: aggregated statistics
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries implement the mediator pattern using the `mediator` crate.

pub mod claims;
pub mod dashboard;
pub mod flags;
pub mod notes;
pub mod shared;
pub mod users;

use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// SQLite connection pool
    pub db: sqlx::SqlitePool,
}

/// Creates the API router with all feature routes mounted
///
/// - `/claims` - Claim listing and detail
/// - `/claims/:claim_id/flags` - Flag create and resolve
/// - `/claims/:claim_id/notes` - Note create and update
/// - `/users` - Reviewer accounts
/// - `/dashboard` - Statistics
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/claims", claims::claims_routes().with_state(state.db.clone()))
        .merge(flags::flags_routes().with_state(state.db.clone()))
        .merge(notes::notes_routes().with_state(state.db.clone()))
        .nest("/users", users::users_routes().with_state(state.db.clone()))
        .nest("/dashboard", dashboard::dashboard_routes().with_state(state.db.clone()))
}
