//! Free-text notes on claims

pub mod commands;
pub mod routes;

pub use commands::{
    CreateNoteCommand, CreateNoteError, CreateNoteResponse, UpdateNoteCommand, UpdateNoteError,
    UpdateNoteResponse,
};

pub use routes::notes_routes;
