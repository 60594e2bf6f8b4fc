//! Marker traits separating writes from reads
//!
//! Commands change review state (flags, notes, users) and are logged at
//! `info`; queries only read.

/// A request that writes
pub trait Command {}

/// A request that only reads
pub trait Query {}
