//! Claim read model: listing, lookup and filter choices

pub mod queries;
pub mod routes;

pub use queries::{
    ClaimFiltersError, ClaimFiltersQuery, ClaimFiltersResponse, ClaimFlagsNotesError,
    ClaimFlagsNotesQuery, ClaimFlagsNotesResponse, ClaimListItem, GetClaimError, GetClaimQuery,
    GetClaimResponse, ListClaimsError, ListClaimsQuery, ListClaimsResponse, StatusChoice,
};

pub use routes::claims_routes;
