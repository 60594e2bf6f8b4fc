pub mod filters;
pub mod flags_notes;
pub mod get;
pub mod list;

pub use filters::{ClaimFiltersError, ClaimFiltersQuery, ClaimFiltersResponse, StatusChoice};
pub use flags_notes::{ClaimFlagsNotesError, ClaimFlagsNotesQuery, ClaimFlagsNotesResponse};
pub use get::{GetClaimError, GetClaimQuery, GetClaimResponse};
pub use list::{ClaimListItem, ListClaimsError, ListClaimsQuery, ListClaimsResponse};
