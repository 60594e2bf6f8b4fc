pub mod stats;

pub use stats::{DashboardError, DashboardQuery, DashboardResponse};
