//! Review dashboard: portfolio totals, trends and reviewer activity

pub mod queries;
pub mod routes;

pub use queries::{DashboardError, DashboardQuery, DashboardResponse};

pub use routes::dashboard_routes;
