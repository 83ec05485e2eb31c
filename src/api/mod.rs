//! HTTP API.

pub mod insights;
pub mod routes;
pub mod tasks;

pub use routes::{router, serve, AppState};
