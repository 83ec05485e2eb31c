//! # Taskboard
//!
//! A small task-management REST API with derived insights.
//!
//! This library provides:
//! - An HTTP API for creating, listing, updating, and deleting tasks
//! - Filtering and sorting over the task collection
//! - An on-demand insights report (counts, due-soon analysis, summary text)
//!
//! ## Request Flow
//! 1. Request reaches an `api` handler
//! 2. Payloads pass through the `validate` rule table
//! 3. The handler reads/writes the SQLite-backed `store`
//! 4. Results (or an `ApiError`) are serialized back to the client
//!
//! ## Modules
//! - `api`: axum routes and handlers
//! - `model`: the Task record and its request/response types
//! - `store`: SQLite persistence and aggregate queries
//! - `validate`: field-level validation and normalization
//! - `insights`: the derived report over current store contents

pub mod api;
pub mod config;
pub mod error;
pub mod insights;
pub mod model;
pub mod store;
pub mod validate;

pub use config::Config;
pub use error::ApiError;
