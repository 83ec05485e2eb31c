//! Insights endpoint.

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::error::ApiError;
use crate::insights::{self, InsightsReport};

use super::routes::AppState;

/// GET /insights - compute the report over current store contents.
///
/// The reference date is the server's local calendar date at evaluation
/// time; nothing is cached between calls.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InsightsReport>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let report = insights::compute(&state.store, today)?;
    Ok(Json(report))
}
