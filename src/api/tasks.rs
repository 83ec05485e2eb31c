//! Task CRUD endpoints.
//!
//! Handlers translate HTTP parameters into store calls; write payloads go
//! through the validation layer first.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::error::ApiError;
use crate::model::{ListQuery, Task, TaskDraft, TaskPatch};
use crate::validate::{validate_new, validate_patch};

use super::routes::AppState;

/// GET /tasks - list tasks, optionally filtered and sorted.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list(&query)?;
    Ok(Json(tasks))
}

/// POST /tasks - validate and create a new task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new = validate_new(draft)?;
    let task = state.store.create(new)?;

    tracing::info!("Created task {} ({})", task.id, task.title);

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks/:id - retrieve a single task.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.get(id)?;
    Ok(Json(task))
}

/// PATCH /tasks/:id - partial update; only supplied fields change.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let changes = validate_patch(patch)?;
    let task = state.store.update(id, changes)?;
    Ok(Json(task))
}

/// DELETE /tasks/:id - hard delete.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
