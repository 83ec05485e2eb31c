//! Integration tests driving the full HTTP surface against an in-memory
//! store.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskboard::api::{router, AppState};
use taskboard::config::Config;
use taskboard::store::TaskStore;

fn test_app() -> Router {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_path: ":memory:".into(),
    };
    let store = TaskStore::open_in_memory().unwrap();
    router(Arc::new(AppState { config, store }))
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Bytes) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = request(app, method, uri, body).await;
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("non-JSON body for {method} {uri}: {e}"));
    (status, value)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let (status, body) = request_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ---------------------------------------------------------------------------
// Create / Retrieve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_applies_defaults_and_trims_title() {
    let app = test_app();
    let (status, task) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({"title": "  Write the report  "})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["title"], "Write the report");
    assert_eq!(task["description"], "");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["due_date"], Value::Null);
    assert_eq!(task["created_at"], task["updated_at"]);
}

#[tokio::test]
async fn create_then_get_roundtrip() {
    let app = test_app();
    let (_, created) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({
            "title": "Ship release",
            "description": "cut the tag",
            "priority": "urgent",
            "status": "in_progress",
            "due_date": "2026-08-14"
        })),
    )
    .await;

    let uri = format!("/tasks/{}", created["id"]);
    let (status, fetched) = request_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_ignores_server_assigned_and_unknown_fields() {
    let app = test_app();
    let (status, task) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({
            "id": 999,
            "title": "Plan sprint",
            "created_at": "1999-01-01T00:00:00Z",
            "color": "red"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["id"], 1);
    assert_ne!(task["created_at"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn get_missing_task_returns_404_body() {
    let app = test_app();
    let (status, body) = request_json(&app, "GET", "/tasks/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Task not found"}));
}

// ---------------------------------------------------------------------------
// Validation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_empty_title_returns_field_errors_and_persists_nothing() {
    let app = test_app();
    let (status, body) =
        request_json(&app, "POST", "/tasks", Some(json!({"title": "   "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"title": ["Title cannot be empty."]}));

    let (_, tasks) = request_json(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn create_missing_title_is_required() {
    let app = test_app();
    let (status, body) = request_json(&app, "POST", "/tasks", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"title": ["This field is required."]}));
}

#[tokio::test]
async fn create_invalid_enums_report_both_fields() {
    let app = test_app();
    let (status, body) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({"title": "ok", "priority": "extreme", "status": "paused"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "priority": ["Priority must be one of: low, medium, high, urgent"],
            "status": ["Status must be one of: todo, in_progress, review, done"]
        })
    );

    let (_, tasks) = request_json(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let app = test_app();
    let (_, created) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({
            "title": "Review PR",
            "description": "backend changes",
            "priority": "high",
            "due_date": "2026-08-20"
        })),
    )
    .await;

    let uri = format!("/tasks/{}", created["id"]);
    let (status, updated) =
        request_json(&app, "PATCH", &uri, Some(json!({"status": "done"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "done");
    assert_eq!(updated["title"], "Review PR");
    assert_eq!(updated["description"], "backend changes");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["due_date"], "2026-08-20");
    assert_eq!(updated["created_at"], created["created_at"]);
}

#[tokio::test]
async fn patch_null_due_date_clears_it() {
    let app = test_app();
    let (_, created) = request_json(
        &app,
        "POST",
        "/tasks",
        Some(json!({"title": "Plan sprint", "due_date": "2026-08-20"})),
    )
    .await;

    let uri = format!("/tasks/{}", created["id"]);
    let (_, updated) = request_json(&app, "PATCH", &uri, Some(json!({"due_date": null}))).await;
    assert_eq!(updated["due_date"], Value::Null);

    // Omitting due_date leaves it untouched.
    let (_, updated) = request_json(&app, "PATCH", &uri, Some(json!({"title": "Renamed"}))).await;
    assert_eq!(updated["due_date"], Value::Null);
    assert_eq!(updated["title"], "Renamed");
}

#[tokio::test]
async fn patch_invalid_status_rejected() {
    let app = test_app();
    let (_, created) =
        request_json(&app, "POST", "/tasks", Some(json!({"title": "ok"}))).await;

    let uri = format!("/tasks/{}", created["id"]);
    let (status, body) =
        request_json(&app, "PATCH", &uri, Some(json!({"status": "paused"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": ["Status must be one of: todo, in_progress, review, done"]})
    );
}

#[tokio::test]
async fn patch_missing_task_returns_404() {
    let app = test_app();
    let (status, body) =
        request_json(&app, "PATCH", "/tasks/42", Some(json!({"status": "done"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Task not found"}));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = test_app();
    let (_, created) =
        request_json(&app, "POST", "/tasks", Some(json!({"title": "Throwaway"}))).await;
    let uri = format!("/tasks/{}", created["id"]);

    let (status, body) = request(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = request(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// List, filter, sort
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_empty_store_returns_empty_array() {
    let app = test_app();
    let (status, body) = request_json(&app, "GET", "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

async fn seed_three(app: &Router) {
    for payload in [
        json!({"title": "a", "priority": "high", "status": "todo", "due_date": "2026-08-20"}),
        json!({"title": "b", "priority": "low", "status": "done", "due_date": "2026-08-10"}),
        json!({"title": "c", "priority": "high", "status": "todo"}),
    ] {
        let (status, _) = request_json(app, "POST", "/tasks", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn list_filters_by_status_and_priority() {
    let app = test_app();
    seed_three(&app).await;

    let (_, todos) = request_json(&app, "GET", "/tasks?status=todo", None).await;
    assert_eq!(todos.as_array().unwrap().len(), 2);

    let (_, high_todos) =
        request_json(&app, "GET", "/tasks?status=todo&priority=high", None).await;
    assert_eq!(high_todos.as_array().unwrap().len(), 2);

    let (_, low_done) = request_json(&app, "GET", "/tasks?status=done&priority=low", None).await;
    let titles: Vec<_> = low_done
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].clone())
        .collect();
    assert_eq!(titles, vec!["b"]);

    // An off-enum filter value matches nothing rather than erroring.
    let (status, none) = request_json(&app, "GET", "/tasks?status=bogus", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn list_sorts_by_due_date_and_ignores_unknown_sort_key() {
    let app = test_app();
    seed_three(&app).await;

    let (_, by_due) = request_json(&app, "GET", "/tasks?sort=due_date", None).await;
    let titles: Vec<_> = by_due
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    // SQLite sorts NULL due dates first ascending.
    assert_eq!(titles, vec!["c", "b", "a"]);

    let (_, default_order) = request_json(&app, "GET", "/tasks", None).await;
    let (_, bogus_order) = request_json(&app, "GET", "/tasks?sort=bogus", None).await;
    assert_eq!(default_order, bogus_order);

    // Default order is newest created_at first.
    let titles: Vec<_> = default_order
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["c", "b", "a"]);
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insights_on_empty_store() {
    let app = test_app();
    let (status, body) = request_json(&app, "GET", "/insights", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_tasks"], 0);
    assert_eq!(body["summary"]["dominant_priority"], Value::Null);
    assert_eq!(
        body["summary"]["text"],
        "No tasks yet. Add some tasks to get started!"
    );
    assert_eq!(body["priority_breakdown"], json!([]));
    assert_eq!(body["status_breakdown"], json!([]));
    assert_eq!(body["busy_days"], json!([]));
}

#[tokio::test]
async fn insights_breakdowns_and_dominant_priority() {
    let app = test_app();
    for payload in [
        json!({"title": "a", "priority": "high", "status": "todo"}),
        json!({"title": "b", "priority": "high", "status": "done"}),
        json!({"title": "c", "priority": "low", "status": "todo"}),
    ] {
        request_json(&app, "POST", "/tasks", Some(payload)).await;
    }

    let (_, body) = request_json(&app, "GET", "/insights", None).await;
    assert_eq!(body["summary"]["total_tasks"], 3);
    assert_eq!(body["summary"]["dominant_priority"], "high");
    assert_eq!(
        body["priority_breakdown"],
        json!([
            {"priority": "high", "count": 2},
            {"priority": "low", "count": 1}
        ])
    );
    assert_eq!(
        body["status_breakdown"],
        json!([
            {"status": "done", "count": 1},
            {"status": "todo", "count": 2}
        ])
    );
}
