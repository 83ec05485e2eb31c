//! Field-level validation and normalization.
//!
//! Checks run in a fixed field order (`title`, `priority`, `status`) and
//! failures accumulate into a `field -> [message]` map, so error payloads
//! are reproducible across runs. Fields absent from the input are skipped
//! on partial update and defaulted on create.

use std::collections::BTreeMap;

use crate::model::{NewTask, Priority, Status, TaskChanges, TaskDraft, TaskPatch};

/// Per-field validation messages, keyed by field name. A `BTreeMap` keeps
/// the JSON key order deterministic.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

const TITLE_REQUIRED: &str = "This field is required.";
const TITLE_EMPTY: &str = "Title cannot be empty.";
const TITLE_TOO_LONG: &str = "Ensure this field has no more than 200 characters.";
const PRIORITY_INVALID: &str = "Priority must be one of: low, medium, high, urgent";
const STATUS_INVALID: &str = "Status must be one of: todo, in_progress, review, done";

/// Validate a create payload, producing normalized fields with defaults
/// applied, or the per-field error map. Nothing is persisted on failure.
pub fn validate_new(draft: TaskDraft) -> Result<NewTask, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = collect(&mut errors, "title", check_title(draft.title.as_deref(), true));
    let priority = collect(&mut errors, "priority", check_priority(draft.priority.as_deref()));
    let status = collect(&mut errors, "status", check_status(draft.status.as_deref()));

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewTask {
        // check_title returned Some for a present, valid title; required=true
        // means an absent title already produced an error above.
        title: title.flatten().unwrap_or_default(),
        description: draft.description.unwrap_or_default(),
        priority: priority.flatten().unwrap_or_default(),
        status: status.flatten().unwrap_or_default(),
        due_date: draft.due_date,
    })
}

/// Validate a partial-update payload. Only supplied fields are checked;
/// absent fields keep their stored value.
pub fn validate_patch(patch: TaskPatch) -> Result<TaskChanges, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = collect(&mut errors, "title", check_title(patch.title.as_deref(), false));
    let priority = collect(&mut errors, "priority", check_priority(patch.priority.as_deref()));
    let status = collect(&mut errors, "status", check_status(patch.status.as_deref()));

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TaskChanges {
        title: title.flatten(),
        description: patch.description,
        priority: priority.flatten(),
        status: status.flatten(),
        due_date: patch.due_date,
    })
}

fn collect<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    result: Result<T, String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.entry(field).or_default().push(message);
            None
        }
    }
}

/// Title: required on create, non-empty after trimming, at most
/// [`TITLE_MAX_CHARS`] characters. Returns the trimmed value.
fn check_title(raw: Option<&str>, required: bool) -> Result<Option<String>, String> {
    let Some(raw) = raw else {
        if required {
            return Err(TITLE_REQUIRED.to_string());
        }
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TITLE_EMPTY.to_string());
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(TITLE_TOO_LONG.to_string());
    }
    Ok(Some(trimmed.to_string()))
}

fn check_priority(raw: Option<&str>) -> Result<Option<Priority>, String> {
    match raw {
        None => Ok(None),
        Some(s) => Priority::from_str(s)
            .map(Some)
            .ok_or_else(|| PRIORITY_INVALID.to_string()),
    }
}

fn check_status(raw: Option<&str>) -> Result<Option<Status>, String> {
    match raw {
        None => Ok(None),
        Some(s) => Status::from_str(s)
            .map(Some)
            .ok_or_else(|| STATUS_INVALID.to_string()),
    }
}
