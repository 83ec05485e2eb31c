//! Task data model and API payload types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Priority level of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Workflow state of a task. Any status may move to any other status;
/// there are no guarded transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Task — the core data model, maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// A single task record.
///
/// `id`, `created_at`, and `updated_at` are assigned by the store; clients
/// never set them. `created_at <= updated_at` holds for every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /tasks` — a candidate task before validation.
///
/// `priority` and `status` arrive as raw strings so off-enum values become
/// field-level validation errors rather than deserialization failures.
/// Unknown fields (including client-supplied `id`/`created_at`/`updated_at`)
/// are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Body for `PATCH /tasks/{id}` — only supplied fields change.
///
/// `due_date` distinguishes "absent" (keep stored value) from an explicit
/// `null` (clear the date) via the double-`Option`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query parameters for `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized write payloads (produced by the validation layer)
// ---------------------------------------------------------------------------

/// Validated, normalized fields for a create.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
}

/// Validated, normalized fields for a partial update. `None` means the
/// stored value is kept; `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub due_date: Option<Option<NaiveDate>>,
}

// ---------------------------------------------------------------------------
// Aggregate row types (insights report)
// ---------------------------------------------------------------------------

/// One row of the per-priority breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

/// One row of the per-status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: i64,
}

/// A date in the next week with at least one task due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusyDay {
    pub due_date: NaiveDate,
    pub task_count: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_roundtrip() {
        for p in &[
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Urgent,
        ] {
            let json = serde_json::to_string(p).unwrap();
            let back: Priority = serde_json::from_str(&json).unwrap();
            assert_eq!(*p, back);
            assert_eq!(Priority::from_str(p.as_str()), Some(*p));
        }
        assert_eq!(Priority::from_str("critical"), None);
    }

    #[test]
    fn status_roundtrip() {
        for s in &[Status::Todo, Status::InProgress, Status::Review, Status::Done] {
            let json = serde_json::to_string(s).unwrap();
            let back: Status = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(Status::from_str(s.as_str()), Some(*s));
        }
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in_progress\"");
        assert_eq!(Status::from_str("archived"), None);
    }

    #[test]
    fn defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Status::default(), Status::Todo);
    }

    #[test]
    fn draft_ignores_server_assigned_and_unknown_fields() {
        let json = r#"{
            "id": 99,
            "title": "Write report",
            "created_at": "2026-01-01T00:00:00Z",
            "color": "red"
        }"#;
        let draft: TaskDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Write report"));
        assert!(draft.priority.is_none());
    }

    #[test]
    fn patch_distinguishes_absent_from_null_due_date() {
        let absent: TaskPatch = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        assert!(absent.due_date.is_none());

        let cleared: TaskPatch = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: TaskPatch = serde_json::from_str(r#"{"due_date": "2026-08-10"}"#).unwrap();
        assert_eq!(
            set.due_date,
            Some(Some(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()))
        );
    }

    #[test]
    fn task_serializes_wire_format() {
        let task = Task {
            id: 7,
            title: "Ship release".into(),
            description: "".into(),
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2026, 8, 14),
            status: Status::InProgress,
            created_at: "2026-08-01T10:00:00Z".parse().unwrap(),
            updated_at: "2026-08-02T09:30:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["priority"], "high");
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["due_date"], "2026-08-14");
    }
}
