//! SQLite-backed task storage.
//!
//! All access goes through a single `Mutex<Connection>`, so a
//! read-modify-write update is atomic with respect to other requests in
//! this process. Everything else is delegated to SQLite.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ApiError;
use crate::model::{
    BusyDay, ListQuery, NewTask, Priority, PriorityCount, Status, StatusCount, Task, TaskChanges,
};

/// SQL schema for the tasks table.
///
/// Dates are ISO-8601 TEXT, so lexicographic comparison is calendar
/// comparison. AUTOINCREMENT keeps ids from being reused after deletes.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    priority    TEXT NOT NULL,
    status      TEXT NOT NULL,
    due_date    TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
";

const COLUMNS: &str = "id, title, description, priority, status, due_date, created_at, updated_at";

/// Persistent storage for tasks, backed by SQLite.
pub struct TaskStore {
    conn: Mutex<Connection>,
}

impl TaskStore {
    /// Open or create a task database at the given path.
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory task database (useful for tests).
    pub fn open_in_memory() -> Result<Self, ApiError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new task, stamping `id` and both timestamps.
    pub fn create(&self, new: NewTask) -> Result<Task, ApiError> {
        let now = Utc::now();
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO tasks (title, description, priority, status, due_date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.title,
                new.description,
                new.priority.as_str(),
                new.status.as_str(),
                new.due_date.map(|d| d.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Task {
            id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            due_date: new.due_date,
            status: new.status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a task by id.
    pub fn get(&self, id: i64) -> Result<Task, ApiError> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    /// Apply a partial update: only supplied fields change, `updated_at`
    /// is refreshed. Read, merge, and write happen under one lock.
    pub fn update(&self, id: i64, changes: TaskChanges) -> Result<Task, ApiError> {
        let conn = self.conn()?;
        let mut task = Self::fetch(&conn, id)?;

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();

        conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, status = ?4, \
             due_date = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(|d| d.to_string()),
                task.updated_at.to_rfc3339(),
                id,
            ],
        )?;

        Ok(task)
    }

    /// Delete a task by id. Hard delete, no tombstone.
    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // List / Query
    // -----------------------------------------------------------------------

    /// List tasks with optional equality filters and sort order.
    ///
    /// Filter values are compared verbatim; an off-enum value matches no
    /// rows rather than erroring. An unrecognized sort key falls back to
    /// the default `created_at DESC`.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<Task>, ApiError> {
        let mut where_clauses: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref status) = query.status {
            where_clauses.push(format!("status = ?{}", params.len() + 1));
            params.push(status.clone());
        }
        if let Some(ref priority) = query.priority {
            where_clauses.push(format!("priority = ?{}", params.len() + 1));
            params.push(priority.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_clauses.join(" AND "))
        };
        let order_sql = SortOrder::parse(query.sort.as_deref()).sql();

        let sql = format!("SELECT {COLUMNS} FROM tasks {where_sql} ORDER BY {order_sql}");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), read_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(decode(row?)?);
        }
        Ok(tasks)
    }

    // -----------------------------------------------------------------------
    // Aggregates (insights)
    // -----------------------------------------------------------------------

    /// Count of all tasks.
    pub fn count_all(&self) -> Result<i64, ApiError> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Task counts grouped by priority, ascending alphabetical by label.
    pub fn priority_breakdown(&self) -> Result<Vec<PriorityCount>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT priority, COUNT(*) FROM tasks GROUP BY priority ORDER BY priority ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (label, count) = row?;
            let priority = Priority::from_str(&label)
                .ok_or_else(|| ApiError::Storage(format!("bad priority label: {label}")))?;
            breakdown.push(PriorityCount { priority, count });
        }
        Ok(breakdown)
    }

    /// Task counts grouped by status, ascending alphabetical by label.
    pub fn status_breakdown(&self) -> Result<Vec<StatusCount>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status ORDER BY status ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (label, count) = row?;
            let status = Status::from_str(&label)
                .ok_or_else(|| ApiError::Storage(format!("bad status label: {label}")))?;
            breakdown.push(StatusCount { status, count });
        }
        Ok(breakdown)
    }

    /// Count of tasks due in `[from, to]` inclusive, excluding done tasks.
    pub fn due_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<i64, ApiError> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks \
             WHERE due_date IS NOT NULL AND due_date >= ?1 AND due_date <= ?2 AND status != ?3",
            params![from.to_string(), to.to_string(), Status::Done.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count of tasks due strictly before `before`, excluding done tasks.
    pub fn overdue_count(&self, before: NaiveDate) -> Result<i64, ApiError> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks \
             WHERE due_date IS NOT NULL AND due_date < ?1 AND status != ?2",
            params![before.to_string(), Status::Done.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-date task counts for due dates in `[from, to]` inclusive,
    /// ascending by date, at most `limit` entries. Counts all statuses.
    pub fn busy_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<BusyDay>, ApiError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT due_date, COUNT(*) FROM tasks \
             WHERE due_date IS NOT NULL AND due_date >= ?1 AND due_date <= ?2 \
             GROUP BY due_date ORDER BY due_date ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![from.to_string(), to.to_string(), limit as i64],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut days = Vec::new();
        for row in rows {
            let (date, task_count) = row?;
            let due_date = parse_date(&date)?;
            days.push(BusyDay {
                due_date,
                task_count,
            });
        }
        Ok(days)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Task, ApiError> {
        let raw = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                read_row,
            )
            .optional()?
            .ok_or(ApiError::NotFound)?;
        decode(raw)
    }
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Recognized `sort` parameter values. `priority` orders by its text label,
/// so the order is alphabetical (high < low < medium < urgent), not by
/// severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SortOrder {
    DueDateAsc,
    DueDateDesc,
    PriorityAsc,
    PriorityDesc,
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

impl SortOrder {
    /// Parse a `sort` query value. Unrecognized keys fall back to the
    /// default rather than erroring.
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("due_date") => Self::DueDateAsc,
            Some("-due_date") => Self::DueDateDesc,
            Some("priority") => Self::PriorityAsc,
            Some("-priority") => Self::PriorityDesc,
            Some("created_at") => Self::CreatedAtAsc,
            _ => Self::CreatedAtDesc,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::DueDateAsc => "due_date ASC",
            Self::DueDateDesc => "due_date DESC",
            Self::PriorityAsc => "priority ASC",
            Self::PriorityDesc => "priority DESC",
            Self::CreatedAtAsc => "created_at ASC",
            Self::CreatedAtDesc => "created_at DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

/// Raw column values, read inside the rusqlite row callback; enum and date
/// parsing happens afterwards so decode failures become storage errors.
struct RawRow {
    id: i64,
    title: String,
    description: String,
    priority: String,
    status: String,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: row.get(3)?,
        status: row.get(4)?,
        due_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn decode(raw: RawRow) -> Result<Task, ApiError> {
    let priority = Priority::from_str(&raw.priority)
        .ok_or_else(|| ApiError::Storage(format!("bad priority label: {}", raw.priority)))?;
    let status = Status::from_str(&raw.status)
        .ok_or_else(|| ApiError::Storage(format!("bad status label: {}", raw.status)))?;
    let due_date = raw.due_date.as_deref().map(parse_date).transpose()?;

    Ok(Task {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        priority,
        due_date,
        status,
        created_at: parse_timestamp(&raw.created_at)?,
        updated_at: parse_timestamp(&raw.updated_at)?,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    s.parse::<NaiveDate>()
        .map_err(|e| ApiError::Storage(format!("bad date '{s}': {e}")))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Storage(format!("bad timestamp '{s}': {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
