//! Derived insights over current task data.
//!
//! The report is recomputed from the store on every call; nothing is
//! cached or persisted. The reference date is a parameter so callers (and
//! tests) control what "today" means.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::ApiError;
use crate::model::{BusyDay, Priority, PriorityCount, StatusCount};
use crate::store::TaskStore;

/// Days ahead (inclusive) considered "this week".
const WEEK_AHEAD_DAYS: i64 = 7;

/// Maximum number of busy-day entries reported.
const BUSY_DAY_LIMIT: usize = 5;

/// Headline numbers plus the templated digest.
#[derive(Debug, Serialize)]
pub struct InsightsSummary {
    pub text: String,
    pub total_tasks: i64,
    pub due_this_week: i64,
    pub overdue_tasks: i64,
    pub dominant_priority: Option<Priority>,
}

/// The full insights report returned by `GET /insights`.
#[derive(Debug, Serialize)]
pub struct InsightsReport {
    pub summary: InsightsSummary,
    pub priority_breakdown: Vec<PriorityCount>,
    pub status_breakdown: Vec<StatusCount>,
    pub busy_days: Vec<BusyDay>,
}

/// Compute the insights report against the store as of `today`.
pub fn compute(store: &TaskStore, today: NaiveDate) -> Result<InsightsReport, ApiError> {
    let total_tasks = store.count_all()?;
    let priority_breakdown = store.priority_breakdown()?;
    let status_breakdown = store.status_breakdown()?;

    let week_later = today + Duration::days(WEEK_AHEAD_DAYS);
    let due_this_week = store.due_in_range(today, week_later)?;
    let overdue_tasks = store.overdue_count(today)?;
    let busy_days = store.busy_days(today, week_later, BUSY_DAY_LIMIT)?;

    let dominant_priority = dominant(&priority_breakdown);
    let text = summary_text(total_tasks, dominant_priority, due_this_week, overdue_tasks);

    Ok(InsightsReport {
        summary: InsightsSummary {
            text,
            total_tasks,
            due_this_week,
            overdue_tasks,
            dominant_priority,
        },
        priority_breakdown,
        status_breakdown,
        busy_days,
    })
}

/// The priority with the highest count. Ties resolve to the first maximum
/// in breakdown (alphabetical) order; `None` when there are no tasks.
fn dominant(breakdown: &[PriorityCount]) -> Option<Priority> {
    let mut best_count = 0;
    let mut dominant = None;
    for entry in breakdown {
        if entry.count > best_count {
            best_count = entry.count;
            dominant = Some(entry.priority);
        }
    }
    dominant
}

fn summary_text(
    total_tasks: i64,
    dominant_priority: Option<Priority>,
    due_this_week: i64,
    overdue_tasks: i64,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if total_tasks == 0 {
        parts.push("No tasks yet. Add some tasks to get started!".to_string());
    } else {
        if let Some(priority) = dominant_priority {
            parts.push(format!(
                "Your workload is dominated by {priority} priority tasks."
            ));
        }

        if due_this_week > 5 {
            parts.push("🚨 Busy week ahead! You have many tasks due this week.".to_string());
        } else if due_this_week > 2 {
            parts.push("📅 Moderate week - you have several tasks coming up.".to_string());
        } else {
            parts.push("✅ Light week - you're on top of your tasks!".to_string());
        }

        if overdue_tasks > 0 {
            parts.push(format!(
                "⚠️ You have {overdue_tasks} overdue task(s) that need attention."
            ));
        }
    }

    parts.join(" ")
}
