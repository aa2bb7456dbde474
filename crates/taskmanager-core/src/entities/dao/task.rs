use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Priority, Status};

/// A row in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Short opaque id assigned at creation; never changes.
    pub id: String,
    pub title: String,
    /// Creation time, reset on every edit.
    pub pub_date: DateTime<Utc>,
    /// Due time, or the completion time once marked finished.
    pub finish: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    pub information: String,
    pub owner_id: i64,
}

/// The user-editable part of a task, produced by [`crate::forms::TaskForm`].
///
/// Both creation and edit write every one of these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub finish: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    pub information: String,
}

/// Per-status task totals shown on the profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub active: i64,
    pub finished: i64,
    pub failed: i64,
}
