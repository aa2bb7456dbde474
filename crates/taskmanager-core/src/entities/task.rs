use crate::domain::{parse_priority, parse_status, priority_name, status_name, Status};
use crate::entities::{
    decode_error, decode_ts, encode_ts, now, SqliteStore, StatusCounts, TaskFields, TaskRecord,
};
use crate::error::CoreError;

use std::future::Future;

use tracing::warn;
use uuid::Uuid;

/// Length of generated task ids (hex characters).
pub const TASK_ID_LEN: usize = 8;

/// Fresh ids tried before a primary-key collision is reported.
const MAX_ID_ATTEMPTS: usize = 8;

pub trait TaskStore: Send + Sync + 'static {
    /// Persist a new task owned by `owner_id` under a freshly generated id.
    /// `pub_date` is set to the current time.
    fn create_task(
        &self,
        fields: TaskFields,
        owner_id: i64,
    ) -> impl Future<Output = Result<TaskRecord, sqlx::Error>> + Send;
    /// All tasks of `owner_id`, ascending by `finish` (NULL first).
    fn list_tasks_by_owner(
        &self,
        owner_id: i64,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn get_task(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;
    /// Overwrite every mutable field and reset `pub_date`. `id` and owner are
    /// kept. Fails with [`CoreError::NotFound`] for an unknown id.
    fn update_task(
        &self,
        id: &str,
        fields: TaskFields,
    ) -> impl Future<Output = Result<TaskRecord, CoreError>> + Send;
    /// Set status to finished and `finish` to now in one statement.
    /// Returns whether a row was affected.
    fn mark_finished(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn delete_task(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn count_by_status(
        &self,
        owner_id: i64,
    ) -> impl Future<Output = Result<StatusCounts, sqlx::Error>> + Send;
}

/// Short opaque id: the tail of a random v4 UUID.
pub fn new_task_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[hex.len() - TASK_ID_LEN..].to_owned()
}

type TaskRow = (String, String, String, Option<String>, String, String, String, i64);

const TASK_COLUMNS: &str = "id, title, pub_date, finish, priority, status, information, owner_id";

fn task_from_row(row: TaskRow) -> Result<TaskRecord, sqlx::Error> {
    let (id, title, pub_date, finish, priority, status, information, owner_id) = row;
    let priority = parse_priority(&priority)
        .ok_or_else(|| decode_error(format!("task {id}: unknown priority {priority:?}")))?;
    let status = parse_status(&status)
        .ok_or_else(|| decode_error(format!("task {id}: unknown status {status:?}")))?;
    Ok(TaskRecord {
        pub_date: decode_ts(&pub_date, "tasks.pub_date"),
        finish: finish.as_deref().map(|raw| decode_ts(raw, "tasks.finish")),
        id,
        title,
        priority,
        status,
        information,
        owner_id,
    })
}

impl TaskStore for SqliteStore {
    async fn create_task(&self, fields: TaskFields, owner_id: i64) -> Result<TaskRecord, sqlx::Error> {
        let pub_date = now();
        let mut last_err = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = new_task_id();
            let inserted = sqlx::query(
                "INSERT INTO tasks (id, title, pub_date, finish, priority, status, information, owner_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&id)
            .bind(&fields.title)
            .bind(encode_ts(&pub_date))
            .bind(fields.finish.as_ref().map(encode_ts))
            .bind(priority_name(fields.priority))
            .bind(status_name(fields.status))
            .bind(&fields.information)
            .bind(owner_id)
            .execute(self.pool())
            .await;
            match inserted {
                Ok(_) => {
                    return Ok(TaskRecord {
                        id,
                        title: fields.title,
                        pub_date,
                        finish: fields.finish,
                        priority: fields.priority,
                        status: fields.status,
                        information: fields.information,
                        owner_id,
                    });
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    warn!(task_id = %id, "task id collision; retrying with a fresh id");
                    last_err = Some(sqlx::Error::Database(db));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(sqlx::Error::RowNotFound))
    }

    async fn list_tasks_by_owner(&self, owner_id: i64) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1 \
             ORDER BY finish ASC, pub_date ASC, id ASC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(task_from_row).collect()
    }

    async fn get_task(&self, id: &str) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        row.map(task_from_row).transpose()
    }

    async fn update_task(&self, id: &str, fields: TaskFields) -> Result<TaskRecord, CoreError> {
        let pub_date = now();
        let result = sqlx::query(
            "UPDATE tasks SET title = ?1, pub_date = ?2, finish = ?3, priority = ?4, \
             status = ?5, information = ?6 WHERE id = ?7",
        )
        .bind(&fields.title)
        .bind(encode_ts(&pub_date))
        .bind(fields.finish.as_ref().map(encode_ts))
        .bind(priority_name(fields.priority))
        .bind(status_name(fields.status))
        .bind(&fields.information)
        .bind(id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("task {id}")));
        }
        self.get_task(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("task {id}")))
    }

    async fn mark_finished(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET status = ?1, finish = ?2 WHERE id = ?3")
            .bind(status_name(Status::Finished))
            .bind(encode_ts(&now()))
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_task(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self, owner_id: i64) -> Result<StatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tasks WHERE owner_id = ?1 GROUP BY status",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            match parse_status(&status) {
                Some(Status::Active) => counts.active = n,
                Some(Status::Finished) => counts.finished = n,
                Some(Status::Failed) => counts.failed = n,
                None => warn!(status = %status, "ignoring unknown task status in counts"),
            }
        }
        Ok(counts)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
