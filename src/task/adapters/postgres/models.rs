//! Diesel row models for task persistence.

use super::schema::todos;
use crate::task::domain::{PersistedTaskData, Task, TaskId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Stored task row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Completion flag.
    pub is_done: bool,
    /// Pin flag.
    pub is_favorite: bool,
    /// Optional due time.
    pub due_time: Option<DateTime<Utc>>,
    /// Optional reminder time.
    pub reminder_time: Option<DateTime<Utc>>,
    /// Timestamp of the latest write.
    pub modified_time: DateTime<Utc>,
}

impl From<&Task> for TodoRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().to_owned(),
            is_done: task.is_done(),
            is_favorite: task.is_favorite(),
            due_time: task.due_time(),
            reminder_time: task.reminder_time(),
            modified_time: task.modified_time(),
        }
    }
}

impl From<TodoRow> for Task {
    fn from(row: TodoRow) -> Self {
        Self::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(row.id),
            title: row.title,
            is_done: row.is_done,
            is_favorite: row.is_favorite,
            due_time: row.due_time,
            reminder_time: row.reminder_time,
            modified_time: row.modified_time,
        })
    }
}
