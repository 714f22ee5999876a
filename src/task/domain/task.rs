//! Task aggregate root.

use super::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A to-do record.
///
/// `modified_time` is owned by the store, which stamps it on every create and
/// update. Builders never change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    is_done: bool,
    is_favorite: bool,
    due_time: Option<DateTime<Utc>>,
    reminder_time: Option<DateTime<Utc>>,
    modified_time: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted completion flag.
    pub is_done: bool,
    /// Persisted pin flag.
    pub is_favorite: bool,
    /// Persisted due time, if any.
    pub due_time: Option<DateTime<Utc>>,
    /// Persisted reminder time, if any.
    pub reminder_time: Option<DateTime<Utc>>,
    /// Timestamp of the latest successful write.
    pub modified_time: DateTime<Utc>,
}

impl Task {
    /// Creates an open, unpinned task with no due or reminder time.
    #[must_use]
    pub fn new(title: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            is_done: false,
            is_favorite: false,
            due_time: None,
            reminder_time: None,
            modified_time: clock.utc(),
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            is_done: data.is_done,
            is_favorite: data.is_favorite,
            due_time: data.due_time,
            reminder_time: data.reminder_time,
            modified_time: data.modified_time,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns `true` when the task is completed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.is_done
    }

    /// Returns `true` when the task is pinned.
    #[must_use]
    pub const fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    /// Returns the due time, if any.
    #[must_use]
    pub const fn due_time(&self) -> Option<DateTime<Utc>> {
        self.due_time
    }

    /// Returns the reminder time, if any.
    #[must_use]
    pub const fn reminder_time(&self) -> Option<DateTime<Utc>> {
        self.reminder_time
    }

    /// Returns the timestamp of the latest successful write.
    #[must_use]
    pub const fn modified_time(&self) -> DateTime<Utc> {
        self.modified_time
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_done(mut self, is_done: bool) -> Self {
        self.is_done = is_done;
        self
    }

    /// Sets the pin flag.
    #[must_use]
    pub const fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Sets or clears the due time.
    #[must_use]
    pub const fn with_due_time(mut self, due_time: Option<DateTime<Utc>>) -> Self {
        self.due_time = due_time;
        self
    }

    /// Sets or clears the reminder time.
    #[must_use]
    pub const fn with_reminder_time(mut self, reminder_time: Option<DateTime<Utc>>) -> Self {
        self.reminder_time = reminder_time;
        self
    }

    /// Stamps the write time. Reserved for store adapters.
    pub(crate) const fn touch(&mut self, at: DateTime<Utc>) {
        self.modified_time = at;
    }

    /// Copies the user-editable fields of `source` onto this record.
    ///
    /// Identity and `modified_time` are left untouched.
    pub(crate) fn overwrite_fields(&mut self, source: &Self) {
        self.title.clone_from(&source.title);
        self.is_done = source.is_done;
        self.is_favorite = source.is_favorite;
        self.due_time = source.due_time;
        self.reminder_time = source.reminder_time;
    }
}
