//! Store port for task persistence and querying.

use crate::task::domain::{Task, TaskFilter, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Whether a read takes part in the current unit of work.
///
/// Tracked point lookups also see creates that were staged but not yet
/// flushed. Untracked reads only see committed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    /// The caller may modify and save the returned record.
    #[default]
    Tracked,
    /// Read-only access.
    NoTracking,
}

impl Tracking {
    /// Maps the `as_no_tracking` flag used by callers onto a mode.
    #[must_use]
    pub const fn from_no_tracking(as_no_tracking: bool) -> Self {
        if as_no_tracking {
            Self::NoTracking
        } else {
            Self::Tracked
        }
    }
}

/// Task persistence contract.
///
/// Every operation takes a cancellation token. A token that fires before or
/// during the call yields [`TaskStoreError::Cancelled`] and leaves stored
/// state as it was.
///
/// A store value also acts as a unit of work: creates made with
/// `save_changes = false` are staged on it until [`TaskStore::save_changes`]
/// (or a later create with `save_changes = true`) flushes them together.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task and returns the stored record, with
    /// `modified_time` stamped by the store.
    ///
    /// With `save_changes = false` the record is only staged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier is
    /// already committed or staged.
    async fn create(
        &self,
        task: Task,
        save_changes: bool,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Task>;

    /// Commits every staged create atomically and returns how many records
    /// were written. On failure the staged records are kept.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when a staged identifier
    /// was committed in the meantime, or a persistence error.
    async fn save_changes(&self, cancel: &CancellationToken) -> TaskStoreResult<usize>;

    /// Deletes the record with `id`. Returns whether a record matched.
    async fn delete_by_id(&self, id: TaskId, cancel: &CancellationToken) -> TaskStoreResult<bool>;

    /// Overwrites title, completion, pin, due and reminder fields of the
    /// record with the same identifier and stamps `modified_time` with the
    /// store clock. The caller's `modified_time` is ignored. Returns whether
    /// a record matched.
    async fn update(&self, task: &Task, cancel: &CancellationToken) -> TaskStoreResult<bool>;

    /// Loads committed tasks matching `filter`, or every task when `None`.
    async fn fetch(
        &self,
        filter: Option<&TaskFilter>,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Vec<Task>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get_by_id(
        &self,
        id: TaskId,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Option<Task>>;

    /// Builds a deferred query over this store.
    fn get(&self, filter: Option<TaskFilter>, tracking: Tracking) -> TaskQuery<'_, Self>
    where
        Self: Sized,
    {
        TaskQuery::new(self, filter, tracking)
    }
}

/// A deferred, re-evaluatable query over a task store.
///
/// Nothing runs until one of the evaluation methods is awaited, and the same
/// query can be evaluated any number of times against the current store
/// contents.
#[derive(Debug)]
pub struct TaskQuery<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    filter: Option<TaskFilter>,
    tracking: Tracking,
}

impl<S: TaskStore + ?Sized> Clone for TaskQuery<'_, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            filter: self.filter.clone(),
            tracking: self.tracking,
        }
    }
}

impl<'a, S: TaskStore + ?Sized> TaskQuery<'a, S> {
    /// Creates a query over `store`.
    #[must_use]
    pub const fn new(store: &'a S, filter: Option<TaskFilter>, tracking: Tracking) -> Self {
        Self {
            store,
            filter,
            tracking,
        }
    }

    /// Narrows the query by an additional condition.
    #[must_use]
    pub fn filter(self, condition: TaskFilter) -> Self {
        let combined = match self.filter {
            Some(existing) => existing.and(condition),
            None => condition,
        };
        Self {
            store: self.store,
            filter: Some(combined),
            tracking: self.tracking,
        }
    }

    /// Switches the query to read-only mode.
    #[must_use]
    pub const fn as_no_tracking(mut self) -> Self {
        self.tracking = Tracking::NoTracking;
        self
    }

    /// Returns the accumulated condition, if any.
    #[must_use]
    pub const fn condition(&self) -> Option<&TaskFilter> {
        self.filter.as_ref()
    }

    /// Returns the tracking mode.
    #[must_use]
    pub const fn tracking(&self) -> Tracking {
        self.tracking
    }

    /// Evaluates the query.
    ///
    /// # Errors
    ///
    /// Propagates store failures and cancellation.
    pub async fn to_list(&self, cancel: &CancellationToken) -> TaskStoreResult<Vec<Task>> {
        self.store
            .fetch(self.filter.as_ref(), self.tracking, cancel)
            .await
    }

    /// Counts matching tasks.
    ///
    /// # Errors
    ///
    /// Propagates store failures and cancellation.
    pub async fn count(&self, cancel: &CancellationToken) -> TaskStoreResult<usize> {
        Ok(self.to_list(cancel).await?.len())
    }

    /// Returns the first matching task in store order.
    ///
    /// # Errors
    ///
    /// Propagates store failures and cancellation.
    pub async fn first(&self, cancel: &CancellationToken) -> TaskStoreResult<Option<Task>> {
        Ok(self.to_list(cancel).await?.into_iter().next())
    }
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists or is staged.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The operation was cancelled before it completed.
    #[error("task store operation cancelled")]
    Cancelled,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Fails with [`TaskStoreError::Cancelled`] once `cancel` has fired.
///
/// # Errors
///
/// Returns [`TaskStoreError::Cancelled`] when the token is cancelled.
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> TaskStoreResult<()> {
    if cancel.is_cancelled() {
        return Err(TaskStoreError::Cancelled);
    }
    Ok(())
}
