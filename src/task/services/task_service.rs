//! Service layer for validated task mutations and ordered listings.

use crate::task::{
    domain::{Task, TaskFilter, TaskId, TaskValidationError, order_for_listing},
    ports::{TaskQuery, TaskStore, TaskStoreError, TaskValidator, Tracking},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Store operation named in wrapped storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    /// Inserting a task.
    Create,
    /// Flushing staged inserts.
    SaveChanges,
    /// Overwriting a task.
    Update,
    /// Removing a task.
    Delete,
    /// Point lookup.
    GetById,
    /// Loading the full listing.
    List,
}

impl TaskOperation {
    /// Returns a stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::SaveChanges => "save_changes",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::GetById => "get_by_id",
            Self::List => "list",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// The store failed while performing `operation`.
    #[error("task {operation} failed: {source}")]
    Store {
        /// Operation that failed.
        operation: TaskOperation,
        /// Underlying store failure.
        #[source]
        source: TaskStoreError,
    },

    /// The caller cancelled the operation.
    #[error("task operation cancelled")]
    Cancelled,
}

impl TaskServiceError {
    /// Wraps a store failure, keeping cancellation distinct.
    #[must_use]
    pub fn from_store(operation: TaskOperation, source: TaskStoreError) -> Self {
        match source {
            TaskStoreError::Cancelled => Self::Cancelled,
            other => Self::Store {
                operation,
                source: other,
            },
        }
    }

    /// Returns the validation failure, if this is one.
    #[must_use]
    pub const fn validation(&self) -> Option<&TaskValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Validates task mutations before they reach the store and orders task
/// listings for presentation.
///
/// The service keeps no state of its own; every read goes to the store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mockable::DefaultClock;
/// use tasklist::task::{
///     adapters::memory::InMemoryTaskStore,
///     domain::Task,
///     ports::Tracking,
///     services::TaskService,
///     validation::DefaultTaskValidator,
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let service = TaskService::new(
///     Arc::new(InMemoryTaskStore::new()),
///     Arc::new(DefaultTaskValidator::new()),
///     Arc::new(DefaultClock),
/// );
/// let cancel = CancellationToken::new();
/// let created = service
///     .create(Task::new("Buy milk", &DefaultClock), true, &cancel)
///     .await
///     .unwrap();
/// let listed = service.get_all(Tracking::NoTracking, &cancel).await.unwrap();
/// assert_eq!(listed, vec![created]);
/// # });
/// ```
pub struct TaskService<S, V, C>
where
    S: TaskStore,
    V: TaskValidator,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    validator: Arc<V>,
    clock: Arc<C>,
}

impl<S, V, C> Clone for TaskService<S, V, C>
where
    S: TaskStore,
    V: TaskValidator,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            validator: Arc::clone(&self.validator),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, V, C> TaskService<S, V, C>
where
    S: TaskStore,
    V: TaskValidator,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, validator: Arc<V>, clock: Arc<C>) -> Self {
        Self {
            store,
            validator,
            clock,
        }
    }

    /// Validates and stores a new task.
    ///
    /// With `save_changes = false` the insert is staged and becomes durable
    /// on the next [`Self::save_changes`] or immediate create.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] without touching the store
    /// when the task is invalid, [`TaskServiceError::Store`] when the store
    /// rejects the insert, or [`TaskServiceError::Cancelled`].
    #[instrument(skip(self, task, cancel), fields(task_id = %task.id()))]
    pub async fn create(
        &self,
        task: Task,
        save_changes: bool,
        cancel: &CancellationToken,
    ) -> TaskServiceResult<Task> {
        self.check(&task)?;
        let stored = self
            .store
            .create(task, save_changes, cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::Create, err))?;
        debug!(save_changes, "task created");
        Ok(stored)
    }

    /// Flushes staged creates and returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] or [`TaskServiceError::Cancelled`].
    #[instrument(skip(self, cancel))]
    pub async fn save_changes(&self, cancel: &CancellationToken) -> TaskServiceResult<usize> {
        let written = self
            .store
            .save_changes(cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::SaveChanges, err))?;
        info!(written, "staged tasks flushed");
        Ok(written)
    }

    /// Validates the whole task and overwrites the stored record.
    ///
    /// Returns `false` when no record has the task's identifier.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    #[instrument(skip(self, task, cancel), fields(task_id = %task.id()))]
    pub async fn update(&self, task: &Task, cancel: &CancellationToken) -> TaskServiceResult<bool> {
        self.check(task)?;
        let updated = self
            .store
            .update(task, cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::Update, err))?;
        debug!(updated, "task update applied");
        Ok(updated)
    }

    /// Deletes a task. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] or [`TaskServiceError::Cancelled`].
    #[instrument(skip(self, cancel))]
    pub async fn delete_by_id(
        &self,
        id: TaskId,
        cancel: &CancellationToken,
    ) -> TaskServiceResult<bool> {
        let deleted = self
            .store
            .delete_by_id(id, cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::Delete, err))?;
        debug!(deleted, "task delete applied");
        Ok(deleted)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] or [`TaskServiceError::Cancelled`].
    pub async fn get_by_id(
        &self,
        id: TaskId,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskServiceResult<Option<Task>> {
        self.store
            .get_by_id(id, tracking, cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::GetById, err))
    }

    /// Builds a deferred query over all tasks, optionally narrowed.
    #[must_use]
    pub fn get(&self, filter: Option<TaskFilter>, tracking: Tracking) -> TaskQuery<'_, S> {
        TaskQuery::new(&*self.store, filter, tracking)
    }

    /// Loads every task in presentation order: upcoming, then done, then
    /// overdue.
    ///
    /// The clock is read once per call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] or [`TaskServiceError::Cancelled`].
    #[instrument(skip(self, cancel))]
    pub async fn get_all(
        &self,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskServiceResult<Vec<Task>> {
        let tasks = self
            .get(None, tracking)
            .to_list(cancel)
            .await
            .map_err(|err| TaskServiceError::from_store(TaskOperation::List, err))?;
        let now = self.clock.utc();
        debug!(count = tasks.len(), %now, "ordering task listing");
        Ok(order_for_listing(tasks, now))
    }

    fn check(&self, task: &Task) -> Result<(), TaskValidationError> {
        self.validator.validate(task).inspect_err(|err| {
            warn!(
                task_id = %task.id(),
                violations = err.violations().len(),
                "task rejected by validation"
            );
        })
    }
}
