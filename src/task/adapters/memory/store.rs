//! In-memory task store for tests and embedding callers.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::task::{
    domain::{Task, TaskFilter, TaskId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, Tracking, ensure_not_cancelled},
};

/// Thread-safe in-memory task store.
///
/// Clones share the same records and the same staging area.
pub struct InMemoryTaskStore<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    committed: Vec<Task>,
    staged: Vec<Task>,
}

impl InMemoryTaskState {
    fn contains(&self, id: TaskId) -> bool {
        self.committed.iter().any(|task| task.id() == id)
    }

    fn is_staged(&self, id: TaskId) -> bool {
        self.staged.iter().any(|task| task.id() == id)
    }

    fn flush(&mut self) -> TaskStoreResult<usize> {
        if let Some(conflict) = self.staged.iter().find(|task| self.contains(task.id())) {
            return Err(TaskStoreError::DuplicateTask(conflict.id()));
        }
        let written = self.staged.len();
        let staged = std::mem::take(&mut self.staged);
        self.committed.extend(staged);
        Ok(written)
    }
}

impl InMemoryTaskStore<DefaultClock> {
    /// Creates an empty store stamping writes with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store stamping writes with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock,
        }
    }

    /// Returns the number of staged, unflushed creates.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the state lock is poisoned.
    pub fn staged_count(&self) -> TaskStoreResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.staged.len())
    }
}

impl<C> Clone for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C> TaskStore for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    async fn create(
        &self,
        task: Task,
        save_changes: bool,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Task> {
        ensure_not_cancelled(cancel)?;
        let mut state = self.state.write().map_err(lock_error)?;
        if state.is_staged(task.id()) || (save_changes && state.contains(task.id())) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }

        let mut stored = task;
        stored.touch(self.clock.utc());
        state.staged.push(stored.clone());
        if save_changes && let Err(err) = state.flush() {
            state.staged.retain(|pending| pending.id() != stored.id());
            return Err(err);
        }
        Ok(stored)
    }

    async fn save_changes(&self, cancel: &CancellationToken) -> TaskStoreResult<usize> {
        ensure_not_cancelled(cancel)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.flush()
    }

    async fn delete_by_id(&self, id: TaskId, cancel: &CancellationToken) -> TaskStoreResult<bool> {
        ensure_not_cancelled(cancel)?;
        let mut state = self.state.write().map_err(lock_error)?;
        let before = state.committed.len();
        state.committed.retain(|task| task.id() != id);
        Ok(state.committed.len() < before)
    }

    async fn update(&self, task: &Task, cancel: &CancellationToken) -> TaskStoreResult<bool> {
        ensure_not_cancelled(cancel)?;
        let mut state = self.state.write().map_err(lock_error)?;
        let Some(stored) = state
            .committed
            .iter_mut()
            .find(|stored| stored.id() == task.id())
        else {
            return Ok(false);
        };
        stored.overwrite_fields(task);
        stored.touch(self.clock.utc());
        Ok(true)
    }

    async fn fetch(
        &self,
        filter: Option<&TaskFilter>,
        _tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Vec<Task>> {
        ensure_not_cancelled(cancel)?;
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .committed
            .iter()
            .filter(|task| filter.is_none_or(|condition| condition.matches(task)))
            .cloned()
            .collect())
    }

    async fn get_by_id(
        &self,
        id: TaskId,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Option<Task>> {
        ensure_not_cancelled(cancel)?;
        let state = self.state.read().map_err(lock_error)?;
        let committed = state.committed.iter().find(|task| task.id() == id);
        let found = match (committed, tracking) {
            (Some(task), _) => Some(task),
            (None, Tracking::Tracked) => state.staged.iter().find(|task| task.id() == id),
            (None, Tracking::NoTracking) => None,
        };
        Ok(found.cloned())
    }
}
