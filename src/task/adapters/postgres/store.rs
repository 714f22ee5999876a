//! `PostgreSQL` store implementation for task persistence.

use super::{filter::to_condition, models::TodoRow, schema::todos};
use crate::task::{
    domain::{Task, TaskFilter, TaskId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, Tracking, ensure_not_cancelled},
};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Timestamp precision of `timestamptz` columns.
const STORED_SUBSEC_DIGITS: u16 = 6;

/// `PostgreSQL`-backed task store.
///
/// Staged creates live in process memory on this value (and its clones)
/// until they are flushed in a single transaction.
pub struct PostgresTaskStore<C = DefaultClock>
where
    C: Clock + Send + Sync + 'static,
{
    pool: TaskPgPool,
    clock: Arc<C>,
    staged: Arc<Mutex<Vec<Task>>>,
}

impl PostgresTaskStore<DefaultClock> {
    /// Creates a store from a connection pool, stamping writes with the
    /// system clock.
    #[must_use]
    pub fn new(pool: TaskPgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }
}

impl<C> Clone for PostgresTaskStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            clock: Arc::clone(&self.clock),
            staged: Arc::clone(&self.staged),
        }
    }
}

/// Error carrier for Diesel transactions, which need `From<DieselError>`.
struct TransactionFailure(TaskStoreError);

impl From<DieselError> for TransactionFailure {
    fn from(err: DieselError) -> Self {
        Self(TaskStoreError::persistence(err))
    }
}

impl<C> PostgresTaskStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a store from a connection pool and a write clock.
    #[must_use]
    pub fn with_clock(pool: TaskPgPool, clock: Arc<C>) -> Self {
        Self {
            pool,
            clock,
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the number of staged, unflushed creates.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the staging lock is poisoned.
    pub fn staged_count(&self) -> TaskStoreResult<usize> {
        Ok(self.staged()?.len())
    }

    fn staged(&self) -> TaskStoreResult<MutexGuard<'_, Vec<Task>>> {
        self.staged.lock().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    /// Runs `f` on a pooled connection off the async executor.
    ///
    /// `cancel` is checked before the work is spawned. Spawned work is
    /// always awaited and its outcome returned. Work wrapped in
    /// [`in_transaction`] checks the same token before committing and rolls
    /// back once it has fired.
    async fn run_blocking<F, T>(&self, cancel: &CancellationToken, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection, &CancellationToken) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        ensure_not_cancelled(cancel)?;
        let pool = self.pool.clone();
        let token = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection, &token)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }

    async fn flush_staged(&self, cancel: &CancellationToken) -> TaskStoreResult<usize> {
        let batch: Vec<Task> = self.staged()?.clone();
        if batch.is_empty() {
            return Ok(0);
        }
        let rows: Vec<TodoRow> = batch.iter().map(TodoRow::from).collect();
        let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();

        let written = self
            .run_blocking(cancel, move |connection, token| {
                in_transaction(connection, token, |conn| insert_rows(conn, &rows))
            })
            .await?;

        self.staged()?
            .retain(|task| !ids.contains(task.id().as_ref()));
        tracing::debug!(written, "flushed staged tasks");
        Ok(written)
    }
}

fn in_transaction<T>(
    connection: &mut PgConnection,
    cancel: &CancellationToken,
    work: impl FnOnce(&mut PgConnection) -> Result<T, TransactionFailure>,
) -> TaskStoreResult<T> {
    connection
        .transaction::<T, TransactionFailure, _>(|conn| {
            let value = work(conn)?;
            if cancel.is_cancelled() {
                return Err(TransactionFailure(TaskStoreError::Cancelled));
            }
            Ok(value)
        })
        .map_err(|TransactionFailure(err)| err)
}

/// Reads the rounded write stamp from `clock`.
fn stamp<C: Clock>(clock: &C) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Extracts the key from a unique violation detail such as
/// `Key (id)=(<uuid>) already exists.`
fn conflicting_id(detail: &str) -> Option<TaskId> {
    let (_, rest) = detail.split_once("=(")?;
    let (key, _) = rest.split_once(')')?;
    uuid::Uuid::parse_str(key).ok().map(TaskId::from_uuid)
}

fn insert_rows(connection: &mut PgConnection, rows: &[TodoRow]) -> Result<usize, TransactionFailure> {
    let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
    // Pre-check for a precise error; the primary key still guards the race.
    let existing = todos::table
        .filter(todos::id.eq_any(ids))
        .select(todos::id)
        .first::<uuid::Uuid>(connection)
        .optional()?;
    if let Some(id) = existing {
        return Err(TransactionFailure(TaskStoreError::DuplicateTask(
            TaskId::from_uuid(id),
        )));
    }

    diesel::insert_into(todos::table)
        .values(rows)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                match info.details().and_then(conflicting_id) {
                    Some(id) => TransactionFailure(TaskStoreError::DuplicateTask(id)),
                    None => TransactionFailure::from(DieselError::DatabaseError(
                        DatabaseErrorKind::UniqueViolation,
                        info,
                    )),
                }
            }
            other => TransactionFailure::from(other),
        })
}

#[async_trait]
impl<C> TaskStore for PostgresTaskStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn create(
        &self,
        task: Task,
        save_changes: bool,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Task> {
        ensure_not_cancelled(cancel)?;
        let mut stored = task;
        stored.touch(stamp(&*self.clock));
        {
            let mut staged = self.staged()?;
            if staged.iter().any(|pending| pending.id() == stored.id()) {
                return Err(TaskStoreError::DuplicateTask(stored.id()));
            }
            staged.push(stored.clone());
        }
        if save_changes && let Err(err) = self.flush_staged(cancel).await {
            self.staged()?.retain(|pending| pending.id() != stored.id());
            return Err(err);
        }
        Ok(stored)
    }

    async fn save_changes(&self, cancel: &CancellationToken) -> TaskStoreResult<usize> {
        self.flush_staged(cancel).await
    }

    async fn delete_by_id(&self, id: TaskId, cancel: &CancellationToken) -> TaskStoreResult<bool> {
        self.run_blocking(cancel, move |connection, token| {
            in_transaction(connection, token, |conn| {
                let affected =
                    diesel::delete(todos::table.filter(todos::id.eq(id.into_inner())))
                        .execute(conn)?;
                Ok(affected > 0)
            })
        })
        .await
    }

    async fn update(&self, task: &Task, cancel: &CancellationToken) -> TaskStoreResult<bool> {
        let row = TodoRow::from(task);
        let clock = Arc::clone(&self.clock);
        self.run_blocking(cancel, move |connection, token| {
            in_transaction(connection, token, |conn| {
                let modified_time = stamp(&*clock);
                let affected = diesel::update(todos::table.filter(todos::id.eq(row.id)))
                    .set((
                        todos::title.eq(&row.title),
                        todos::is_done.eq(row.is_done),
                        todos::is_favorite.eq(row.is_favorite),
                        todos::due_time.eq(row.due_time),
                        todos::reminder_time.eq(row.reminder_time),
                        todos::modified_time.eq(modified_time),
                    ))
                    .execute(conn)?;
                Ok(affected > 0)
            })
        })
        .await
    }

    async fn fetch(
        &self,
        filter: Option<&TaskFilter>,
        _tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Vec<Task>> {
        let filter = filter.cloned();
        self.run_blocking(cancel, move |connection, token| {
            let mut query = todos::table.select(TodoRow::as_select()).into_boxed();
            if let Some(condition) = filter.as_ref() {
                query = query.filter(to_condition(condition));
            }
            let rows = query
                .order_by((todos::modified_time.asc(), todos::id.asc()))
                .load::<TodoRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            ensure_not_cancelled(token)?;
            Ok(rows.into_iter().map(Task::from).collect())
        })
        .await
    }

    async fn get_by_id(
        &self,
        id: TaskId,
        tracking: Tracking,
        cancel: &CancellationToken,
    ) -> TaskStoreResult<Option<Task>> {
        let row = self
            .run_blocking(cancel, move |connection, token| {
                let row = todos::table
                    .filter(todos::id.eq(id.into_inner()))
                    .select(TodoRow::as_select())
                    .first::<TodoRow>(connection)
                    .optional()
                    .map_err(TaskStoreError::persistence)?;
                ensure_not_cancelled(token)?;
                Ok(row)
            })
            .await?;

        match (row, tracking) {
            (Some(row), _) => Ok(Some(Task::from(row))),
            (None, Tracking::Tracked) => Ok(self
                .staged()?
                .iter()
                .find(|pending| pending.id() == id)
                .cloned()),
            (None, Tracking::NoTracking) => Ok(None),
        }
    }
}
