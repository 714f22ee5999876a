//! `PostgreSQL` integration tests for task store writes and lookups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rstest::rstest;
use tasklist::task::{
    adapters::postgres::PostgresTaskStore,
    domain::{PersistedTaskData, Task, TaskId},
    ports::{TaskStore, TaskStoreError, Tracking},
};
use tokio_util::sync::CancellationToken;

use super::helpers::{PreparedStore, minutes, now, prepared};
use crate::test_helpers::{FixedClock, SettableClock};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_create_and_lookup_round_trips(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let task = Task::new("Renew passport", &FixedClock(now - minutes(5)))
        .with_favorite(true)
        .with_due_time(Some(now + minutes(120)))
        .with_reminder_time(Some(now + minutes(60)));

    let created = ctx.store.create(task.clone(), true, &ctx.cancel).await?;
    let fetched = ctx
        .store
        .get_by_id(task.id(), Tracking::NoTracking, &ctx.cancel)
        .await?
        .ok_or_else(|| eyre::eyre!("created task not found"))?;

    eyre::ensure!(fetched == created, "fetched task differs from created task");
    eyre::ensure!(fetched.title() == "Renew passport", "title mismatch");
    eyre::ensure!(fetched.due_time() == task.due_time(), "due time mismatch");
    eyre::ensure!(
        fetched.reminder_time() == task.reminder_time(),
        "reminder time mismatch"
    );
    eyre::ensure!(fetched.modified_time() == now, "store did not stamp");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_identifier_is_rejected(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let task = Task::new("Only once", &FixedClock(now));
    ctx.store.create(task.clone(), true, &ctx.cancel).await?;

    let result = ctx.store.create(task.clone(), true, &ctx.cancel).await;

    eyre::ensure!(
        matches!(result, Err(TaskStoreError::DuplicateTask(id)) if id == task.id()),
        "expected duplicate rejection, got {result:?}"
    );
    eyre::ensure!(
        ctx.store.save_changes(&ctx.cancel).await? == 0,
        "rejected task should not stay staged"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_staged_creates_commit_together(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let first = Task::new("First", &FixedClock(now));
    let second = Task::new("Second", &FixedClock(now));
    ctx.store.create(first.clone(), false, &ctx.cancel).await?;
    ctx.store.create(second.clone(), false, &ctx.cancel).await?;

    let untracked = ctx
        .store
        .get_by_id(first.id(), Tracking::NoTracking, &ctx.cancel)
        .await?;
    let tracked = ctx
        .store
        .get_by_id(first.id(), Tracking::Tracked, &ctx.cancel)
        .await?;
    eyre::ensure!(untracked.is_none(), "staged task visible before flush");
    eyre::ensure!(tracked.is_some(), "tracked lookup should see staged task");

    let written = ctx.store.save_changes(&ctx.cancel).await?;

    eyre::ensure!(written == 2, "expected two rows, got {written}");
    let listed = ctx
        .store
        .fetch(None, Tracking::NoTracking, &ctx.cancel)
        .await?;
    eyre::ensure!(listed.len() == 2, "expected both rows after flush");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_failed_flush_writes_no_row(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let existing = Task::new("Existing", &FixedClock(now));
    ctx.store.create(existing.clone(), true, &ctx.cancel).await?;
    ctx.store
        .create(Task::new("Fresh", &FixedClock(now)), false, &ctx.cancel)
        .await?;
    ctx.store.create(existing.clone(), false, &ctx.cancel).await?;

    let result = ctx.store.save_changes(&ctx.cancel).await;

    eyre::ensure!(
        matches!(result, Err(TaskStoreError::DuplicateTask(id)) if id == existing.id()),
        "expected duplicate failure, got {result:?}"
    );
    let listed = ctx
        .store
        .fetch(None, Tracking::NoTracking, &ctx.cancel)
        .await?;
    eyre::ensure!(listed.len() == 1, "batch should not be partially written");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_update_overwrites_and_restamps(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let created = ctx
        .store
        .create(Task::new("Old title", &FixedClock(now)), true, &ctx.cancel)
        .await?;
    let payload = Task::from_persisted(PersistedTaskData {
        id: created.id(),
        title: "New title".to_owned(),
        is_done: true,
        is_favorite: false,
        due_time: None,
        reminder_time: None,
        modified_time: now - minutes(10_000),
    });

    let updated = ctx.store.update(&payload, &ctx.cancel).await?;

    eyre::ensure!(updated, "existing row should be updated");
    let stored = ctx
        .store
        .get_by_id(created.id(), Tracking::NoTracking, &ctx.cancel)
        .await?
        .ok_or_else(|| eyre::eyre!("row vanished"))?;
    eyre::ensure!(stored.title() == "New title", "title not overwritten");
    eyre::ensure!(stored.is_done(), "done flag not overwritten");
    eyre::ensure!(stored.modified_time() == now, "client timestamp was kept");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_missing_rows_report_false(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let ghost = Task::new("Ghost", &FixedClock(now));

    let updated = ctx.store.update(&ghost, &ctx.cancel).await?;
    let deleted = ctx.store.delete_by_id(TaskId::new(), &ctx.cancel).await?;

    eyre::ensure!(!updated, "update of missing row should report false");
    eyre::ensure!(!deleted, "delete of missing row should report false");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_delete_removes_one_row(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let keep = Task::new("Keep", &FixedClock(now));
    let remove = Task::new("Remove", &FixedClock(now));
    ctx.store.create(keep.clone(), true, &ctx.cancel).await?;
    ctx.store.create(remove.clone(), true, &ctx.cancel).await?;

    let deleted = ctx.store.delete_by_id(remove.id(), &ctx.cancel).await?;

    eyre::ensure!(deleted, "existing row should be deleted");
    let remaining: Vec<TaskId> = ctx
        .store
        .fetch(None, Tracking::NoTracking, &ctx.cancel)
        .await?
        .iter()
        .map(Task::id)
        .collect();
    eyre::ensure!(remaining == [keep.id()], "unexpected rows: {remaining:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_cancelled_token_skips_the_database(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let result = ctx
        .store
        .create(Task::new("Never", &FixedClock(now)), true, &cancelled)
        .await;

    eyre::ensure!(
        matches!(result, Err(TaskStoreError::Cancelled)),
        "expected cancellation, got {result:?}"
    );
    let listed = ctx
        .store
        .fetch(None, Tracking::NoTracking, &ctx.cancel)
        .await?;
    eyre::ensure!(listed.is_empty(), "cancelled create wrote a row");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_sequential_updates_keep_the_last_write(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    let created = ctx
        .store
        .create(Task::new("Original", &FixedClock(now)), true, &ctx.cancel)
        .await?;
    let clock = Arc::new(SettableClock::at(now + minutes(1)));
    let writer = PostgresTaskStore::with_clock(ctx.pool.clone(), Arc::clone(&clock));

    writer
        .update(&created.clone().with_title("First edit"), &ctx.cancel)
        .await?;
    clock.set(now + minutes(2));
    writer
        .update(
            &created.clone().with_title("Second edit").with_done(true),
            &ctx.cancel,
        )
        .await?;

    let stored = ctx
        .store
        .get_by_id(created.id(), Tracking::NoTracking, &ctx.cancel)
        .await?
        .ok_or_else(|| eyre::eyre!("row vanished"))?;
    eyre::ensure!(stored.title() == "Second edit", "got {:?}", stored.title());
    eyre::ensure!(stored.is_done(), "done flag from the first write survived");
    eyre::ensure!(
        stored.modified_time() == now + minutes(2),
        "stamp should come from the second write, got {}",
        stored.modified_time()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_cancel_during_flush_keeps_rows_and_staging_consistent(
    prepared: Result<Option<PreparedStore>, eyre::Report>,
    now: DateTime<Utc>,
) -> Result<(), eyre::Report> {
    let Some(ctx) = prepared? else {
        return Ok(());
    };
    for yields in [0_u32, 1, 2, 4, 8, 16, 64, 256] {
        let task = Task::new(format!("Flush {yields}"), &FixedClock(now));
        ctx.store.create(task.clone(), false, &ctx.cancel).await?;
        let token = CancellationToken::new();

        let (result, ()) = tokio::join!(ctx.store.save_changes(&token), async {
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
            token.cancel();
        });

        let stored = ctx
            .store
            .get_by_id(task.id(), Tracking::NoTracking, &ctx.cancel)
            .await?;
        let staged = ctx.store.staged_count()?;
        match result {
            Ok(written) => {
                eyre::ensure!(written == 1, "expected one write, got {written}");
                eyre::ensure!(stored.is_some(), "reported write is missing");
                eyre::ensure!(staged == 0, "committed task is still staged");
            }
            Err(TaskStoreError::Cancelled) => {
                eyre::ensure!(stored.is_none(), "cancelled flush committed a row");
                eyre::ensure!(staged == 1, "cancelled flush dropped the staged task");
                let retried = ctx.store.save_changes(&ctx.cancel).await?;
                eyre::ensure!(retried == 1, "retry should flush the staged task");
            }
            Err(other) => eyre::bail!("unexpected flush failure: {other}"),
        }
        eyre::ensure!(
            ctx.store.save_changes(&ctx.cancel).await? == 0,
            "nothing should remain staged after {yields} yields"
        );
    }

    let later = ctx
        .store
        .create(Task::new("After the race", &FixedClock(now)), true, &ctx.cancel)
        .await;
    eyre::ensure!(later.is_ok(), "later create failed: {later:?}");
    Ok(())
}
