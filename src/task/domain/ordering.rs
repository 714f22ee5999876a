//! Presentation order for task listings.
//!
//! Listings show what is coming up first, then what was recently finished,
//! then what slipped past its due time. The partition depends on a single
//! instant, so callers sample the clock once and pass it in.

use super::Task;
use chrono::{DateTime, Utc};

/// The listing partition a task belongs to at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingBucket {
    /// Open and due strictly after the instant.
    Upcoming,
    /// Completed, whatever the due time.
    Done,
    /// Open and due at or before the instant, or without a due time.
    Overdue,
}

impl ListingBucket {
    /// Classifies `task` relative to `now`.
    ///
    /// A task due exactly at `now` is overdue. An open task with no due
    /// time is overdue as well.
    #[must_use]
    pub fn of(task: &Task, now: DateTime<Utc>) -> Self {
        if task.is_done() {
            return Self::Done;
        }
        match task.due_time() {
            Some(due) if due > now => Self::Upcoming,
            _ => Self::Overdue,
        }
    }
}

/// Orders tasks for presentation.
///
/// Upcoming tasks come first, soonest due first. Done tasks follow, most
/// recently modified first. Overdue tasks close the list, most recently due
/// first, with undated tasks last. Sorting is stable, so ties keep the input
/// order. Every input task appears exactly once in the output.
#[must_use]
pub fn order_for_listing(tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<Task> {
    let mut upcoming = Vec::new();
    let mut done = Vec::new();
    let mut overdue = Vec::new();

    for task in tasks {
        match ListingBucket::of(&task, now) {
            ListingBucket::Upcoming => upcoming.push(task),
            ListingBucket::Done => done.push(task),
            ListingBucket::Overdue => overdue.push(task),
        }
    }

    upcoming.sort_by_key(Task::due_time);
    done.sort_by(|left, right| right.modified_time().cmp(&left.modified_time()));
    // `None` orders below every `Some`, so undated tasks sink to the end.
    overdue.sort_by(|left, right| right.due_time().cmp(&left.due_time()));

    upcoming.into_iter().chain(done).chain(overdue).collect()
}
