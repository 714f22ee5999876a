//! Composable boolean conditions over task fields.

use super::Task;
use chrono::{DateTime, Utc};

/// A predicate over tasks that adapters can evaluate in memory or translate
/// into their own query language.
///
/// Time comparisons treat an unset due time the way the listing order does:
/// it is never after an instant and always at-or-before one.
///
/// # Examples
///
/// ```
/// use tasklist::task::domain::TaskFilter;
///
/// let open_pinned = TaskFilter::IsDone(false).and(TaskFilter::IsFavorite(true));
/// let either = open_pinned.or(TaskFilter::title_contains("urgent"));
/// assert!(matches!(either, TaskFilter::Any(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// Matches on the completion flag.
    IsDone(bool),
    /// Matches on the pin flag.
    IsFavorite(bool),
    /// Case-sensitive substring match on the title.
    TitleContains(String),
    /// Matches tasks that have (`true`) or lack (`false`) a due time.
    HasDueTime(bool),
    /// Due time is set and strictly after the instant.
    DueAfter(DateTime<Utc>),
    /// Due time is unset or at-or-before the instant.
    DueAtOrBefore(DateTime<Utc>),
    /// Last write strictly after the instant.
    ModifiedAfter(DateTime<Utc>),
    /// Every nested condition holds. Empty matches everything.
    All(Vec<Self>),
    /// At least one nested condition holds. Empty matches nothing.
    Any(Vec<Self>),
    /// The nested condition does not hold.
    Not(Box<Self>),
}

impl TaskFilter {
    /// Builds a title substring condition.
    #[must_use]
    pub fn title_contains(needle: impl Into<String>) -> Self {
        Self::TitleContains(needle.into())
    }

    /// Conjunction, flattening nested `All` nodes on the left.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Disjunction, flattening nested `Any` nodes on the left.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the condition against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::IsDone(expected) => task.is_done() == *expected,
            Self::IsFavorite(expected) => task.is_favorite() == *expected,
            Self::TitleContains(needle) => task.title().contains(needle.as_str()),
            Self::HasDueTime(expected) => task.due_time().is_some() == *expected,
            Self::DueAfter(instant) => task.due_time().is_some_and(|due| due > *instant),
            Self::DueAtOrBefore(instant) => task.due_time().is_none_or(|due| due <= *instant),
            Self::ModifiedAfter(instant) => task.modified_time() > *instant,
            Self::All(conditions) => conditions.iter().all(|condition| condition.matches(task)),
            Self::Any(conditions) => conditions.iter().any(|condition| condition.matches(task)),
            Self::Not(inner) => !inner.matches(task),
        }
    }
}
