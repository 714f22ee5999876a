//! Translation of [`TaskFilter`] trees into Diesel `WHERE` clauses.

use super::schema::todos;
use crate::task::domain::TaskFilter;
use diesel::dsl::not;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;

/// A boxed boolean condition over the `todos` table.
pub(super) type BoxedCondition = Box<dyn BoxableExpression<todos::table, Pg, SqlType = Bool>>;

/// Builds a condition with the same meaning as [`TaskFilter::matches`].
///
/// Due-time comparisons are guarded by explicit null checks so that SQL
/// three-valued logic never leaks through `NOT`.
pub(super) fn to_condition(filter: &TaskFilter) -> BoxedCondition {
    match filter {
        TaskFilter::IsDone(expected) => Box::new(todos::is_done.eq(*expected)),
        TaskFilter::IsFavorite(expected) => Box::new(todos::is_favorite.eq(*expected)),
        TaskFilter::TitleContains(needle) => Box::new(todos::title.like(like_pattern(needle))),
        TaskFilter::HasDueTime(true) => Box::new(todos::due_time.is_not_null()),
        TaskFilter::HasDueTime(false) => Box::new(todos::due_time.is_null()),
        TaskFilter::DueAfter(instant) => Box::new(
            todos::due_time
                .is_not_null()
                .and(todos::due_time.gt(*instant).assume_not_null()),
        ),
        TaskFilter::DueAtOrBefore(instant) => Box::new(
            todos::due_time
                .is_null()
                .or(todos::due_time.le(*instant).assume_not_null()),
        ),
        TaskFilter::ModifiedAfter(instant) => Box::new(todos::modified_time.gt(*instant)),
        TaskFilter::All(conditions) => conditions.iter().fold(
            Box::new(true.into_sql::<Bool>()) as BoxedCondition,
            |acc, condition| Box::new(acc.and(to_condition(condition))),
        ),
        TaskFilter::Any(conditions) => conditions.iter().fold(
            Box::new(false.into_sql::<Bool>()) as BoxedCondition,
            |acc, condition| Box::new(acc.or(to_condition(condition))),
        ),
        TaskFilter::Not(inner) => Box::new(not(to_condition(inner))),
    }
}

/// Escapes `needle` for a `LIKE` substring match using the default `\`
/// escape character.
///
/// # Examples
///
/// ```
/// use tasklist::task::adapters::postgres::like_pattern;
///
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
#[must_use]
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
