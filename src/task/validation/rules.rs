//! Individual validation rule implementations.
//!
//! Each rule inspects one aspect of a task and returns `Ok(())` or the
//! violation it found.

use crate::task::{
    domain::{FieldViolation, Task},
    ports::ValidationConfig,
};

/// Field name reported for title violations.
pub const TITLE_FIELD: &str = "title";

/// Field name reported for reminder violations.
pub const REMINDER_TIME_FIELD: &str = "reminder_time";

/// Validates that the title contains something other than whitespace.
///
/// # Errors
///
/// Returns a `title` violation when the title is empty or blank.
pub fn validate_title_present(task: &Task) -> Result<(), FieldViolation> {
    if task.title().trim().is_empty() {
        return Err(FieldViolation::new(TITLE_FIELD, "must not be empty"));
    }
    Ok(())
}

/// Validates that the title fits the configured length.
///
/// # Errors
///
/// Returns a `title` violation when the title has more characters than
/// `config.max_title_length`.
pub fn validate_title_length(task: &Task, config: &ValidationConfig) -> Result<(), FieldViolation> {
    let length = task.title().chars().count();
    if length > config.max_title_length {
        return Err(FieldViolation::new(
            TITLE_FIELD,
            format!(
                "must be at most {} characters, found {length}",
                config.max_title_length
            ),
        ));
    }
    Ok(())
}

/// Validates that the reminder does not fire after the task is due.
///
/// Passes when either time is unset or the configuration allows it.
///
/// # Errors
///
/// Returns a `reminder_time` violation when the reminder is later than the
/// due time.
pub fn validate_reminder_before_due(
    task: &Task,
    config: &ValidationConfig,
) -> Result<(), FieldViolation> {
    if config.allow_reminder_after_due {
        return Ok(());
    }
    match (task.reminder_time(), task.due_time()) {
        (Some(reminder), Some(due)) if reminder > due => Err(FieldViolation::new(
            REMINDER_TIME_FIELD,
            "must not be later than the due time",
        )),
        _ => Ok(()),
    }
}
