//! Validation service implementation.

use crate::task::{
    domain::{Task, TaskValidationError},
    ports::{TaskValidator, ValidationConfig},
    validation::rules,
};

/// Default implementation of the task validator.
///
/// Runs every rule and reports all violations together.
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use tasklist::task::domain::Task;
/// use tasklist::task::ports::TaskValidator;
/// use tasklist::task::validation::DefaultTaskValidator;
///
/// let validator = DefaultTaskValidator::new();
/// assert!(validator.validate(&Task::new("Water the plants", &DefaultClock)).is_ok());
/// assert!(validator.validate(&Task::new("   ", &DefaultClock)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultTaskValidator {
    config: ValidationConfig,
}

impl DefaultTaskValidator {
    /// Creates a validator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator with a custom configuration.
    #[must_use]
    pub const fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl TaskValidator for DefaultTaskValidator {
    fn validate(&self, task: &Task) -> Result<(), TaskValidationError> {
        let checks = [
            rules::validate_title_present(task),
            rules::validate_title_length(task, &self.config),
            rules::validate_reminder_before_due(task, &self.config),
        ];
        let violations: Vec<_> = checks.into_iter().filter_map(Result::err).collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(TaskValidationError::new(violations))
        }
    }
}
