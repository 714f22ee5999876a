//! Validator port for task mutations.

use crate::task::domain::{Task, TaskValidationError};

/// Pluggable rule set applied to a whole task before any write.
///
/// Implementations must be stateless and free of side effects, and should
/// report every violation they find rather than stopping at the first.
#[cfg_attr(test, mockall::automock)]
pub trait TaskValidator: Send + Sync {
    /// Validates a task against all rules.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] listing each violated rule.
    fn validate(&self, task: &Task) -> Result<(), TaskValidationError>;
}

/// Configuration for the default task rules.
///
/// # Examples
///
/// ```
/// use tasklist::task::ports::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert_eq!(config.max_title_length, 255);
/// assert!(!config.allow_reminder_after_due);
///
/// let lenient = ValidationConfig::lenient();
/// assert!(lenient.allow_reminder_after_due);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum title length in characters.
    pub max_title_length: usize,
    /// Whether a reminder may fire after the due time.
    pub allow_reminder_after_due: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_title_length: 255,
            allow_reminder_after_due: false,
        }
    }
}

impl ValidationConfig {
    /// Creates a configuration that tolerates reminders after the due time.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            allow_reminder_after_due: true,
            ..Default::default()
        }
    }

    /// Creates a configuration with a short title limit.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_title_length: 80,
            allow_reminder_after_due: false,
        }
    }
}
