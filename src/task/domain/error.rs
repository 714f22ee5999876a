//! Error types for task validation.

use std::fmt;
use thiserror::Error;

/// A single rule violation reported against one task field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    field: &'static str,
    message: String,
}

impl FieldViolation {
    /// Creates a violation for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Returns the name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Returns the human-readable violation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A task failed validation.
///
/// Carries every violation found, in the order the rules ran.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("task validation failed: {}", format_violations(.violations))]
pub struct TaskValidationError {
    violations: Vec<FieldViolation>,
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TaskValidationError {
    /// Wraps the collected violations.
    #[must_use]
    pub const fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Returns the violations in rule order.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns `true` when some violation concerns `field`.
    #[must_use]
    pub fn has_violation_for(&self, field: &str) -> bool {
        self.violations.iter().any(|violation| violation.field == field)
    }
}
