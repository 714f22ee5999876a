//! Port contracts for task management.
//!
//! Ports define infrastructure-agnostic interfaces used by the task service.

pub mod store;
pub mod validator;

pub use store::{
    TaskQuery, TaskStore, TaskStoreError, TaskStoreResult, Tracking, ensure_not_cancelled,
};
pub use validator::{TaskValidator, ValidationConfig};

#[cfg(test)]
pub use validator::MockTaskValidator;
