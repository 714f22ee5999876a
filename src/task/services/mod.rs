//! Application services for task management.

mod task_service;

pub use task_service::{TaskOperation, TaskService, TaskServiceError, TaskServiceResult};
