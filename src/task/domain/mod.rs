//! Domain model for task management.
//!
//! Holds the task aggregate, the validation error shape, the filter
//! vocabulary shared by every store adapter, and the listing order. Nothing
//! here touches storage.

mod error;
mod filter;
mod ids;
mod ordering;
mod task;

pub use error::{FieldViolation, TaskValidationError};
pub use filter::TaskFilter;
pub use ids::TaskId;
pub use ordering::{ListingBucket, order_for_listing};
pub use task::{PersistedTaskData, Task};
