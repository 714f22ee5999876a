//! `PostgreSQL` adapters for task persistence.

mod config;
mod filter;
mod models;
mod schema;
mod store;

pub use config::{PostgresStoreConfig, StoreConfigError};
pub use filter::like_pattern;
pub use store::{PostgresTaskStore, TaskPgPool};
