//! Default task validation rules.
//!
//! - [`rules`]: one pure function per rule
//! - [`service`]: the [`DefaultTaskValidator`] combining them

pub mod rules;
pub mod service;

pub use service::DefaultTaskValidator;
