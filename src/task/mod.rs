//! Task management.
//!
//! Every mutation is validated as a whole before it reaches storage, and
//! listings come back in presentation order: upcoming tasks by due time,
//! then completed tasks by last modification, then overdue tasks. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Default validation rules in [`validation`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
