//! Tasklist: validated task records with a presentation-ordered listing.
//!
//! # Architecture
//!
//! Tasklist follows hexagonal architecture principles:
//!
//! - **Domain**: the task aggregate, filters and listing order
//! - **Ports**: store and validator traits
//! - **Adapters**: in-memory and `PostgreSQL` stores
//! - **Services**: validation-gated mutations and ordered reads
//!
//! # Modules
//!
//! - [`task`]: task records, storage and the listing service

pub mod task;
