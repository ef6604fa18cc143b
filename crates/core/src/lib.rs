//! Business rules for the todo backend.
//!
//! Holds the domain types, field validation, the persistence gateway
//! contract ([`store::Store`] / [`store::Gateway`]) and the two rule engines
//! built on top of it. Nothing here talks to a database directly; the
//! PostgreSQL gateway lives in `todo-db` and an in-memory one in [`memory`].

pub mod category;
pub mod error;
pub mod memory;
pub mod services;
pub mod store;
pub mod task;
pub mod types;
pub mod validation;
