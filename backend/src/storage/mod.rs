//! # Storage Module
//!
//! Handles persistence of the record store into a durable key-value slot.
//!
//! The domain layer only sees the [`KeyValueStorage`] trait; the concrete slot
//! is either a directory of JSON files ([`json`]) or an in-memory map
//! ([`memory`]) used by tests and throwaway sessions.

pub mod json;
pub mod memory;
pub mod traits;

pub use json::{JsonConnection, JsonKeyValueRepository};
pub use memory::InMemoryKeyValueRepository;
pub use traits::{KeyValueStorage, DARK_MODE_KEY, EXPENSES_KEY, RESERVATIONS_KEY};
