//! # Storage Traits
//!
//! The record service persists into a durable key-value slot: a handful of
//! string keys, each holding a JSON document. This trait hides whether that
//! slot lives in files on disk or in memory.

use anyhow::Result;

/// Key under which the reservation list is stored
pub const RESERVATIONS_KEY: &str = "reservations";
/// Key under which the expense list is stored
pub const EXPENSES_KEY: &str = "expenses";
/// Key under which the dark-mode preference is stored
pub const DARK_MODE_KEY: &str = "darkMode";

/// Trait defining the interface for key-value storage operations
pub trait KeyValueStorage: Send + Sync {
    /// Read the raw value stored under `key`, `None` if never written
    fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn put_value(&self, key: &str, value: &str) -> Result<()>;
}
