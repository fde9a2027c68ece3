//! File-backed storage: one JSON document per key inside the data directory.

pub mod connection;
pub mod key_value_repository;

pub use connection::{JsonConnection, DATA_DIR_ENV};
pub use key_value_repository::JsonKeyValueRepository;
