//! Error types surfaced by the domain services.
//!
//! Persistence failures are deliberately absent: the record service logs and
//! swallows them, so callers only ever see problems with their own input or
//! with explicit file operations (export/import).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("reservation {0} not found")]
    ReservationNotFound(u64),

    #[error("invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),

    #[error("import failed: {0}")]
    Import(String),

    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
