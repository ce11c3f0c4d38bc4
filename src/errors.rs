//! Unified error types and result handling.
//!
//! Lookup misses are deliberately NOT errors: repository lookups return
//! `Option` so callers can surface absence however they like. The variants
//! here cover the failures that must abort an operation (validation,
//! uniqueness, referential integrity) plus infrastructure failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Another business already owns this code. Surfaced distinctly from
    /// `Validation` so callers can map it to a conflict response.
    #[error("Duplicate business code: {code}")]
    DuplicateBusinessCode { code: String },

    /// An advertisement referenced a business that does not exist.
    #[error("Business not found: {id}")]
    BusinessNotFound { id: String },

    /// Delete guard: the business still owns advertisements.
    #[error("Business still has {count} advertisement(s); delete them first")]
    BusinessInUse { count: usize },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A push to the external display API failed. Logged by the scheduler,
    /// never fatal.
    #[error("Display push failed: {message}")]
    DisplayPush { message: String },
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::DisplayPush {
            message: value.to_string(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
