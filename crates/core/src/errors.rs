//! Core error types for the PolicyHub services.
//!
//! This module defines storage-agnostic error types. Storage and transport
//! specific failures are converted to these types at the crate boundaries.

use thiserror::Error;

use crate::pricing::FormulaError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the domain services.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Formula evaluation failed: {0}")]
    Formula(#[from] FormulaError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Remote service call failed: {0}")]
    Remote(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            key: key.into(),
        }
    }
}

/// Errors raised while validating commands and queries.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(format!(
            "Malformed CSV: {}",
            err
        )))
    }
}
