//! Storage-specific error types.
//!
//! These errors are internal to the storage layer and are converted to
//! `policyhub_core::Error` before being returned to callers.

use policyhub_core::errors::Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Lock on {0} table poisoned")]
    LockPoisoned(&'static str),

    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} '{key}' does not exist")]
    Missing { entity: &'static str, key: String },

    #[error("{entity} '{key}' was changed by another request")]
    Conflict { entity: &'static str, key: String },
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate { entity, key } => {
                Error::ConstraintViolation(format!("{} '{}' already exists", entity, key))
            }
            StorageError::Missing { entity, key } => Error::NotFound { entity, key },
            StorageError::Conflict { entity, key } => Error::ConstraintViolation(format!(
                "{} '{}' was changed by another request",
                entity, key
            )),
            other => Error::Repository(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_map_to_not_found() {
        let err: Error = StorageError::Missing {
            entity: "Offer",
            key: "42".to_string(),
        }
        .into();
        assert!(matches!(err, Error::NotFound { entity: "Offer", .. }));
    }

    #[test]
    fn poisoned_lock_maps_to_repository_error() {
        let err: Error = StorageError::LockPoisoned("policies").into();
        assert!(matches!(err, Error::Repository(_)));
    }
}
