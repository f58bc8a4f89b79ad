use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or answered unexpectedly.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The record changed since it was loaded; the write was rejected.
    #[error("concurrent modification of `{id}`")]
    Conflict { id: String },
    /// A record with the same unique key is already stored.
    #[error("`{key}` already exists")]
    Duplicate { key: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a conflict error for the record identified by `id`.
    pub fn conflict(id: impl ToString) -> Self {
        StorageError::Conflict { id: id.to_string() }
    }
}
