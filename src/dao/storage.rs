use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failing operation.
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend returned data that no longer decodes into the expected model.
    #[error("corrupt stored value at `{path}`")]
    Corrupt {
        /// Store path or document id of the offending entry.
        path: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a corrupt-value error for a store path.
    pub fn corrupt(path: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Corrupt {
            path,
            source: Box::new(source),
        }
    }
}
