use std::error::Error;
use thiserror::Error;

/// Result alias for snapshot storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by snapshot stores regardless of the backing medium.
///
/// Corrupted payloads are deliberately not an error: the store logs them and
/// reports absence, so only genuine unavailability (unwritable directory,
/// quota, I/O failure) surfaces here.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot storage unavailable: {message}")]
    Unavailable {
        message: String,
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
}
