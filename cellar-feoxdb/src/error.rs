use cellar_backend::BackendError;
use feoxdb::FeoxError;
use thiserror::Error;

/// Errors that can occur when using [`FeOxDbBackend`](crate::FeOxDbBackend).
#[derive(Debug, Error)]
pub enum FeOxDbError {
    /// An error from the underlying FeOxDB database.
    #[error("FeOxDB error: {0}")]
    FeOxDb(#[from] FeoxError),

    /// An I/O error occurred while accessing the database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Namespace was not specified when building the backend.
    #[error("Namespace not specified. Call .namespace() before .build()")]
    MissingNamespace,
}

impl From<FeOxDbError> for BackendError {
    fn from(error: FeOxDbError) -> Self {
        Self::StorageError(Box::new(error))
    }
}
