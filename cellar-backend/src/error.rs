//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// Every backend maps its native failures into one of these groups, so
/// callers can react to a category without knowing which store is behind the
/// cache.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The key is absent or its entry has expired.
    ///
    /// This is the normal cache-miss signal, not a fault.
    #[error("cache key not found: {0}")]
    NotFound(String),

    /// The value could not be serialized.
    #[error("failed to encode cache entry: {0}")]
    EncodeError(#[source] FormatError),

    /// The stored payload could not be read back.
    ///
    /// Either the bytes are corrupted or they were written by an
    /// incompatible codec version.
    #[error("failed to decode cache entry: {0}")]
    DecodeError(#[source] FormatError),

    /// Network interaction error.
    ///
    /// Dial failures, protocol errors and server-side command errors of
    /// remote backends (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Local storage error.
    ///
    /// I/O or transaction failures of embedded backends.
    #[error(transparent)]
    StorageError(Box<dyn std::error::Error + Send + Sync>),

    /// The backend was already closed.
    ///
    /// Calling cache operations after shutdown is a programming error.
    #[error("cache backend is closed")]
    Closed,
}

impl BackendError {
    /// Returns `true` for a cache miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

/// Status of deleting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
