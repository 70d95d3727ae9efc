//! Error types for Redis backend operations.
//!
//! All errors can be converted to [`BackendError`] for uniform error handling
//! across different cache backends.
//!
//! [`BackendError`]: cellar_backend::BackendError

use cellar_backend::BackendError;
use redis::RedisError;

/// Error type for Redis backend operations.
///
/// # When You'll Encounter This
///
/// - Using [`RedisBackendBuilder::build`] with an invalid connection URL or
///   an unreachable server
/// - Performing cache operations when the Redis server returns an error
///
/// During cache operations this error is converted to
/// [`BackendError::ConnectionError`].
///
/// [`RedisBackendBuilder::build`]: crate::RedisBackendBuilder::build
/// [`BackendError::ConnectionError`]: cellar_backend::BackendError::ConnectionError
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    ///
    /// This includes connection failures, protocol errors, authentication
    /// failures, and command execution errors.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),

    /// Namespace was not specified when building the backend.
    ///
    /// Call [`RedisBackendBuilder::namespace`] before [`RedisBackendBuilder::build`].
    ///
    /// [`RedisBackendBuilder::namespace`]: crate::RedisBackendBuilder::namespace
    /// [`RedisBackendBuilder::build`]: crate::RedisBackendBuilder::build
    #[error("Namespace not specified. Call .namespace() before .build()")]
    MissingNamespace,
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        Self::ConnectionError(Box::new(error))
    }
}
