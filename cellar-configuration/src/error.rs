use thiserror::Error;

/// Errors raised while loading a configuration or opening its backend.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document does not describe a valid configuration.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A field holds a value the backend cannot use.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The configured backend was compiled out.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    /// The Redis backend could not be opened.
    #[cfg(feature = "redis")]
    #[error(transparent)]
    Redis(#[from] cellar_redis::Error),

    /// The FeOxDB backend could not be opened.
    #[cfg(feature = "feoxdb")]
    #[error(transparent)]
    FeOxDb(#[from] cellar_feoxdb::FeOxDbError),
}
