//! Top-level cache configuration.

use std::path::Path;
use std::time::Duration;

use cellar_backend::{Namespace, ValueFormat};
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::cache::Cache;
use crate::error::ConfigError;

/// Reclamation runs once a day unless configured otherwise.
pub const DEFAULT_RECLAIM_INTERVAL_SECS: u64 = 86_400;

fn default_reclaim_interval() -> u64 {
    DEFAULT_RECLAIM_INTERVAL_SECS
}

/// Everything needed to open a cache.
///
/// ```yaml
/// namespace: myapp
/// value_format: json
/// reclaim_interval_secs: 3600
/// backend:
///   type: FeOxDb
///   path: /var/cache/myapp
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix partitioning the store; usually the application name.
    pub namespace: Namespace,
    /// Encoding of new entries.
    #[serde(default)]
    pub value_format: ValueFormat,
    pub backend: Backend,
    /// Seconds between reclamation runs of the embedded backend; `0`
    /// disables them.
    #[serde(default = "default_reclaim_interval")]
    pub reclaim_interval_secs: u64,
}

impl CacheConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Reclamation period, if enabled.
    pub fn reclaim_interval(&self) -> Option<Duration> {
        (self.reclaim_interval_secs > 0).then(|| Duration::from_secs(self.reclaim_interval_secs))
    }

    /// Opens the configured backend and starts its background tasks.
    ///
    /// Must be called within a tokio runtime.
    pub async fn into_cache(self) -> Result<Cache, ConfigError> {
        let interval = self.reclaim_interval();
        match self.backend {
            #[cfg(feature = "redis")]
            Backend::Redis(config) => {
                let backend = config
                    .into_backend(self.namespace, self.value_format)
                    .await?;
                Ok(Cache::new(std::sync::Arc::new(backend)))
            }
            #[cfg(feature = "feoxdb")]
            Backend::FeOxDb(config) => {
                use cellar_backend::Backend as _;

                let backend = config.into_backend(self.namespace, self.value_format)?;
                let shared = std::sync::Arc::new(backend.clone());
                let Some(period) = interval else {
                    return Ok(Cache::new(shared));
                };
                let label = backend.label();
                let reclaimer = crate::scheduler::spawn_reclaimer(label, period, move || {
                    let backend = backend.clone();
                    async move { backend.reclaim().await }
                });
                Ok(Cache::with_reclaimer(shared, reclaimer))
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::BackendNotAvailable(other.kind().to_string())),
        }
    }
}
