//! Backend sections of the configuration.

use bytesize::ByteSize;
use serde::{Deserialize, Serialize};

/// Which store backs the cache, tagged by `type`.
///
/// ```yaml
/// type: Redis
/// server: "redis://127.0.0.1:6379/0"
/// password: "secret"
/// ```
///
/// ```yaml
/// type: FeOxDb
/// path: "/var/cache/myapp"
/// max_file_size: "2 GiB"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Backend {
    /// Remote key-value server.
    Redis(Redis),
    /// Embedded on-disk store.
    FeOxDb(FeOxDb),
}

impl Backend {
    /// Name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Redis(_) => "Redis",
            Backend::FeOxDb(_) => "FeOxDb",
        }
    }
}

/// Remote backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    /// Connection URL, e.g. `redis://host:6379/0`.
    pub server: String,
    /// Password overriding the one in the URL; empty or absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// `COUNT` hint for each `SCAN` page during pattern eviction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_count: Option<usize>,
    /// Keys removed by one `DEL` during pattern eviction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_batch_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Embedded backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct FeOxDb {
    /// Database directory or file. Memory-only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<ByteSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<ByteSize>,
    /// Keys deleted per batch during pattern eviction and reclamation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eviction_batch_size: Option<usize>,
    /// Entries read per ordered range page during pattern eviction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(feature = "redis")]
impl Redis {
    pub(crate) async fn into_backend(
        self,
        namespace: cellar_backend::Namespace,
        format: cellar_backend::ValueFormat,
    ) -> Result<cellar_redis::RedisBackend, crate::ConfigError> {
        let mut builder = cellar_redis::RedisBackend::builder()
            .server(self.server)
            .namespace(namespace)
            .value_format(format);
        if let Some(password) = self.password {
            builder = builder.password(password);
        }
        if let Some(count) = self.scan_count {
            builder = builder.scan_count(count);
        }
        if let Some(size) = self.delete_batch_size {
            builder = builder.delete_batch_size(size);
        }
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        Ok(builder.build().await?)
    }
}

#[cfg(feature = "feoxdb")]
impl FeOxDb {
    pub(crate) fn into_backend(
        self,
        namespace: cellar_backend::Namespace,
        format: cellar_backend::ValueFormat,
    ) -> Result<cellar_feoxdb::FeOxDbBackend, crate::ConfigError> {
        let mut builder = cellar_feoxdb::FeOxDbBackend::builder()
            .namespace(namespace)
            .value_format(format);
        if let Some(path) = self.path {
            builder = builder.path(path);
        }
        if let Some(size) = self.max_file_size {
            builder = builder.max_file_size(size.as_u64());
        }
        if let Some(size) = self.max_memory {
            let bytes =
                usize::try_from(size.as_u64()).map_err(|e| crate::ConfigError::InvalidValue {
                    field: "max_memory",
                    reason: e.to_string(),
                })?;
            builder = builder.max_memory(bytes);
        }
        if let Some(size) = self.eviction_batch_size {
            builder = builder.eviction_batch_size(size);
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        Ok(builder.build()?)
    }
}
