use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use cellar_backend::{
    Backend, BackendError, BackendLabel, BackendResult, CacheBackend, DEFAULT_EVICTION_BATCH_SIZE,
    DeleteBatch, DeleteStatus, EntryHeader, Namespace, StorageKey, ValueFormat, ttl_secs,
};
use feoxdb::{FeoxError, FeoxStore};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::FeOxDbError;

/// Number of entries fetched by one ordered range read during eviction.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;

/// Disk-based cache backend using FeOxDB.
///
/// Use this when cache data must survive restarts or when no cache server is
/// available. For a cache shared between processes, prefer `RedisBackend`.
///
/// ```no_run
/// use cellar_feoxdb::FeOxDbBackend;
///
/// // Persistent cache with defaults
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/myapp")
///     .namespace("myapp")
///     .build()?;
///
/// // With resource limits
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/myapp")
///     .namespace("myapp")
///     .max_file_size(10 * 1024 * 1024 * 1024)  // 10 GB
///     .max_memory(256 * 1024 * 1024)           // 256 MB
///     .build()?;
/// # Ok::<(), cellar_feoxdb::FeOxDbError>(())
/// ```
///
/// Entries expire twice over: the store drops them after their per-key TTL
/// and reads reject any payload whose expiry header has passed. Call
/// [`reclaim`](Self::reclaim) periodically to sweep expired entries and
/// compact the file.
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct FeOxDbBackend {
    store: Arc<RwLock<Option<Arc<FeoxStore>>>>,
    namespace: Namespace,
    format: ValueFormat,
    eviction_batch_size: usize,
    page_size: usize,
    label: BackendLabel,
}

impl FeOxDbBackend {
    /// Starts building a new backend.
    pub fn builder() -> FeOxDbBackendBuilder {
        FeOxDbBackendBuilder::default()
    }

    /// In-memory backend for tests.
    ///
    /// Data is lost when dropped.
    ///
    /// ```
    /// use cellar_feoxdb::FeOxDbBackend;
    ///
    /// let backend = FeOxDbBackend::in_memory("test")
    ///     .expect("Failed to create in-memory backend");
    /// ```
    pub fn in_memory(namespace: impl Into<Namespace>) -> Result<Self, FeOxDbError> {
        Self::builder().namespace(namespace).build()
    }

    /// Returns a backend over the same store bound to another namespace.
    ///
    /// Both share one store handle, so closing either closes both.
    pub fn with_namespace(&self, namespace: impl Into<Namespace>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self.clone()
        }
    }

    /// Forces pending writes to disk.
    ///
    /// FeOxDB buffers writes in memory and flushes them periodically.
    /// No-op in memory-only mode.
    pub async fn flush(&self) -> BackendResult<()> {
        self.blocking(|store| Ok(store.flush()?)).await
    }

    /// Removes expired entries of this namespace and flushes the store.
    ///
    /// Returns how many entries were reclaimed. Safe to call at any time and
    /// any number of times; live entries are never touched.
    pub async fn reclaim(&self) -> BackendResult<u64> {
        let prefix = self.namespace.pattern("").into_bytes();
        let (page_size, batch_size) = (self.page_size, self.eviction_batch_size);
        let reclaimed = self
            .blocking(move |store| {
                let reclaimed = sweep(store, &prefix, page_size, batch_size, |payload| {
                    EntryHeader::parse(payload).is_ok_and(|header| header.is_expired())
                })?;
                store.flush()?;
                Ok(reclaimed)
            })
            .await?;
        debug!(namespace = %self.namespace, reclaimed, "Reclaimed expired entries");
        Ok(reclaimed)
    }

    async fn store(&self) -> BackendResult<Arc<FeoxStore>> {
        self.store.read().await.clone().ok_or(BackendError::Closed)
    }

    /// Runs `f` against the store on the blocking thread pool.
    async fn blocking<R, F>(&self, f: F) -> BackendResult<R>
    where
        F: FnOnce(&FeoxStore) -> Result<R, FeOxDbError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.store().await?;
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(FeOxDbError::from)?
            .map_err(BackendError::from)
    }
}

/// Smallest key ordered after every key starting with `prefix`.
///
/// Storage keys are UTF-8, so no key byte is ever `0xFF`.
fn range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = Vec::with_capacity(prefix.len() + 1);
    end.extend_from_slice(prefix);
    end.push(0xFF);
    end
}

/// Smallest key ordered strictly after `key`.
fn successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0x00);
    next
}

/// Walks every key starting with `prefix` in bounded range pages and deletes
/// the ones whose payload `select` accepts, one [`DeleteBatch`] at a time.
fn sweep<F>(
    store: &FeoxStore,
    prefix: &[u8],
    page_size: usize,
    batch_size: usize,
    mut select: F,
) -> Result<u64, FeOxDbError>
where
    F: FnMut(&[u8]) -> bool,
{
    let end = range_end(prefix);
    let mut start = prefix.to_vec();
    let mut batch = DeleteBatch::new(batch_size);
    let mut removed = 0;

    loop {
        let page = store.range_query(&start, &end, page_size)?;
        let exhausted = page.len() < page_size;
        let Some(next) = page.last().map(|(key, _)| successor(key)) else {
            break;
        };
        trace!(page = page.len(), "Range page");

        for (key, value) in &page {
            if !key.starts_with(prefix) || !select(value) {
                continue;
            }
            if let Some(full) = batch.push(key.to_vec()) {
                removed += delete_keys(store, &full)?;
            }
        }

        if exhausted {
            break;
        }
        start = next;
    }

    if let Some(rest) = batch.finish() {
        removed += delete_keys(store, &rest)?;
    }
    Ok(removed)
}

/// Deletes one batch. The first failure aborts the batch; keys deleted
/// before it stay deleted.
fn delete_keys(store: &FeoxStore, keys: &[Vec<u8>]) -> Result<u64, FeOxDbError> {
    let mut deleted = 0;
    for key in keys {
        match store.delete(key) {
            Ok(_) => deleted += 1,
            Err(FeoxError::KeyNotFound | FeoxError::OlderTimestamp) => {}
            Err(err) => return Err(err.into()),
        }
    }
    debug!(requested = keys.len(), deleted, "Deleted batch of feoxdb keys");
    Ok(deleted)
}

/// Builder for [`FeOxDbBackend`].
///
/// ```no_run
/// use cellar_backend::ValueFormat;
/// use cellar_feoxdb::FeOxDbBackend;
///
/// let backend = FeOxDbBackend::builder()
///     .path("/var/cache/myapp")
///     .namespace("myapp")
///     .max_file_size(5 * 1024 * 1024 * 1024)  // 5 GB
///     .value_format(ValueFormat::Bincode)
///     .eviction_batch_size(10_000)
///     .build()?;
/// # Ok::<(), cellar_feoxdb::FeOxDbError>(())
/// ```
pub struct FeOxDbBackendBuilder {
    path: Option<PathBuf>,
    max_file_size: Option<u64>,
    max_memory: Option<usize>,
    namespace: Option<Namespace>,
    format: ValueFormat,
    eviction_batch_size: usize,
    page_size: usize,
    label: BackendLabel,
}

impl Default for FeOxDbBackendBuilder {
    fn default() -> Self {
        Self {
            path: None,
            max_file_size: None,
            max_memory: None,
            namespace: None,
            format: ValueFormat::default(),
            eviction_batch_size: DEFAULT_EVICTION_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            label: BackendLabel::new_static("feoxdb"),
        }
    }
}

impl FeOxDbBackendBuilder {
    /// Enables persistent storage at the given path.
    ///
    /// Without this, data lives only in memory and is lost on restart.
    /// If path is a directory, creates `cache.db` inside it.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Pre-allocates disk space and caps maximum storage.
    ///
    /// Writes fail once the file is full. Ignored in memory-only mode.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Limits RAM usage.
    ///
    /// In memory-only mode, this is the total cache capacity. FeOxDB has no
    /// automatic eviction: writes fail when the limit is reached.
    pub fn max_memory(mut self, bytes: usize) -> Self {
        self.max_memory = Some(bytes);
        self
    }

    /// Namespace every key of this backend is prefixed with.
    pub fn namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Value serialization format for new entries.
    pub fn value_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Number of keys deleted per batch during pattern eviction.
    pub fn eviction_batch_size(mut self, size: usize) -> Self {
        self.eviction_batch_size = size;
        self
    }

    /// Number of entries read per range page during pattern eviction.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Identifies this backend in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Creates the backend.
    ///
    /// Fails if the database file can't be opened or created.
    pub fn build(self) -> Result<FeOxDbBackend, FeOxDbError> {
        let namespace = self.namespace.ok_or(FeOxDbError::MissingNamespace)?;
        let mut builder = FeoxStore::builder().enable_ttl(true);

        if let Some(mut path) = self.path {
            if path.is_dir() {
                path.push("cache.db");
            } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let path_str = path.to_string_lossy().to_string();
            builder = builder.device_path(path_str);
        }

        if let Some(file_size) = self.max_file_size {
            builder = builder.file_size(file_size);
        }

        if let Some(memory) = self.max_memory {
            builder = builder.max_memory(memory);
        }

        let store = builder.build()?;
        debug!(%namespace, label = %self.label, "FeOxDB store opened");

        Ok(FeOxDbBackend {
            store: Arc::new(RwLock::new(Some(Arc::new(store)))),
            namespace,
            format: self.format,
            eviction_batch_size: self.eviction_batch_size,
            page_size: self.page_size,
            label: self.label,
        })
    }
}

#[async_trait]
impl Backend for FeOxDbBackend {
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool> {
        let key = key.as_bytes().to_vec();
        self.blocking(move |store| match store.get_ttl(&key) {
            Ok(None) => Ok(true),
            Ok(Some(secs)) if secs > 0 => Ok(true),
            // Under a second left, or already gone: only the header knows.
            Ok(Some(_)) => match store.get(&key) {
                Ok(payload) => Ok(EntryHeader::parse(&payload).map_or(true, |h| !h.is_expired())),
                Err(FeoxError::KeyNotFound) => Ok(false),
                Err(err) => Err(err.into()),
            },
            Err(FeoxError::KeyNotFound) => Ok(false),
            Err(err) => Err(err.into()),
        })
        .await
    }

    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>> {
        trace!(%key, "FeOxDB read");
        let key = key.as_bytes().to_vec();
        self.blocking(move |store| match store.get(&key) {
            Ok(payload) => Ok(Some(Bytes::from(payload))),
            Err(FeoxError::KeyNotFound) => Ok(None),
            Err(err) => Err(err.into()),
        })
        .await
    }

    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        trace!(%key, ?ttl, "FeOxDB write");
        let key = key.as_bytes().to_vec();
        self.blocking(move |store| {
            let result = match ttl.map(ttl_secs) {
                Some(0) => store.delete(&key),
                Some(secs) => store.insert_with_ttl(&key, &payload, secs).map(|_| ()),
                None => store.insert(&key, &payload).map(|_| ()),
            };
            match result {
                Ok(()) | Err(FeoxError::KeyNotFound) => Ok(()),
                // A concurrent write stamped later already holds the key.
                Err(FeoxError::OlderTimestamp) => {
                    trace!("FeOxDB write superseded by a newer one");
                    Ok(())
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus> {
        let key = key.as_bytes().to_vec();
        self.blocking(move |store| match store.delete(&key) {
            Ok(()) => Ok(DeleteStatus::Deleted(1)),
            // Gone already, or replaced by a write stamped after this delete.
            Err(FeoxError::KeyNotFound | FeoxError::OlderTimestamp) => Ok(DeleteStatus::Missing),
            Err(err) => Err(err.into()),
        })
        .await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64> {
        let prefix_bytes = prefix.as_bytes().to_vec();
        let (page_size, batch_size) = (self.page_size, self.eviction_batch_size);
        let removed = self
            .blocking(move |store| sweep(store, &prefix_bytes, page_size, batch_size, |_| true))
            .await?;
        debug!(%prefix, removed, "FeOxDB pattern eviction finished");
        Ok(removed)
    }

    async fn close(&self) -> BackendResult<()> {
        let Some(store) = self.store.write().await.take() else {
            return Ok(());
        };
        // The handle is gone even if the final flush fails.
        let flushed = tokio::task::spawn_blocking(move || store.flush())
            .await
            .map_err(FeOxDbError::from)?;
        debug!(label = %self.label, "FeOxDB store closed");
        flushed.map_err(|err| FeOxDbError::from(err).into())
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> ValueFormat {
        self.format
    }
}

impl CacheBackend for FeOxDbBackend {}
