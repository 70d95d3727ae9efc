use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;

use crate::{
    BackendError, BackendLabel, DeleteStatus, EntryCodec, EntryHeader, Namespace, StorageKey,
    ValueFormat, expire_at, metrics,
};

/// Result type of every backend operation.
pub type BackendResult<T> = Result<T, BackendError>;

/// Raw storage operations a backend has to provide.
///
/// Payloads are opaque [`EntryCodec`] bytes; keys are already namespaced.
/// Every method may block on network or disk I/O for the duration of the
/// returned future.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Returns `true` if a live entry is stored under `key`.
    ///
    /// Implementations must not decode the entry body.
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool>;

    /// Reads the payload stored under `key`.
    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>>;

    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// With a TTL the entry must become unreadable once it elapses. A TTL of
    /// zero removes the key.
    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()>;

    /// Deletes the entry under `key`. A missing key is not an error.
    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus>;

    /// Deletes every key starting with `prefix` and returns how many were
    /// removed.
    ///
    /// On error, keys removed by earlier batches stay removed; rerunning the
    /// call deletes whatever still matches.
    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64>;

    /// Releases the connection or store handle.
    ///
    /// Calling it again is a no-op. Any other operation afterwards fails with
    /// [`BackendError::Closed`].
    async fn close(&self) -> BackendResult<()>;

    /// Namespace every key of this backend lives in.
    fn namespace(&self) -> &Namespace;

    /// Returns the label of this backend used in logs and metrics.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    /// Format used to encode new entries.
    fn value_format(&self) -> ValueFormat {
        ValueFormat::Json
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool> {
        (*self).exists(key).await
    }

    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>> {
        (*self).read(key).await
    }

    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        (*self).write(key, payload, ttl).await
    }

    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64> {
        (*self).remove_by_prefix(prefix).await
    }

    async fn close(&self) -> BackendResult<()> {
        (*self).close().await
    }

    fn namespace(&self) -> &Namespace {
        (*self).namespace()
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> ValueFormat {
        (*self).value_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool> {
        (**self).exists(key).await
    }

    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>> {
        (**self).read(key).await
    }

    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        (**self).write(key, payload, ttl).await
    }

    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64> {
        (**self).remove_by_prefix(prefix).await
    }

    async fn close(&self) -> BackendResult<()> {
        (**self).close().await
    }

    fn namespace(&self) -> &Namespace {
        (**self).namespace()
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> ValueFormat {
        (**self).value_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool> {
        (**self).exists(key).await
    }

    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>> {
        (**self).read(key).await
    }

    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        (**self).write(key, payload, ttl).await
    }

    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64> {
        (**self).remove_by_prefix(prefix).await
    }

    async fn close(&self) -> BackendResult<()> {
        (**self).close().await
    }

    fn namespace(&self) -> &Namespace {
        (**self).namespace()
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> ValueFormat {
        (**self).value_format()
    }
}

/// The cache contract: typed operations on application keys.
///
/// Keys passed here are application keys; the backend's [`Namespace`] is
/// applied before any I/O. Every operation is read-your-writes consistent
/// for the same backend instance.
pub trait CacheBackend: Backend {
    /// Returns `true` if a live entry exists for `key`.
    fn has(&self, key: &str) -> impl Future<Output = BackendResult<bool>> + Send {
        async move {
            let storage_key = self.namespace().key(key);
            self.exists(&storage_key)
                .await
                .inspect_err(|_| metrics::record_error(self.label().as_str(), "has"))
        }
    }

    /// Returns the value stored under `key`.
    ///
    /// Fails with [`BackendError::NotFound`] if the key is absent or
    /// expired, and with [`BackendError::DecodeError`] if the stored payload
    /// cannot be read as `T`.
    fn get<T>(&self, key: &str) -> impl Future<Output = BackendResult<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let label = self.label();
            let storage_key = self.namespace().key(key);
            let payload = match self.read(&storage_key).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    metrics::record_miss(label.as_str());
                    return Err(BackendError::NotFound(key.to_owned()));
                }
                Err(err) => {
                    metrics::record_error(label.as_str(), "get");
                    return Err(err);
                }
            };

            let header = EntryHeader::parse(&payload).map_err(BackendError::DecodeError)?;
            if header.is_expired() {
                trace!(key = %storage_key, "entry expired");
                metrics::record_miss(label.as_str());
                return Err(BackendError::NotFound(key.to_owned()));
            }

            let (_, value) = EntryCodec::new(self.value_format())
                .decode(&storage_key, &payload)
                .map_err(BackendError::DecodeError)?;
            metrics::record_hit(label.as_str());
            Ok(value)
        }
    }

    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// Without a TTL the entry never expires.
    fn set<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync + ?Sized,
    {
        async move {
            let label = self.label();
            let storage_key = self.namespace().key(key);
            let payload = EntryCodec::new(self.value_format())
                .encode(&storage_key, value, expire_at(ttl))
                .map_err(BackendError::EncodeError)?;
            match self.write(&storage_key, payload, ttl).await {
                Ok(()) => {
                    metrics::record_write(label.as_str());
                    Ok(())
                }
                Err(err) => {
                    metrics::record_error(label.as_str(), "set");
                    Err(err)
                }
            }
        }
    }

    /// Deletes the entry for `key` if present.
    fn forget(&self, key: &str) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move {
            let label = self.label();
            let storage_key = self.namespace().key(key);
            match self.remove(&storage_key).await {
                Ok(status) => {
                    metrics::record_delete(label.as_str());
                    Ok(status)
                }
                Err(err) => {
                    metrics::record_error(label.as_str(), "forget");
                    Err(err)
                }
            }
        }
    }

    /// Deletes every entry of the namespace.
    fn empty(&self) -> impl Future<Output = BackendResult<u64>> + Send {
        self.empty_by_match("")
    }

    /// Deletes every entry whose application key starts with `pattern`.
    ///
    /// Returns how many entries were removed.
    fn empty_by_match(&self, pattern: &str) -> impl Future<Output = BackendResult<u64>> + Send {
        async move {
            let label = self.label();
            let prefix = self.namespace().pattern(pattern);
            match self.remove_by_prefix(&prefix).await {
                Ok(removed) => {
                    trace!(backend = %label, %prefix, removed, "emptied by match");
                    metrics::record_evicted(label.as_str(), removed);
                    Ok(removed)
                }
                Err(err) => {
                    metrics::record_error(label.as_str(), "empty_by_match");
                    Err(err)
                }
            }
        }
    }
}

impl CacheBackend for &dyn Backend {}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend + Send + 'static> {}
