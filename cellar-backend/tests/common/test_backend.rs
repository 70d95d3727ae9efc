//! Simple in-memory test backend implementation using DashMap.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cellar_backend::{
    Backend, BackendError, BackendLabel, BackendResult, CacheBackend, DeleteBatch, DeleteStatus,
    EntryHeader, Namespace, StorageKey, ValueFormat,
};
use dashmap::DashMap;

/// In-memory backend relying on the entry header for expiry.
///
/// Clones and [`TestBackend::sharing`] instances share the same store.
#[derive(Clone)]
pub struct TestBackend {
    store: Arc<DashMap<String, Bytes>>,
    namespace: Namespace,
    format: ValueFormat,
    batch_size: usize,
    flushes: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl TestBackend {
    pub fn new(namespace: &str) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            namespace: Namespace::new(namespace),
            format: ValueFormat::Json,
            batch_size: 3,
            flushes: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Another backend bound to `namespace` over the same store.
    pub fn sharing(&self, namespace: &str) -> Self {
        Self {
            store: self.store.clone(),
            namespace: Namespace::new(namespace),
            format: self.format,
            batch_size: self.batch_size,
            flushes: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Number of delete batches flushed so far.
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Number of keys in the shared store, across namespaces.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn raw(&self, key: &str) -> Option<Bytes> {
        self.store.get(key).map(|v| v.clone())
    }

    pub fn insert_raw(&self, key: &str, payload: Bytes) {
        self.store.insert(key.to_owned(), payload);
    }

    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BackendError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn exists(&self, key: &StorageKey) -> BackendResult<bool> {
        self.ensure_open()?;
        Ok(self.store.get(key.as_str()).is_some_and(|payload| {
            EntryHeader::parse(&payload).is_ok_and(|header| !header.is_expired())
        }))
    }

    async fn read(&self, key: &StorageKey) -> BackendResult<Option<Bytes>> {
        self.ensure_open()?;
        Ok(self.store.get(key.as_str()).map(|v| v.clone()))
    }

    async fn write(
        &self,
        key: &StorageKey,
        payload: Bytes,
        ttl: Option<Duration>,
    ) -> BackendResult<()> {
        self.ensure_open()?;
        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            self.store.remove(key.as_str());
        } else {
            self.store.insert(key.to_string(), payload);
        }
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> BackendResult<DeleteStatus> {
        self.ensure_open()?;
        Ok(match self.store.remove(key.as_str()) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn remove_by_prefix(&self, prefix: &str) -> BackendResult<u64> {
        self.ensure_open()?;
        // DashMap deadlocks when removing while iterating, so snapshot first.
        let matching: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        let mut batch = DeleteBatch::new(self.batch_size);
        let mut flush = |keys: Vec<String>| {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            for key in keys {
                if self.store.remove(&key).is_some() {
                    removed += 1;
                }
            }
        };
        for key in matching {
            if let Some(full) = batch.push(key) {
                flush(full);
            }
        }
        if let Some(rest) = batch.finish() {
            flush(rest);
        }
        Ok(removed)
    }

    async fn close(&self) -> BackendResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("test")
    }

    fn value_format(&self) -> ValueFormat {
        self.format
    }
}

impl CacheBackend for TestBackend {}
