//! Batching policy for pattern eviction.
//!
//! Backends enumerate matching keys incrementally and hand them to a
//! [`DeleteBatch`]. Whenever the batch fills up it is handed back to the
//! backend to be deleted in one go, so peak memory stays at one batch no
//! matter how many keys match.
//!
//! ```
//! use cellar_backend::DeleteBatch;
//!
//! let mut batch = DeleteBatch::new(2);
//! let mut flushed = Vec::new();
//! for key in ["a", "b", "c"] {
//!     if let Some(full) = batch.push(key) {
//!         flushed.push(full);
//!     }
//! }
//! flushed.extend(batch.finish());
//! assert_eq!(flushed, vec![vec!["a", "b"], vec!["c"]]);
//! ```

/// Default number of keys deleted per batch.
pub const DEFAULT_EVICTION_BATCH_SIZE: usize = 100_000;

// Keeps small evictions from reserving a full batch up front.
const INITIAL_CAPACITY: usize = 1024;

/// Bounded buffer of keys waiting to be deleted.
#[derive(Debug)]
pub struct DeleteBatch<K> {
    keys: Vec<K>,
    limit: usize,
}

impl<K> DeleteBatch<K> {
    /// Creates a batch that fills up at `limit` keys (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            keys: Vec::with_capacity(limit.min(INITIAL_CAPACITY)),
            limit,
        }
    }

    /// Number of keys a full batch holds.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of keys currently buffered.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no keys are buffered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Buffers a key and returns the full batch once the limit is reached.
    pub fn push(&mut self, key: K) -> Option<Vec<K>> {
        self.keys.push(key);
        if self.keys.len() >= self.limit {
            let next = Vec::with_capacity(self.limit.min(INITIAL_CAPACITY));
            Some(std::mem::replace(&mut self.keys, next))
        } else {
            None
        }
    }

    /// Returns the remaining partial batch, if any.
    pub fn finish(self) -> Option<Vec<K>> {
        (!self.keys.is_empty()).then_some(self.keys)
    }
}

impl<K> Default for DeleteBatch<K> {
    fn default() -> Self {
        Self::new(DEFAULT_EVICTION_BATCH_SIZE)
    }
}
