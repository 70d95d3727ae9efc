//! Backend metrics.
//!
//! Enable the `metrics` feature to record these through the [`metrics`]
//! facade; without it every function below compiles to a no-op.
//!
//! ## Naming Pattern
//!
//! All metrics follow the pattern `cellar_backend_{operation}_total` and carry
//! a `backend` label with the [`BackendLabel`](crate::BackendLabel):
//!
//! - `cellar_backend_hits_total` / `cellar_backend_misses_total` - reads
//! - `cellar_backend_writes_total` - successful writes
//! - `cellar_backend_deletes_total` - single-key deletions
//! - `cellar_backend_evicted_total` - keys removed by pattern eviction
//! - `cellar_backend_errors_total` - failed operations, labelled by `operation`
//!
//! [`metrics`]: https://docs.rs/metrics

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for cache hits counter.
    pub static ref BACKEND_HITS: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_hits_total",
            "Total number of reads that found a live entry."
        );
        "cellar_backend_hits_total"
    };

    /// Metric name for cache misses counter.
    pub static ref BACKEND_MISSES: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_misses_total",
            "Total number of reads that found no live entry."
        );
        "cellar_backend_misses_total"
    };

    /// Metric name for writes counter.
    pub static ref BACKEND_WRITES: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_writes_total",
            "Total number of successful cache writes."
        );
        "cellar_backend_writes_total"
    };

    /// Metric name for single-key deletes counter.
    pub static ref BACKEND_DELETES: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_deletes_total",
            "Total number of single-key deletions."
        );
        "cellar_backend_deletes_total"
    };

    /// Metric name for evicted keys counter.
    pub static ref BACKEND_EVICTED: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_evicted_total",
            "Total number of keys removed by pattern eviction."
        );
        "cellar_backend_evicted_total"
    };

    /// Metric name for errors counter.
    pub static ref BACKEND_ERRORS: &'static str = {
        metrics::describe_counter!(
            "cellar_backend_errors_total",
            "Total number of failed cache operations."
        );
        "cellar_backend_errors_total"
    };
}

/// Record a read that found a live entry.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_hit(backend: &str) {
    metrics::counter!(*BACKEND_HITS, "backend" => backend.to_string()).increment(1);
}

/// Record a read hit (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_hit(_backend: &str) {}

/// Record a read that found nothing.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_miss(backend: &str) {
    metrics::counter!(*BACKEND_MISSES, "backend" => backend.to_string()).increment(1);
}

/// Record a read miss (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_miss(_backend: &str) {}

/// Record a successful write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_write(backend: &str) {
    metrics::counter!(*BACKEND_WRITES, "backend" => backend.to_string()).increment(1);
}

/// Record a write (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_write(_backend: &str) {}

/// Record a single-key deletion.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_delete(backend: &str) {
    metrics::counter!(*BACKEND_DELETES, "backend" => backend.to_string()).increment(1);
}

/// Record a deletion (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_delete(_backend: &str) {}

/// Record keys removed by pattern eviction.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_evicted(backend: &str, count: u64) {
    metrics::counter!(*BACKEND_EVICTED, "backend" => backend.to_string()).increment(count);
}

/// Record evicted keys (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_evicted(_backend: &str, _count: u64) {}

/// Record a failed operation.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_error(backend: &str, operation: &'static str) {
    metrics::counter!(
        *BACKEND_ERRORS,
        "backend" => backend.to_string(),
        "operation" => operation
    )
    .increment(1);
}

/// Record an error (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_error(_backend: &str, _operation: &'static str) {}
