//! Time-to-live helpers.
//!
//! TTLs are whole seconds. Sub-second remainders round up so an entry never
//! expires earlier than requested.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Converts a TTL to the whole number of seconds sent to a store.
///
/// ```
/// use std::time::Duration;
/// use cellar_backend::ttl_secs;
///
/// assert_eq!(ttl_secs(Duration::from_secs(5)), 5);
/// assert_eq!(ttl_secs(Duration::from_millis(1500)), 2);
/// assert_eq!(ttl_secs(Duration::ZERO), 0);
/// ```
pub fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

/// Absolute expiry instant for a TTL starting now.
pub fn expire_at(ttl: Option<Duration>) -> Option<DateTime<Utc>> {
    ttl.map(|ttl| {
        let secs = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    })
}
