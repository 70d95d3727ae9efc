#![warn(missing_docs)]
//! Cache contract and codecs shared by every cellar backend.
//!
//! A backend only has to move opaque bytes around: implement [`Backend`] and
//! the typed [`CacheBackend`] operations (`has`, `get`, `set`, `forget`,
//! `empty`, `empty_by_match`) come for free. Keys are namespaced by
//! [`Namespace`] and values are wrapped by [`EntryCodec`], so every backend
//! shares the same storage key scheme and the same payload layout.
mod backend;
pub mod codec;
mod error;
pub mod eviction;
pub mod format;
mod key;
mod label;
pub mod metrics;
mod ttl;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use codec::{EntryCodec, EntryHeader};
pub use error::{BackendError, DeleteStatus};
pub use eviction::{DEFAULT_EVICTION_BATCH_SIZE, DeleteBatch};
pub use format::{FormatError, ValueFormat};
pub use key::{KEY_SEPARATOR, Namespace, StorageKey};
pub use label::BackendLabel;
pub use ttl::{expire_at, ttl_secs};
