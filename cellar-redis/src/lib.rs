#![warn(missing_docs)]
//! Redis backend for the cellar cache.
//!
//! [`RedisBackend`] implements the cache contract on top of a shared,
//! automatically reconnecting [`ConnectionManager`]. Pattern eviction walks
//! the keyspace with `SCAN`, never with a blocking `KEYS`.
//!
//! ```no_run
//! use cellar_backend::CacheBackend;
//! use cellar_redis::RedisBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = RedisBackend::builder()
//!     .server("redis://:secret@127.0.0.1:6379/0")
//!     .namespace("myapp")
//!     .build()
//!     .await?;
//!
//! backend.set("greeting", "hello", None).await?;
//! let greeting: String = backend.get("greeting").await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ConnectionManager`]: redis::aio::ConnectionManager

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{
    DEFAULT_DELETE_BATCH_SIZE, DEFAULT_SCAN_COUNT, RedisBackend, RedisBackendBuilder,
};
#[doc(inline)]
pub use crate::error::Error;
