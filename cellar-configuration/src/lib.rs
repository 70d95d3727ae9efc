//! Configuration and bootstrap for the cellar cache.
//!
//! Load a [`CacheConfig`] from YAML, then open it with
//! [`CacheConfig::into_cache`]:
//!
//! ```no_run
//! use cellar_backend::CacheBackend;
//! use cellar_configuration::CacheConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::from_yaml(
//!     r#"
//! namespace: myapp
//! backend:
//!   type: FeOxDb
//!   path: /var/cache/myapp
//! "#,
//! )?;
//! let cache = config.into_cache().await?;
//!
//! let backend = cache.backend();
//! backend.set("greeting", "hello", None).await?;
//!
//! cache.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
mod scheduler;

pub use backend::{Backend, FeOxDb, Redis};
pub use cache::{Cache, SharedBackend};
pub use config::{CacheConfig, DEFAULT_RECLAIM_INTERVAL_SECS};
pub use error::ConfigError;
