//! Running cache handle.

use std::sync::Arc;

use cellar_backend::{Backend, BackendResult};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared backend handle type handed to consumers.
pub type SharedBackend = Arc<dyn Backend + Send + 'static>;

/// An opened cache: the backend plus the background tasks serving it.
///
/// Consumers take clones of [`Cache::backend`]; the application keeps the
/// `Cache` itself and calls [`Cache::shutdown`] once on exit.
pub struct Cache {
    backend: SharedBackend,
    reclaimer: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    /// Wraps an opened backend without any background task.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            reclaimer: Mutex::new(None),
        }
    }

    pub(crate) fn with_reclaimer(backend: SharedBackend, reclaimer: JoinHandle<()>) -> Self {
        Self {
            backend,
            reclaimer: Mutex::new(Some(reclaimer)),
        }
    }

    /// Returns a handle to the backend.
    pub fn backend(&self) -> SharedBackend {
        Arc::clone(&self.backend)
    }

    /// Returns `true` while the reclamation task is scheduled.
    pub async fn is_reclaiming(&self) -> bool {
        self.reclaimer
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stops the reclamation task and closes the backend.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) -> BackendResult<()> {
        if let Some(task) = self.reclaimer.lock().await.take() {
            task.abort();
            // A cancelled task is the expected outcome here.
            let _ = task.await;
            debug!(backend = %self.backend.label(), "Reclamation stopped");
        }
        self.backend.close().await
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.backend.label())
            .field("namespace", self.backend.namespace())
            .finish_non_exhaustive()
    }
}
