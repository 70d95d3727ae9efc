//! Periodic reclamation of expired entries.

use std::future::Future;
use std::time::Duration;

use cellar_backend::{BackendError, BackendLabel, BackendResult};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Runs `reclaim` every `period` on a background task.
///
/// The first run happens one full period after the call, never at startup.
/// Failures are logged and the next tick retries; the task ends on its own
/// once the backend reports it is closed.
pub(crate) fn spawn_reclaimer<F, Fut>(
    label: BackendLabel,
    period: Duration,
    reclaim: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = BackendResult<u64>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match reclaim().await {
                Ok(reclaimed) => debug!(backend = %label, reclaimed, "Reclamation finished"),
                Err(BackendError::Closed) => {
                    debug!(backend = %label, "Backend closed, stopping reclamation");
                    break;
                }
                Err(error) => warn!(backend = %label, %error, "Reclamation failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(60);

    fn counting(
        calls: &Arc<AtomicUsize>,
        result: fn(usize) -> BackendResult<u64>,
    ) -> JoinHandle<()> {
        let calls = Arc::clone(calls);
        spawn_reclaimer(BackendLabel::new_static("test"), PERIOD, move || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move { result(call) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_once_per_period_after_the_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = counting(&calls, |_| Ok(0));

        tokio::time::sleep(PERIOD / 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_schedule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = counting(&calls, |_| {
            Err(BackendError::StorageError("disk full".into()))
        });

        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn closed_backend_ends_the_task() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = counting(&calls, |call| {
            if call == 0 { Ok(1) } else { Err(BackendError::Closed) }
        });

        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
        handle.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
