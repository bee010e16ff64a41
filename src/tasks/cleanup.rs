//! Periodic Sweep Task
//!
//! Background task that periodically asks a shared store to drop stale state.
//! Both the expiring cache and the rate limiter run one of these.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest period the task will tick at; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

// == Sweep Trait ==
/// A store that can evict its own stale entries in one pass.
pub trait Sweep: Send + Sync + 'static {
    /// Short name used in log lines ("cache", "rate_limiter").
    fn label(&self) -> &'static str;

    /// Runs one full pass and returns the number of entries removed.
    fn sweep(&self) -> usize;
}

// == Sweep Handle ==
/// Owns a running sweep task.
///
/// Dropping the handle closes the shutdown channel, so the task exits at its
/// next wake-up even if `stop` is never awaited.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop and waits for it to finish.
    ///
    /// A sweep pass already in progress runs to completion first.
    pub async fn stop(self) {
        let SweepHandle { shutdown, task } = self;
        let _ = shutdown.send(());

        if let Err(err) = task.await {
            warn!("Sweep task ended abnormally: {}", err);
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that calls [`Sweep::sweep`] every `interval`.
///
/// The task holds only a weak reference to the target, so it never keeps the
/// store alive on its own and exits once the store is gone. The first pass
/// happens one full interval after spawning.
///
/// Must be called from within a tokio runtime.
///
/// # Arguments
/// * `target` - Weak reference to the store to sweep
/// * `interval` - Time between sweep passes
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(Arc::downgrade(&shared), Duration::from_secs(15));
/// // Later, during shutdown:
/// handle.stop().await;
/// ```
pub fn spawn_sweep_task<S: Sweep>(target: Weak<S>, interval: Duration) -> SweepHandle {
    let interval = interval.max(MIN_INTERVAL);
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Sweep task started with interval of {:?}", interval);

        loop {
            tokio::select! {
                // Resolves on an explicit stop and when the handle is dropped
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let Some(store) = target.upgrade() else {
                        break;
                    };

                    let removed = store.sweep();

                    if removed > 0 {
                        info!("{} sweep: removed {} stale entries", store.label(), removed);
                    } else {
                        debug!("{} sweep: no stale entries found", store.label());
                    }
                }
            }
        }

        debug!("Sweep task stopped");
    });

    SweepHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingStore {
        passes: AtomicUsize,
    }

    impl Sweep for CountingStore {
        fn label(&self) -> &'static str {
            "counting"
        }

        fn sweep(&self) -> usize {
            self.passes.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[tokio::test]
    async fn test_sweep_task_runs_periodically() {
        let store = Arc::new(CountingStore::default());

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.passes.load(Ordering::SeqCst) >= 2);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_first_pass_waits_one_interval() {
        let store = Arc::new(CountingStore::default());

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.passes.load(Ordering::SeqCst), 0);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_halts_sweeping() {
        let store = Arc::new(CountingStore::default());

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.stop().await;

        let after_stop = store.passes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.passes.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_task_exits_when_store_dropped() {
        let store = Arc::new(CountingStore::default());

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_millis(2));
        drop(store);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(handle.is_finished(), "Task should exit once the store is gone");
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let store = Arc::new(CountingStore::default());

        let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.passes.load(Ordering::SeqCst) >= 1);
        handle.stop().await;
    }
}
