//! Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! idle rate-limit windows.
//!
//! Expired entries are purged in batches, releasing the cache lock between
//! batches so lookups are never blocked for a whole pass.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::ratelimit::SlidingWindowLimiter;

/// What a single sweep pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_entries: usize,
    pub idle_clients: usize,
}

/// Runs one sweep pass over the cache and the limiter.
pub async fn sweep_once(
    cache: &SharedCache,
    limiter: &SlidingWindowLimiter,
    batch: usize,
) -> SweepReport {
    let batch = batch.max(1);
    let mut expired_entries = 0;

    loop {
        let removed = cache.write().await.purge_expired(batch);
        expired_entries += removed;
        if removed < batch {
            break;
        }
        tokio::task::yield_now().await;
    }

    SweepReport {
        expired_entries,
        idle_clients: limiter.sweep_idle(),
    }
}

// == Sweep Task ==
/// Handle to the running sweep task.
#[derive(Debug)]
pub struct SweepTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweepTask {
    /// Stops the task and waits for it to finish.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already ended
        let _ = self.stop.send(());
        if let Err(err) = self.handle.await {
            warn!("sweep task ended abnormally: {}", err);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns the periodic sweep.
///
/// The first pass runs one `interval` after spawning. A pass that panics is
/// logged and skipped; the next tick runs normally.
///
/// # Example
/// ```ignore
/// let sweeper = spawn_sweep_task(cache.clone(), limiter.clone(), Duration::from_secs(5), 256);
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweep_task(
    cache: SharedCache,
    limiter: Arc<SlidingWindowLimiter>,
    interval: Duration,
    batch: usize,
) -> SweepTask {
    spawn_periodic(interval, move || {
        let cache = cache.clone();
        let limiter = limiter.clone();
        async move { sweep_once(&cache, &limiter, batch).await }.boxed()
    })
}

/// Drives `pass` on every tick until stopped.
fn spawn_periodic<F>(interval: Duration, mut pass: F) -> SweepTask
where
    F: FnMut() -> BoxFuture<'static, SweepReport> + Send + 'static,
{
    let (stop, mut stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        info!("Starting sweep task with interval of {:?}", interval);

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => {}
            }

            // Building the pass can panic as well as running it
            let outcome = AssertUnwindSafe(async { pass().await }).catch_unwind();
            match outcome.await {
                Ok(report) if report != SweepReport::default() => info!(
                    "Sweep: removed {} expired entries, {} idle clients",
                    report.expired_entries, report.idle_clients
                ),
                Ok(_) => debug!("Sweep: nothing to remove"),
                Err(_) => warn!("Sweep pass panicked, skipping"),
            }
        }

        info!("Sweep task stopped");
    });

    SweepTask { stop, handle }
}
