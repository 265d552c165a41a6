//! The polling loop that drives probe attempts until a terminal status

use async_trait::async_trait;
use simmer_core::{Backoff, Status, WaitError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A probe strategy: performs exactly one readiness check.
///
/// Implementations classify the outcome of a single network interaction into
/// a [`Status`]. They must honor `cancel` while I/O is in flight and return a
/// terminal cancellation status rather than hanging.
#[async_trait]
pub trait Waiter: Send + Sync {
    /// Perform one readiness check
    async fn attempt(&self, cancel: &CancellationToken) -> Status;
}

/// Drive `waiter` until it reports a terminal status, the wall-clock
/// `timeout` elapses, or `cancel` fires.
///
/// Returns a live, single-pass stream of statuses: one per attempt, ending
/// with exactly one terminal status, after which the channel closes. The
/// first attempt fires immediately; subsequent attempts are spaced by the
/// default [`Backoff`] schedule. `interval` is accepted for interface
/// compatibility but does not govern the spacing.
pub fn wait<W>(
    waiter: W,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) -> mpsc::Receiver<Status>
where
    W: Waiter + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(run(waiter, interval, timeout, cancel, tx));
    rx
}

async fn run<W: Waiter>(
    waiter: W,
    _interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<Status>,
) {
    let deadline = Instant::now() + timeout;
    let mut backoff = Backoff::default();
    let mut next = Instant::now();

    loop {
        // Biased so that an expired deadline always wins over a due attempt,
        // and cancellation wins over a due attempt.
        let status = tokio::select! {
            biased;
            _ = time::sleep_until(deadline) => Status::failed(WaitError::Timeout),
            _ = cancel.cancelled() => Status::failed(WaitError::Cancelled),
            _ = time::sleep_until(next) => waiter.attempt(&cancel).await,
        };

        let done = status.done;
        if tx.send(status).await.is_err() {
            // Receiver dropped: nobody is listening, stop probing.
            return;
        }
        if done {
            return;
        }

        let delay = backoff.next();
        debug!(delay = ?delay, "backoff");
        next = Instant::now() + delay;
    }
}
