use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::ScanOutcome;

/// Repeats scan cycles with a fixed pause between the end of one cycle and
/// the start of the next.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicScheduler {
    interval: Duration,
}

impl PeriodicScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run `cycle` immediately, then again after every interval until
    /// `cancel` fires. Cancellation is only observed between cycles; a
    /// running cycle sees it through the token it was handed.
    ///
    /// Returns the number of cycles started.
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, mut cycle: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ScanOutcome>,
    {
        info!(interval = ?self.interval, "periodic scanning started");
        let mut cycles: u64 = 0;

        loop {
            cycles += 1;
            let outcome = cycle().await;
            debug!(
                cycle = cycles,
                status = ?outcome.status,
                present = outcome.present,
                dispatched = outcome.dispatched,
                "periodic scan cycle finished"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(cycles, "periodic scanning stopped");
        cycles
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_cycle_runs_without_delay_then_spaced_by_interval() {
        let scheduler = PeriodicScheduler::new(Duration::from_secs(10));
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let stamps = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let cycles = {
            let stamps = Arc::clone(&stamps);
            let cancel_inner = cancel.clone();
            scheduler
                .run(&cancel, move || {
                    let stamps = Arc::clone(&stamps);
                    let cancel = cancel_inner.clone();
                    async move {
                        let mut stamps = stamps.lock();
                        stamps.push(started.elapsed());
                        if stamps.len() == 3 {
                            cancel.cancel();
                        }
                        ScanOutcome::new(0)
                    }
                })
                .await
        };

        assert_eq!(cycles, 3);
        let stamps = stamps.lock();
        assert_eq!(stamps[0], Duration::ZERO);
        assert!(stamps[1] >= Duration::from_secs(10));
        assert!(stamps[2] - stamps[1] >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_wait_stops_new_cycles() {
        let scheduler = PeriodicScheduler::new(Duration::from_secs(60));
        let cancel = CancellationToken::new();
        let count = Arc::new(AtomicU64::new(0));

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(90)).await;
                cancel.cancel();
            })
        };

        let cycles = {
            let count = Arc::clone(&count);
            scheduler
                .run(&cancel, move || {
                    count.fetch_add(1, Ordering::SeqCst);
                    async { ScanOutcome::new(0) }
                })
                .await
        };
        canceller.await.expect("canceller task");

        // t=0 and t=60 ran; cancellation at t=90 lands in the second wait.
        assert_eq!(cycles, 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_never_overlap() {
        let scheduler = PeriodicScheduler::new(Duration::from_millis(5));
        let cancel = CancellationToken::new();
        let in_flight = Arc::new(AtomicU64::new(0));
        let runs = Arc::new(AtomicU64::new(0));

        {
            let in_flight = Arc::clone(&in_flight);
            let runs = Arc::clone(&runs);
            let cancel_inner = cancel.clone();
            scheduler
                .run(&cancel, move || {
                    let in_flight = Arc::clone(&in_flight);
                    let runs = Arc::clone(&runs);
                    let cancel = cancel_inner.clone();
                    async move {
                        assert_eq!(in_flight.fetch_add(1, Ordering::SeqCst), 0);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        if runs.fetch_add(1, Ordering::SeqCst) == 4 {
                            cancel.cancel();
                        }
                        ScanOutcome::new(0)
                    }
                })
                .await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }
}
