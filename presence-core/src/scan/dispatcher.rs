use std::fmt;
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::{ScanOutcome, ScanStatus};
use crate::probe::PresenceProbe;
use crate::registry::RegistryEntry;

/// Result of one fan-out unit after its reactions ran.
#[derive(Debug)]
struct UnitReport {
    present: bool,
    probe_failed: bool,
}

/// Runs single scan cycles over a registry snapshot.
pub struct ScanDispatcher {
    probe: Arc<dyn PresenceProbe>,
}

impl fmt::Debug for ScanDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanDispatcher")
            .field("probe_type", &std::any::type_name_of_val(self.probe.as_ref()))
            .finish()
    }
}

impl ScanDispatcher {
    pub fn new(probe: Arc<dyn PresenceProbe>) -> Self {
        Self { probe }
    }

    /// Probe every entry concurrently and invoke its reactions.
    ///
    /// Returns when all units have finished or `cancel` fires, whichever is
    /// first, without waiting for stragglers. On cancellation units still
    /// awaiting their probe are aborted there, so an identifier's reactions
    /// either all run for this cycle or none do. A unit that was already
    /// running its reactions completes them after this returns.
    pub async fn run_cycle(
        &self,
        entries: Vec<RegistryEntry>,
        cancel: &CancellationToken,
    ) -> ScanOutcome {
        if cancel.is_cancelled() {
            debug!("scan cancelled before dispatch");
            return ScanOutcome::cancelled_before_start();
        }

        let mut outcome = ScanOutcome::new(entries.len());
        let mut units = JoinSet::new();

        for entry in entries {
            let probe = Arc::clone(&self.probe);
            let cancel = cancel.clone();
            units.spawn(async move { probe_and_react(probe.as_ref(), &cancel, entry).await });
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.status = ScanStatus::Cancelled;
                    break;
                }
                joined = units.join_next() => match joined {
                    Some(result) => record(&mut outcome, result),
                    None => break,
                }
            }
        }

        if outcome.status == ScanStatus::Cancelled {
            // Units still awaiting their probe are aborted there. Units already
            // running reactions finish on their own; settle them off the
            // caller's path.
            units.abort_all();
            outcome.aborted += units.len();
            tokio::spawn(async move {
                let mut late = ScanOutcome::new(0);
                while let Some(result) = units.join_next().await {
                    record(&mut late, result);
                }
                debug!(
                    finished_late = late.finished,
                    aborted = late.aborted,
                    panicked = late.panicked,
                    "cancelled scan units settled"
                );
            });
            warn!(
                dispatched = outcome.dispatched,
                finished = outcome.finished,
                aborted = outcome.aborted,
                "scan cycle cancelled before all probes finished"
            );
        } else {
            debug!(
                dispatched = outcome.dispatched,
                present = outcome.present,
                probe_failures = outcome.probe_failures,
                "scan cycle completed"
            );
        }

        outcome
    }
}

async fn probe_and_react(
    probe: &dyn PresenceProbe,
    cancel: &CancellationToken,
    entry: RegistryEntry,
) -> Option<UnitReport> {
    let RegistryEntry {
        identifier,
        reactions,
    } = entry;

    let (present, probe_failed) = match probe.is_present(cancel, &identifier).await {
        Ok(present) => (present, false),
        Err(err) if cancel.is_cancelled() => {
            // Cancellation is not absence; leave this identifier's reactions out.
            debug!(identifier = %identifier, error = %err, "probe ended by cancellation");
            return None;
        }
        Err(err) => {
            warn!(identifier = %identifier, error = %err, "could not scan successfully, reporting absent");
            (false, true)
        }
    };

    for reaction in &reactions {
        reaction.status(&identifier, present);
    }

    Some(UnitReport {
        present,
        probe_failed,
    })
}

fn record(outcome: &mut ScanOutcome, result: Result<Option<UnitReport>, JoinError>) {
    match result {
        Ok(Some(report)) => {
            outcome.finished += 1;
            if report.present {
                outcome.present += 1;
            }
            if report.probe_failed {
                outcome.probe_failures += 1;
            }
        }
        Ok(None) => outcome.aborted += 1,
        Err(err) if err.is_cancelled() => outcome.aborted += 1,
        Err(err) => {
            outcome.panicked += 1;
            error!("reaction task panicked: {err}");
        }
    }
}
