//! Scan cycle execution: concurrent per-identifier probing and the periodic
//! loop that repeats it.

pub mod dispatcher;
pub mod scheduler;

pub use dispatcher::ScanDispatcher;
pub use scheduler::PeriodicScheduler;

/// How a scan cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every fan-out unit finished its reactions.
    Completed,
    /// The cancellation token fired before the join completed.
    Cancelled,
}

/// Summary counters for one cycle. Holds no per-identifier results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    /// Identifiers probed this cycle.
    pub dispatched: usize,
    /// Units that ran their reactions.
    pub finished: usize,
    pub present: usize,
    /// Probes that failed and were reported as absent.
    pub probe_failures: usize,
    /// Units not finished when the cycle was cancelled.
    pub aborted: usize,
    /// Units whose reactions panicked.
    pub panicked: usize,
}

impl ScanOutcome {
    pub(crate) fn new(dispatched: usize) -> Self {
        Self {
            status: ScanStatus::Completed,
            dispatched,
            finished: 0,
            present: 0,
            probe_failures: 0,
            aborted: 0,
            panicked: 0,
        }
    }

    pub(crate) fn cancelled_before_start() -> Self {
        Self {
            status: ScanStatus::Cancelled,
            ..Self::new(0)
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ScanStatus::Cancelled
    }

    pub fn absent(&self) -> usize {
        self.finished - self.present
    }
}
