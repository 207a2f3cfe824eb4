use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::probe::PresenceProbe;
use crate::reaction::{SharedReaction, reaction_fn};
use crate::registry::ReactionRegistry;
use crate::scan::{PeriodicScheduler, ScanDispatcher, ScanOutcome};

/// Presence scanning engine.
///
/// Owns its reaction registry and a probe backend. Each instance is
/// independent; share one across tasks with `Arc<Presence>`.
///
/// Registry changes made while a scan is in flight apply from the next
/// cycle: a cycle works on the snapshot taken when it started.
pub struct Presence {
    registry: ReactionRegistry,
    dispatcher: ScanDispatcher,
}

impl fmt::Debug for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presence")
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl Presence {
    pub fn new(probe: Arc<dyn PresenceProbe>) -> Self {
        Self {
            registry: ReactionRegistry::new(),
            dispatcher: ScanDispatcher::new(probe),
        }
    }

    /// Add reactions for `identifier`. Existing reactions are kept and
    /// duplicates are invoked once per registration.
    pub fn register<I>(&self, identifier: impl Into<String>, reactions: I)
    where
        I: IntoIterator<Item = SharedReaction>,
    {
        self.registry.register(identifier, reactions);
    }

    /// Register a single closure for `identifier`.
    pub fn register_fn<F>(&self, identifier: impl Into<String>, f: F)
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.registry.register(identifier, [reaction_fn(f)]);
    }

    /// Remove all reactions for `identifier`; it will no longer be probed.
    /// Unknown identifiers are ignored.
    pub fn unregister(&self, identifier: &str) -> bool {
        self.registry.unregister(identifier)
    }

    pub fn registry(&self) -> &ReactionRegistry {
        &self.registry
    }

    /// Run one scan cycle over every registered identifier.
    ///
    /// Blocks until all reactions ran or `cancel` fires. Probe failures are
    /// logged and reported to reactions as absent; this never fails.
    pub async fn scan(&self, cancel: &CancellationToken) -> ScanOutcome {
        let snapshot = self.registry.snapshot();
        self.dispatcher.run_cycle(snapshot, cancel).await
    }

    /// Scan now, then again `interval` after each cycle finishes, until
    /// `cancel` fires. Returns the number of cycles run.
    pub async fn scan_periodically(&self, cancel: &CancellationToken, interval: Duration) -> u64 {
        PeriodicScheduler::new(interval)
            .run(cancel, || self.scan(cancel))
            .await
    }
}
