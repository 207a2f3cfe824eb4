use std::fmt;
use std::sync::Arc;

/// Callback invoked with an identifier and the presence result of one scan
/// cycle.
///
/// Reactions run synchronously on the fan-out task that probed their
/// identifier, so long-running work should be handed off elsewhere.
pub trait Reaction: Send + Sync {
    fn status(&self, identifier: &str, present: bool);
}

/// Shared handle stored in the registry. The same reaction may be registered
/// any number of times.
pub type SharedReaction = Arc<dyn Reaction>;

/// Adapts a closure into a [`Reaction`].
pub struct ReactionFn<F>(F);

impl<F> ReactionFn<F>
where
    F: Fn(&str, bool) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Reaction for ReactionFn<F>
where
    F: Fn(&str, bool) + Send + Sync,
{
    fn status(&self, identifier: &str, present: bool) {
        (self.0)(identifier, present)
    }
}

impl<F> fmt::Debug for ReactionFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReactionFn")
            .field(&std::any::type_name::<F>())
            .finish()
    }
}

/// Wrap a closure as a shared reaction ready for registration.
pub fn reaction_fn<F>(f: F) -> SharedReaction
where
    F: Fn(&str, bool) + Send + Sync + 'static,
{
    Arc::new(ReactionFn::new(f))
}

/// Emits one `tracing` event per result.
#[derive(Debug, Clone, Default)]
pub struct LogReaction {
    label: Option<String>,
}

impl LogReaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a human readable name to the emitted events.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Reaction for LogReaction {
    fn status(&self, identifier: &str, present: bool) {
        match &self.label {
            Some(label) => tracing::info!(identifier, label = %label, present, "presence status"),
            None => tracing::info!(identifier, present, "presence status"),
        }
    }
}
