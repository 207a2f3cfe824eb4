use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::reaction::SharedReaction;

/// Reactions captured for one identifier at the start of a scan cycle.
#[derive(Clone)]
pub struct RegistryEntry {
    pub identifier: String,
    pub reactions: Vec<SharedReaction>,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("identifier", &self.identifier)
            .field("reaction_count", &self.reactions.len())
            .finish()
    }
}

/// Maps identifiers to the reactions interested in them.
///
/// Writes are serialized behind the lock; scans only hold a read guard long
/// enough to clone a snapshot. An identifier is present in the map only while
/// it has at least one reaction.
#[derive(Default)]
pub struct ReactionRegistry {
    entries: RwLock<HashMap<String, Vec<SharedReaction>>>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append reactions to the identifier's list, creating it if needed.
    /// Duplicates are kept.
    pub fn register<I>(&self, identifier: impl Into<String>, reactions: I)
    where
        I: IntoIterator<Item = SharedReaction>,
    {
        let mut reactions = reactions.into_iter().peekable();
        if reactions.peek().is_none() {
            return;
        }

        let identifier = identifier.into();
        let mut entries = self.entries.write();
        let list = entries.entry(identifier).or_default();
        list.extend(reactions);
    }

    /// Drop every reaction registered for `identifier`. Returns whether an
    /// entry existed.
    pub fn unregister(&self, identifier: &str) -> bool {
        self.entries.write().remove(identifier).is_some()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    pub fn reaction_count(&self, identifier: &str) -> usize {
        self.entries
            .read()
            .get(identifier)
            .map(Vec::len)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clone the current mapping. Later registry writes do not affect the
    /// returned entries.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        self.entries
            .read()
            .iter()
            .map(|(identifier, reactions)| RegistryEntry {
                identifier: identifier.clone(),
                reactions: reactions.clone(),
            })
            .collect()
    }
}

impl fmt::Debug for ReactionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("ReactionRegistry")
            .field("identifier_count", &entries.len())
            .field(
                "reaction_count",
                &entries.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::reaction::reaction_fn;

    fn noop() -> SharedReaction {
        reaction_fn(|_, _| {})
    }

    #[test]
    fn register_appends_without_dedup() {
        let registry = ReactionRegistry::new();
        let shared = noop();

        registry.register("mac", [shared.clone()]);
        registry.register("mac", [shared.clone(), noop()]);
        registry.register("mac2", [noop()]);

        assert_eq!(registry.reaction_count("mac"), 3);
        assert_eq!(registry.reaction_count("mac2"), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_registration_does_not_create_entry() {
        let registry = ReactionRegistry::new();
        registry.register("mac", Vec::<SharedReaction>::new());

        assert!(!registry.contains("mac"));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_removes_entry_and_is_idempotent() {
        let registry = ReactionRegistry::new();
        registry.register("mac", [noop(), noop()]);

        assert!(registry.unregister("mac"));
        assert!(!registry.contains("mac"));
        assert!(!registry.unregister("mac"));
        assert!(!registry.unregister("never-registered"));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let registry = ReactionRegistry::new();
        let first = noop();
        registry.register("mac", [first.clone()]);

        let snapshot = registry.snapshot();
        registry.register("mac", [noop()]);
        registry.unregister("mac");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].identifier, "mac");
        assert_eq!(snapshot[0].reactions.len(), 1);
        assert!(Arc::ptr_eq(&snapshot[0].reactions[0], &first));
    }

    #[test]
    fn snapshot_preserves_registration_order_per_identifier() {
        let registry = ReactionRegistry::new();
        let a = noop();
        let b = noop();
        registry.register("mac", [a.clone()]);
        registry.register("mac", [b.clone()]);

        let snapshot = registry.snapshot();
        assert!(Arc::ptr_eq(&snapshot[0].reactions[0], &a));
        assert!(Arc::ptr_eq(&snapshot[0].reactions[1], &b));
    }
}
