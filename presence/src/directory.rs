//! Lookup of presence engines by user id
//!
//! Engines that share a directory can see each other: a contact whose
//! address is another engine's user id takes its status from that engine,
//! and publishing a status updates every contact pointing back at us.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use crate::engine::PresenceEngine;

/// Capability to find live presence engines by user id
pub trait ProviderDirectory: Send + Sync {
    fn lookup(&self, user_id: &str) -> Option<Arc<PresenceEngine>>;

    /// Every live engine
    fn engines(&self) -> Vec<Arc<PresenceEngine>>;
}

/// A directory with no entries, for standalone engines
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDirectory;

impl ProviderDirectory for EmptyDirectory {
    fn lookup(&self, _user_id: &str) -> Option<Arc<PresenceEngine>> {
        None
    }

    fn engines(&self) -> Vec<Arc<PresenceEngine>> {
        Vec::new()
    }
}

/// Process-local directory holding weak references
///
/// An engine disappears from the directory when it is dropped, even without
/// an explicit `unregister`.
#[derive(Default)]
pub struct InMemoryDirectory {
    engines: RwLock<HashMap<String, Weak<PresenceEngine>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add an engine under its user id, replacing any previous entry
    pub fn register(&self, engine: &Arc<PresenceEngine>) {
        debug!(user_id = engine.user_id(), "registering presence engine");
        self.engines
            .write()
            .insert(engine.user_id().to_string(), Arc::downgrade(engine));
    }

    pub fn unregister(&self, user_id: &str) -> bool {
        self.engines.write().remove(user_id).is_some()
    }

    /// Number of live engines
    pub fn len(&self) -> usize {
        self.engines
            .read()
            .values()
            .filter(|e| e.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProviderDirectory for InMemoryDirectory {
    fn lookup(&self, user_id: &str) -> Option<Arc<PresenceEngine>> {
        self.engines.read().get(user_id).and_then(Weak::upgrade)
    }

    fn engines(&self) -> Vec<Arc<PresenceEngine>> {
        let mut engines = self.engines.write();
        engines.retain(|_, e| e.strong_count() > 0);
        engines.values().filter_map(Weak::upgrade).collect()
    }
}

impl std::fmt::Debug for InMemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDirectory")
            .field("engines", &self.len())
            .finish()
    }
}
