//! Listener registry with snapshot fan-out
//!
//! `ListenerRegistry<L>` is the single place where the observer contract is
//! enforced for every entity in the workspace:
//! - registration is idempotent by identity (the `Arc` allocation, not `PartialEq`)
//! - removing a listener that was never registered is a no-op
//! - notification iterates a point-in-time snapshot in registration order
//! - a listener that panics is logged and skipped, the others still run

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

/// Outcome of a single fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners whose callback returned normally
    pub delivered: usize,
    /// Listeners whose callback panicked
    pub failed: usize,
}

impl DispatchReport {
    /// Total number of listeners in the snapshot
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }

    /// True if every listener in the snapshot was notified without panicking
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Thread-safe, ordered set of listeners of type `L`
///
/// `L` is usually a trait object (`dyn CallPeerListener`), so the registry
/// stores `Arc<L>` and compares entries by the address of their allocation.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use event_dispatch::ListenerRegistry;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self, name: &str);
/// }
///
/// struct Quiet;
/// impl Greeter for Quiet {
///     fn greet(&self, _name: &str) {}
/// }
///
/// let registry: ListenerRegistry<dyn Greeter> = ListenerRegistry::new("greeter");
/// let listener: Arc<dyn Greeter> = Arc::new(Quiet);
///
/// assert!(registry.add(Arc::clone(&listener)));
/// assert!(!registry.add(Arc::clone(&listener)));
///
/// let report = registry.dispatch(|l| l.greet("alice"));
/// assert_eq!(report.delivered, 1);
/// ```
pub struct ListenerRegistry<L: ?Sized> {
    /// Short label used in log output
    name: &'static str,
    listeners: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Create an empty registry
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Label given at construction
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener, returning whether it was newly added
    pub fn add(&self, listener: Arc<L>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregister a listener, returning whether it was present
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    /// Check whether this exact listener instance is registered
    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.listeners.read().iter().any(|l| same_listener(l, listener))
    }

    /// Point-in-time copy of the registered listeners, in registration order
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.read().clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// Invoke `notify` for every listener in a snapshot taken now
    ///
    /// Runs synchronously on the caller's thread. No lock is held while the
    /// callbacks run, so listeners may add or remove listeners (including
    /// themselves) without affecting the in-flight delivery.
    pub fn dispatch<F>(&self, mut notify: F) -> DispatchReport
    where
        F: FnMut(&L),
    {
        let snapshot = self.snapshot();
        let mut report = DispatchReport::default();
        tracing::debug!("Dispatching to {} listener(s) in '{}' registry", snapshot.len(), self.name);

        for listener in &snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| notify(&**listener)));
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    tracing::error!(
                        "Listener in '{}' registry panicked during dispatch: {}",
                        self.name,
                        panic_message(&*payload)
                    );
                }
            }
        }

        report
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new("listeners")
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("name", &self.name)
            .field("listener_count", &self.len())
            .finish()
    }
}

/// Identity comparison that ignores trait-object metadata
pub fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
