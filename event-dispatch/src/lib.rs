//! Generic Event Dispatch Library
//!
//! The observer plumbing shared by every entity in callkit: calls, call
//! peers, conference members, contacts and providers all expose listener
//! registration points backed by a `ListenerRegistry`.
//!
//! # Features
//!
//! - **Identity De-duplication**: Registering the same `Arc` twice has no effect
//! - **Snapshot Fan-out**: Notification iterates a copy taken at fire time
//! - **Failure Isolation**: A panicking listener is logged, the rest still run
//! - **Blocking Channels**: Forward synchronous callbacks to another thread
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use event_dispatch::{EventChannel, ListenerRegistry};
//!
//! trait StateListener: Send + Sync {
//!     fn state_changed(&self, new_state: &str);
//! }
//!
//! struct Forwarder(EventChannel<String>);
//!
//! impl StateListener for Forwarder {
//!     fn state_changed(&self, new_state: &str) {
//!         let _ = self.0.send(new_state.to_string());
//!     }
//! }
//!
//! let channel = EventChannel::new();
//! let registry: ListenerRegistry<dyn StateListener> = ListenerRegistry::new("state");
//! registry.add(Arc::new(Forwarder(channel.clone())));
//!
//! registry.dispatch(|l| l.state_changed("connected"));
//! assert_eq!(channel.iter().try_recv(), Some("connected".to_string()));
//! ```
//!
//! # Architecture
//!
//! ```text
//! Entity (Call, CallPeer, PresenceEngine, ...)
//!     │
//!     └── ListenerRegistry<dyn XListener>
//!             │ dispatch(): snapshot → catch_unwind per listener
//!             ▼
//!         listeners ──(optional)──► EventChannel<E> ──► EventIterator<E>
//! ```

pub mod channel;
pub mod error;
pub mod registry;

pub use channel::{EventChannel, EventIterator, EventSender, TimeoutIter, TryIter};
pub use error::{DispatchError, Result};
pub use registry::{same_listener, DispatchReport, ListenerRegistry};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::channel::{EventChannel, EventIterator};
    pub use crate::registry::{DispatchReport, ListenerRegistry};
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::{Arc, Weak};

    trait Tick: Send + Sync {
        fn tick(&self, n: u32);
    }

    /// Unregisters itself from the registry on its first notification
    struct OneShot {
        registry: Weak<ListenerRegistry<dyn Tick>>,
        me: Mutex<Option<Arc<dyn Tick>>>,
        seen: Mutex<Vec<u32>>,
    }

    impl Tick for OneShot {
        fn tick(&self, n: u32) {
            self.seen.lock().push(n);
            if let (Some(registry), Some(me)) = (self.registry.upgrade(), self.me.lock().take()) {
                registry.remove(&me);
            }
        }
    }

    struct Counter(Mutex<Vec<u32>>);

    impl Tick for Counter {
        fn tick(&self, n: u32) {
            self.0.lock().push(n);
        }
    }

    #[test]
    fn test_self_removal_during_dispatch() {
        let registry: Arc<ListenerRegistry<dyn Tick>> = Arc::new(ListenerRegistry::new("tick"));

        let one_shot = Arc::new(OneShot {
            registry: Arc::downgrade(&registry),
            me: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        });
        let as_listener: Arc<dyn Tick> = one_shot.clone();
        *one_shot.me.lock() = Some(Arc::clone(&as_listener));

        let before = Arc::new(Counter(Mutex::new(Vec::new())));
        let after = Arc::new(Counter(Mutex::new(Vec::new())));

        registry.add(before.clone());
        registry.add(as_listener);
        registry.add(after.clone());

        let report = registry.dispatch(|l| l.tick(1));
        assert_eq!(report.delivered, 3);

        registry.dispatch(|l| l.tick(2));

        // The one-shot saw the in-flight event exactly once and nothing after
        assert_eq!(*one_shot.seen.lock(), vec![1]);
        assert_eq!(*before.0.lock(), vec![1, 2]);
        assert_eq!(*after.0.lock(), vec![1, 2]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_listener_added_during_dispatch_waits_for_next_event() {
        struct Adder {
            registry: Weak<ListenerRegistry<dyn Tick>>,
            late: Arc<dyn Tick>,
        }

        impl Tick for Adder {
            fn tick(&self, _n: u32) {
                if let Some(registry) = self.registry.upgrade() {
                    registry.add(Arc::clone(&self.late));
                }
            }
        }

        let registry: Arc<ListenerRegistry<dyn Tick>> = Arc::new(ListenerRegistry::new("tick"));
        let late = Arc::new(Counter(Mutex::new(Vec::new())));

        registry.add(Arc::new(Adder {
            registry: Arc::downgrade(&registry),
            late: late.clone(),
        }));

        registry.dispatch(|l| l.tick(1));
        assert!(late.0.lock().is_empty());

        registry.dispatch(|l| l.tick(2));
        assert_eq!(*late.0.lock(), vec![2]);
    }
}
