//! Presence and Subscription Engine
//!
//! Contact lists as rooted trees of groups, ranked presence statuses and the
//! engine that subscribes, moves and updates contacts while notifying
//! listeners synchronously.
//!
//! # Features
//!
//! - **Two-phase subscriptions**: `Created` is always followed by `Resolved`
//! - **Atomic moves**: a contact is never visible in two groups at once
//! - **Status cascade**: publishing a status updates contacts on both sides
//! - **Authorization**: pluggable handler consulted before subscribing
//! - **Directory**: engines find each other by user id through weak references
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use callkit_presence::{EmptyDirectory, PresenceEngine, PresenceStatus};
//!
//! let engine = PresenceEngine::new("me@example.org", Arc::new(EmptyDirectory));
//! engine.publish_presence_status(PresenceStatus::Online, "at my desk");
//!
//! engine.subscribe_to_root("alice@example.org").unwrap();
//! assert_eq!(
//!     engine.query_contact_status("alice@example.org").unwrap(),
//!     PresenceStatus::Online
//! );
//! ```
//!
//! # Architecture
//!
//! ```text
//! PresenceEngine ──owns──► root ContactGroup ──► subgroups ──► Contacts
//!       │
//!       ├── Arc<dyn ProviderDirectory> ──(weak)──► other PresenceEngines
//!       └── ListenerRegistry × 4 (subscription, contact, provider, group)
//! ```

pub mod authorization;
pub mod channel;
pub mod contact;
pub mod directory;
pub mod engine;
pub mod error;
pub mod event;
pub mod listener;
pub mod registration;
pub mod status;

pub use authorization::{
    AcceptAll, AuthorizationHandler, AuthorizationRequest, AuthorizationResponse,
    AuthorizationResponseCode,
};
pub use channel::{PresenceEvent, PresenceEventChannel};
pub use contact::{Contact, ContactGroup};
pub use directory::{EmptyDirectory, InMemoryDirectory, ProviderDirectory};
pub use engine::{PresenceEngine, ROOT_GROUP_NAME, VOLATILE_GROUP_NAME};
pub use error::{PresenceError, Result};
pub use event::{
    ContactPresenceStatusChangeEvent, GroupEventKind, ProviderPresenceStatusChangeEvent,
    ProviderStatusMessageChangeEvent, ServerStoredGroupEvent, SubscriptionEvent,
    SubscriptionEventKind, SubscriptionMovedEvent,
};
pub use listener::{
    ContactPresenceStatusListener, ProviderPresenceStatusListener, ServerStoredGroupListener,
    SubscriptionListener,
};
pub use registration::RegistrationState;
pub use status::PresenceStatus;
