//! Gibberish: an in-process reference provider
//!
//! Drives the callkit telephony and presence cores without any network. Each
//! [`GibberishProvider`] is one account; accounts sharing an
//! [`InMemoryDirectory`](callkit_presence::InMemoryDirectory) see each
//! other's presence and can be called.
//!
//! # Features
//!
//! - **Registration**: `Unregistered → Registering → Registered` and back,
//!   taking every contact offline on the way down
//! - **Simulated calls**: outgoing calls ring and answer after configurable
//!   delays; incoming calls can answer themselves
//! - **Deterministic time**: [`ManualScheduler`] replaces real sleeps in tests
//! - **JSON configuration**: [`ProviderConfig`] loads from a file or string
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use callkit_gibberish::{GibberishProvider, ManualScheduler, ProviderConfig};
//! use callkit_presence::{InMemoryDirectory, PresenceStatus};
//! use callkit_telephony::{CallPeerState, CallState};
//!
//! let scheduler = Arc::new(ManualScheduler::new());
//! let directory = InMemoryDirectory::new();
//! let config = ProviderConfig::new("alice")
//!     .with_ring_delay(Duration::from_millis(100))
//!     .with_answer_delay(Duration::from_millis(400));
//!
//! let alice = GibberishProvider::new(config, scheduler.clone(), directory).unwrap();
//! alice.register().unwrap();
//! alice.presence().publish_presence_status(PresenceStatus::Online, "around");
//!
//! let call = alice.telephony().create_call("bob").unwrap();
//! scheduler.advance(Duration::from_millis(500));
//! assert_eq!(call.peers()[0].state(), CallPeerState::Connected);
//! assert_eq!(call.state(), CallState::InProgress);
//! ```
//!
//! # Architecture
//!
//! ```text
//! GibberishProvider
//!  ├── PresenceEngine ──registered in──► InMemoryDirectory ◄── other providers
//!  ├── BasicTelephony ──schedules──► Scheduler (manual or threaded)
//!  └── registration listeners
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod registration;
pub mod scheduler;
pub mod telephony;

pub use config::ProviderConfig;
pub use error::{OperationFailedReason, ProviderError, Result};
pub use provider::GibberishProvider;
pub use registration::{RegistrationStateChangeEvent, RegistrationStateChangeListener};
pub use scheduler::{ManualScheduler, Scheduler, Task, ThreadScheduler};
pub use telephony::{BasicTelephony, CallEvent, CallEventKind, CallListener};
