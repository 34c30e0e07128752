//! Call and Call Peer State Machines
//!
//! The telephony core of callkit: calls, the remote peers inside them and the
//! conference members a focus peer reports, each with its own state machine
//! and listener registration points.
//!
//! # Features
//!
//! - **Forward-only calls**: `Initialization → InProgress → Ended`, ended once
//! - **Peer lifecycle**: thirteen peer states with terminal `Disconnected`/`Failed`
//! - **Hold algebra**: local and remote hold combine into locally, remotely or
//!   mutually on hold
//! - **Cascade**: a peer leaving removes it from its call and ends an empty call
//! - **Conference members**: add-idempotent membership with focus tracking
//!
//! # Quick Start
//!
//! ```rust
//! use callkit_telephony::prelude::*;
//!
//! let call = Call::new("alice@example.org");
//! let peer = CallPeer::new(&call, "bob@example.org", "Bob");
//! call.add_peer(peer.clone()).unwrap();
//!
//! peer.set_state(CallPeerState::Connected).unwrap();
//! assert_eq!(call.state(), CallState::InProgress);
//!
//! peer.set_state(CallPeerState::Disconnected).unwrap();
//! assert_eq!(call.state(), CallState::Ended);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Call ──owns──► CallPeer ──owns──► ConferenceMember
//!  ▲                │
//!  └──(weak) PeerWatch ◄── peer_state_changed
//! ```

pub mod call;
pub mod channel;
pub mod conference;
pub mod error;
pub mod event;
pub mod listener;
pub mod logging;
pub mod model;
pub mod peer;

pub use call::Call;
pub use channel::{TelephonyEvent, TelephonyEventChannel};
pub use conference::ConferenceMember;
pub use error::{CallError, Result};
pub use event::{
    CallChangeEvent, CallPeerChangeEvent, CallPeerConferenceEvent, CallPeerEvent,
    CallPeerEventKind, ConferenceEventKind, ConferenceMemberChangeEvent, MemberChange, PeerChange,
};
pub use listener::{
    CallChangeListener, CallPeerConferenceListener, CallPeerListener, ConferenceMemberListener,
};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{CallId, CallPeerState, CallState, ConferenceMemberState, MemberId, PeerId};
pub use peer::CallPeer;

/// Prelude for common imports
pub mod prelude {
    pub use crate::call::Call;
    pub use crate::channel::{TelephonyEvent, TelephonyEventChannel};
    pub use crate::conference::ConferenceMember;
    pub use crate::error::CallError;
    pub use crate::listener::{
        CallChangeListener, CallPeerConferenceListener, CallPeerListener,
        ConferenceMemberListener,
    };
    pub use crate::model::{CallPeerState, CallState, ConferenceMemberState};
    pub use crate::peer::CallPeer;
}
