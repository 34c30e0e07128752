//! Event values delivered to telephony listeners
//!
//! Every event holds an `Arc` to its source so a listener can inspect or act
//! on the call, peer or member that changed. Equality compares sources by
//! identity and the remaining fields by value.

use std::sync::Arc;

use crate::call::Call;
use crate::conference::ConferenceMember;
use crate::model::{CallPeerState, CallState, ConferenceMemberState};
use crate::peer::CallPeer;

// ============================================================================
// Call peer property changes
// ============================================================================

/// What changed on a call peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerChange {
    State { old: CallPeerState, new: CallPeerState },
    Address { old: String, new: String },
    DisplayName { old: String, new: String },
}

/// A property of a call peer changed
#[derive(Debug, Clone)]
pub struct CallPeerChangeEvent {
    peer: Arc<CallPeer>,
    change: PeerChange,
    reason: Option<String>,
    reason_code: Option<i32>,
}

impl CallPeerChangeEvent {
    pub fn new(
        peer: Arc<CallPeer>,
        change: PeerChange,
        reason: Option<String>,
        reason_code: Option<i32>,
    ) -> Self {
        Self {
            peer,
            change,
            reason,
            reason_code,
        }
    }

    pub fn peer(&self) -> &Arc<CallPeer> {
        &self.peer
    }

    pub fn change(&self) -> &PeerChange {
        &self.change
    }

    /// Human readable explanation, typically for `Failed` or `Disconnected`
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Protocol specific reason code
    pub fn reason_code(&self) -> Option<i32> {
        self.reason_code
    }

    /// The new state, if this is a state change
    pub fn new_state(&self) -> Option<CallPeerState> {
        match self.change {
            PeerChange::State { new, .. } => Some(new),
            _ => None,
        }
    }
}

impl PartialEq for CallPeerChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.peer, &other.peer)
            && self.change == other.change
            && self.reason == other.reason
            && self.reason_code == other.reason_code
    }
}

// ============================================================================
// Call membership and call state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPeerEventKind {
    PeerAdded,
    PeerRemoved,
}

/// A peer joined or left a call
#[derive(Debug, Clone)]
pub struct CallPeerEvent {
    peer: Arc<CallPeer>,
    call: Arc<Call>,
    kind: CallPeerEventKind,
    delayed: bool,
}

impl CallPeerEvent {
    pub fn new(peer: Arc<CallPeer>, call: Arc<Call>, kind: CallPeerEventKind, delayed: bool) -> Self {
        Self {
            peer,
            call,
            kind,
            delayed,
        }
    }

    pub fn peer(&self) -> &Arc<CallPeer> {
        &self.peer
    }

    pub fn call(&self) -> &Arc<Call> {
        &self.call
    }

    pub fn kind(&self) -> CallPeerEventKind {
        self.kind
    }

    /// Whether the event was held back and delivered after the fact
    pub fn is_delayed(&self) -> bool {
        self.delayed
    }
}

impl PartialEq for CallPeerEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.peer, &other.peer)
            && Arc::ptr_eq(&self.call, &other.call)
            && self.kind == other.kind
            && self.delayed == other.delayed
    }
}

/// A call moved to a new lifecycle state
#[derive(Debug, Clone)]
pub struct CallChangeEvent {
    call: Arc<Call>,
    old_state: CallState,
    new_state: CallState,
    cause: Option<CallPeerChangeEvent>,
}

impl CallChangeEvent {
    pub fn new(
        call: Arc<Call>,
        old_state: CallState,
        new_state: CallState,
        cause: Option<CallPeerChangeEvent>,
    ) -> Self {
        Self {
            call,
            old_state,
            new_state,
            cause,
        }
    }

    pub fn call(&self) -> &Arc<Call> {
        &self.call
    }

    pub fn old_state(&self) -> CallState {
        self.old_state
    }

    pub fn new_state(&self) -> CallState {
        self.new_state
    }

    /// The peer change that triggered this call change, if any
    pub fn cause(&self) -> Option<&CallPeerChangeEvent> {
        self.cause.as_ref()
    }
}

impl PartialEq for CallChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
            && self.old_state == other.old_state
            && self.new_state == other.new_state
            && self.cause == other.cause
    }
}

// ============================================================================
// Conferences
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConferenceEventKind {
    FocusChanged,
    MemberAdded,
    MemberRemoved,
    MemberErrorReceived,
}

/// Conference-related change reported through a call peer
#[derive(Debug, Clone)]
pub struct CallPeerConferenceEvent {
    peer: Arc<CallPeer>,
    kind: ConferenceEventKind,
    member: Option<Arc<ConferenceMember>>,
    error_message: Option<String>,
}

impl CallPeerConferenceEvent {
    pub fn new(
        peer: Arc<CallPeer>,
        kind: ConferenceEventKind,
        member: Option<Arc<ConferenceMember>>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            peer,
            kind,
            member,
            error_message,
        }
    }

    pub fn peer(&self) -> &Arc<CallPeer> {
        &self.peer
    }

    pub fn kind(&self) -> ConferenceEventKind {
        self.kind
    }

    pub fn member(&self) -> Option<&Arc<ConferenceMember>> {
        self.member.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl PartialEq for CallPeerConferenceEvent {
    fn eq(&self, other: &Self) -> bool {
        let same_member = match (&self.member, &other.member) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        Arc::ptr_eq(&self.peer, &other.peer)
            && self.kind == other.kind
            && same_member
            && self.error_message == other.error_message
    }
}

/// What changed on a conference member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChange {
    State {
        old: ConferenceMemberState,
        new: ConferenceMemberState,
    },
    DisplayName { old: String, new: String },
}

/// A property of a conference member changed
#[derive(Debug, Clone)]
pub struct ConferenceMemberChangeEvent {
    member: Arc<ConferenceMember>,
    change: MemberChange,
}

impl ConferenceMemberChangeEvent {
    pub fn new(member: Arc<ConferenceMember>, change: MemberChange) -> Self {
        Self { member, change }
    }

    pub fn member(&self) -> &Arc<ConferenceMember> {
        &self.member
    }

    pub fn change(&self) -> &MemberChange {
        &self.change
    }
}

impl PartialEq for ConferenceMemberChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.member, &other.member) && self.change == other.change
    }
}
