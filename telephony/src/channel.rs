//! Bridge from telephony listeners to a blocking event channel
//!
//! [`TelephonyEventChannel`] implements every telephony listener trait and
//! forwards each notification into a single ordered channel. Register the same
//! instance on calls, peers and members to observe the global order in which
//! events were fired.

use std::sync::Arc;
use std::time::Duration;

use event_dispatch::{EventChannel, EventIterator};
use tracing::trace;

use crate::event::{
    CallChangeEvent, CallPeerChangeEvent, CallPeerConferenceEvent, CallPeerEvent,
    ConferenceMemberChangeEvent,
};
use crate::listener::{
    CallChangeListener, CallPeerConferenceListener, CallPeerListener, ConferenceMemberListener,
};

/// Any telephony notification
#[derive(Debug, Clone, PartialEq)]
pub enum TelephonyEvent {
    PeerAdded(CallPeerEvent),
    PeerRemoved(CallPeerEvent),
    CallStateChanged(CallChangeEvent),
    PeerChanged(CallPeerChangeEvent),
    Conference(CallPeerConferenceEvent),
    MemberChanged(ConferenceMemberChangeEvent),
}

impl TelephonyEvent {
    /// Short name, handy in logs and assertions
    pub fn name(&self) -> &'static str {
        match self {
            TelephonyEvent::PeerAdded(_) => "peer-added",
            TelephonyEvent::PeerRemoved(_) => "peer-removed",
            TelephonyEvent::CallStateChanged(_) => "call-state-changed",
            TelephonyEvent::PeerChanged(_) => "peer-changed",
            TelephonyEvent::Conference(_) => "conference",
            TelephonyEvent::MemberChanged(_) => "member-changed",
        }
    }
}

/// Listener that queues every telephony notification
#[derive(Debug, Default)]
pub struct TelephonyEventChannel {
    channel: EventChannel<TelephonyEvent>,
}

impl TelephonyEventChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Blocking iterator over queued events
    pub fn iter(&self) -> EventIterator<TelephonyEvent> {
        self.channel.iter()
    }

    /// Take everything queued so far without blocking
    pub fn drain(&self) -> Vec<TelephonyEvent> {
        self.channel.drain()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<TelephonyEvent> {
        self.channel.iter().recv_timeout(timeout)
    }

    fn push(&self, event: TelephonyEvent) {
        trace!(event = event.name(), "queueing telephony event");
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.channel.send(event);
    }
}

impl CallChangeListener for TelephonyEventChannel {
    fn call_peer_added(&self, event: &CallPeerEvent) {
        self.push(TelephonyEvent::PeerAdded(event.clone()));
    }

    fn call_peer_removed(&self, event: &CallPeerEvent) {
        self.push(TelephonyEvent::PeerRemoved(event.clone()));
    }

    fn call_state_changed(&self, event: &CallChangeEvent) {
        self.push(TelephonyEvent::CallStateChanged(event.clone()));
    }
}

impl CallPeerListener for TelephonyEventChannel {
    fn peer_state_changed(&self, event: &CallPeerChangeEvent) {
        self.push(TelephonyEvent::PeerChanged(event.clone()));
    }

    fn peer_address_changed(&self, event: &CallPeerChangeEvent) {
        self.push(TelephonyEvent::PeerChanged(event.clone()));
    }

    fn peer_display_name_changed(&self, event: &CallPeerChangeEvent) {
        self.push(TelephonyEvent::PeerChanged(event.clone()));
    }
}

impl CallPeerConferenceListener for TelephonyEventChannel {
    fn conference_focus_changed(&self, event: &CallPeerConferenceEvent) {
        self.push(TelephonyEvent::Conference(event.clone()));
    }

    fn conference_member_added(&self, event: &CallPeerConferenceEvent) {
        self.push(TelephonyEvent::Conference(event.clone()));
    }

    fn conference_member_removed(&self, event: &CallPeerConferenceEvent) {
        self.push(TelephonyEvent::Conference(event.clone()));
    }

    fn conference_member_error_received(&self, event: &CallPeerConferenceEvent) {
        self.push(TelephonyEvent::Conference(event.clone()));
    }
}

impl ConferenceMemberListener for TelephonyEventChannel {
    fn member_state_changed(&self, event: &ConferenceMemberChangeEvent) {
        self.push(TelephonyEvent::MemberChanged(event.clone()));
    }

    fn member_display_name_changed(&self, event: &ConferenceMemberChangeEvent) {
        self.push(TelephonyEvent::MemberChanged(event.clone()));
    }
}
