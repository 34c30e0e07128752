//! Listener traits for telephony events
//!
//! Every method has an empty default body, so implementors only override the
//! notifications they care about. Listeners are invoked synchronously on the
//! thread that caused the change and must not assume any particular thread.

use crate::event::{
    CallChangeEvent, CallPeerChangeEvent, CallPeerConferenceEvent, CallPeerEvent,
    ConferenceMemberChangeEvent,
};

/// Observes peers joining and leaving a call and call state changes
pub trait CallChangeListener: Send + Sync {
    fn call_peer_added(&self, _event: &CallPeerEvent) {}

    fn call_peer_removed(&self, _event: &CallPeerEvent) {}

    fn call_state_changed(&self, _event: &CallChangeEvent) {}
}

/// Observes property changes on a single call peer
pub trait CallPeerListener: Send + Sync {
    fn peer_state_changed(&self, _event: &CallPeerChangeEvent) {}

    fn peer_address_changed(&self, _event: &CallPeerChangeEvent) {}

    fn peer_display_name_changed(&self, _event: &CallPeerChangeEvent) {}
}

/// Observes conference focus and membership changes reported by a peer
pub trait CallPeerConferenceListener: Send + Sync {
    fn conference_focus_changed(&self, _event: &CallPeerConferenceEvent) {}

    fn conference_member_added(&self, _event: &CallPeerConferenceEvent) {}

    fn conference_member_removed(&self, _event: &CallPeerConferenceEvent) {}

    fn conference_member_error_received(&self, _event: &CallPeerConferenceEvent) {}
}

/// Observes a single conference member
pub trait ConferenceMemberListener: Send + Sync {
    fn member_state_changed(&self, _event: &ConferenceMemberChangeEvent) {}

    fn member_display_name_changed(&self, _event: &ConferenceMemberChangeEvent) {}
}
