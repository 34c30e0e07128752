//! Call peers: the remote parties of a call
//!
//! A peer owns its state machine, hold flags and conference membership, and
//! fans out change notifications to its registered listeners. A peer knows its
//! call only weakly; the call owns the peer.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use event_dispatch::ListenerRegistry;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::call::Call;
use crate::conference::ConferenceMember;
use crate::error::{CallError, Result};
use crate::event::{CallPeerChangeEvent, CallPeerConferenceEvent, ConferenceEventKind, PeerChange};
use crate::listener::{CallPeerConferenceListener, CallPeerListener};
use crate::model::{CallId, CallPeerState, PeerId};

#[derive(Debug, Default)]
struct PeerStatus {
    state: CallPeerState,
    locally_on_hold: bool,
    remotely_on_hold: bool,
    mute: bool,
    conference_focus: bool,
    call_duration_start: Option<SystemTime>,
}

/// A remote party in a call
pub struct CallPeer {
    id: PeerId,
    call: Weak<Call>,
    call_id: CallId,
    address: RwLock<String>,
    display_name: RwLock<String>,
    contact: RwLock<Option<String>>,
    status: Mutex<PeerStatus>,
    members: RwLock<Vec<Arc<ConferenceMember>>>,
    peer_listeners: ListenerRegistry<dyn CallPeerListener>,
    conference_listeners: ListenerRegistry<dyn CallPeerConferenceListener>,
}

impl CallPeer {
    /// Create a peer in state `Unknown` belonging to `call`
    ///
    /// The peer is not added to the call; use [`Call::add_peer`].
    pub fn new(call: &Arc<Call>, address: impl Into<String>, display_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: PeerId::generate(),
            call: Arc::downgrade(call),
            call_id: call.id().clone(),
            address: RwLock::new(address.into()),
            display_name: RwLock::new(display_name.into()),
            contact: RwLock::new(None),
            status: Mutex::new(PeerStatus::default()),
            members: RwLock::new(Vec::new()),
            peer_listeners: ListenerRegistry::new("call-peer"),
            conference_listeners: ListenerRegistry::new("call-peer-conference"),
        })
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// The owning call, unless it has been dropped
    pub fn call(&self) -> Option<Arc<Call>> {
        self.call.upgrade()
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    pub(crate) fn belongs_to(&self, call: &Arc<Call>) -> bool {
        std::ptr::eq(self.call.as_ptr(), Arc::as_ptr(call))
    }

    pub fn address(&self) -> String {
        self.address.read().clone()
    }

    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    /// Opaque identifier of the presence contact behind this peer, if known
    pub fn contact(&self) -> Option<String> {
        self.contact.read().clone()
    }

    pub fn set_contact(&self, contact: Option<String>) {
        *self.contact.write() = contact;
    }

    pub fn state(&self) -> CallPeerState {
        self.status.lock().state
    }

    pub fn is_locally_on_hold(&self) -> bool {
        self.status.lock().locally_on_hold
    }

    pub fn is_remotely_on_hold(&self) -> bool {
        self.status.lock().remotely_on_hold
    }

    pub fn is_mute(&self) -> bool {
        self.status.lock().mute
    }

    pub fn set_mute(&self, mute: bool) {
        self.status.lock().mute = mute;
    }

    /// When the peer first became `Connected`, if it has
    pub fn call_duration_start(&self) -> Option<SystemTime> {
        self.status.lock().call_duration_start
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Move to `new_state` with no reason attached
    pub fn set_state(self: &Arc<Self>, new_state: CallPeerState) -> Result<()> {
        self.set_state_with_reason(new_state, None, None)
    }

    /// Move to `new_state`, notifying peer listeners if the state changed
    ///
    /// Setting the current state is a no-op. A peer in a terminal state
    /// rejects every other state.
    pub fn set_state_with_reason(
        self: &Arc<Self>,
        new_state: CallPeerState,
        reason: Option<String>,
        reason_code: Option<i32>,
    ) -> Result<()> {
        let old_state = {
            let mut status = self.status.lock();
            let old_state = status.state;
            if old_state == new_state {
                return Ok(());
            }
            if old_state.is_terminal() {
                return Err(CallError::PeerTerminated {
                    peer: self.id.clone(),
                    state: old_state,
                });
            }
            Self::apply_state(&mut status, new_state);
            old_state
        };

        debug!(peer = %self.id, from = %old_state, to = %new_state, "call peer state changed");
        self.fire_peer_change(
            PeerChange::State {
                old: old_state,
                new: new_state,
            },
            reason,
            reason_code,
        );
        Ok(())
    }

    fn apply_state(status: &mut PeerStatus, new_state: CallPeerState) {
        let old_state = status.state;
        status.state = new_state;
        if new_state == CallPeerState::Connected && !old_state.is_on_hold() {
            status.call_duration_start = Some(SystemTime::now());
        }
    }

    /// Put the peer on hold locally, or release the local hold
    pub fn put_on_hold(self: &Arc<Self>, on_hold: bool) -> Result<()> {
        self.update_hold(|status| {
            status.locally_on_hold = on_hold;
            status.state.with_local_hold(on_hold)
        })
    }

    /// Record that the remote side put us on hold, or released it
    pub fn set_remotely_on_hold(self: &Arc<Self>, on_hold: bool) -> Result<()> {
        self.update_hold(|status| {
            status.remotely_on_hold = on_hold;
            status.state.with_remote_hold(on_hold)
        })
    }

    fn update_hold<F>(self: &Arc<Self>, reevaluate: F) -> Result<()>
    where
        F: FnOnce(&mut PeerStatus) -> CallPeerState,
    {
        let transition = {
            let mut status = self.status.lock();
            let old_state = status.state;
            if old_state.is_terminal() {
                return Err(CallError::PeerTerminated {
                    peer: self.id.clone(),
                    state: old_state,
                });
            }
            let new_state = reevaluate(&mut status);
            if new_state == old_state {
                None
            } else {
                Self::apply_state(&mut status, new_state);
                Some((old_state, new_state))
            }
        };

        if let Some((old, new)) = transition {
            debug!(peer = %self.id, from = %old, to = %new, "hold re-evaluated");
            self.fire_peer_change(PeerChange::State { old, new }, None, None);
        }
        Ok(())
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn set_address(self: &Arc<Self>, address: impl Into<String>) {
        let new = address.into();
        let old = {
            let mut current = self.address.write();
            if *current == new {
                return;
            }
            std::mem::replace(&mut *current, new.clone())
        };
        self.fire_peer_change(PeerChange::Address { old, new }, None, None);
    }

    pub fn set_display_name(self: &Arc<Self>, display_name: impl Into<String>) {
        let new = display_name.into();
        let old = {
            let mut current = self.display_name.write();
            if *current == new {
                return;
            }
            std::mem::replace(&mut *current, new.clone())
        };
        self.fire_peer_change(PeerChange::DisplayName { old, new }, None, None);
    }

    // ========================================================================
    // Conference
    // ========================================================================

    pub fn is_conference_focus(&self) -> bool {
        self.status.lock().conference_focus
    }

    /// Mark whether this peer mixes a conference for us
    pub fn set_conference_focus(self: &Arc<Self>, focus: bool) {
        {
            let mut status = self.status.lock();
            if status.conference_focus == focus {
                return;
            }
            status.conference_focus = focus;
        }
        self.fire_conference_event(ConferenceEventKind::FocusChanged, None, None);
    }

    pub fn conference_members(&self) -> Vec<Arc<ConferenceMember>> {
        self.members.read().clone()
    }

    pub fn conference_member_count(&self) -> usize {
        self.members.read().len()
    }

    /// Add a member reported by this peer
    ///
    /// Returns `Ok(false)` when the member is already present.
    pub fn add_conference_member(self: &Arc<Self>, member: Arc<ConferenceMember>) -> Result<bool> {
        if !member.reported_by(self) {
            return Err(CallError::ForeignMember {
                member: member.address(),
                peer: self.id.clone(),
            });
        }
        {
            let mut members = self.members.write();
            if members.iter().any(|m| Arc::ptr_eq(m, &member)) {
                return Ok(false);
            }
            members.push(Arc::clone(&member));
        }
        self.fire_conference_event(ConferenceEventKind::MemberAdded, Some(member), None);
        Ok(true)
    }

    /// Remove a member; absent members are ignored
    pub fn remove_conference_member(self: &Arc<Self>, member: &Arc<ConferenceMember>) -> bool {
        {
            let mut members = self.members.write();
            let before = members.len();
            members.retain(|m| !Arc::ptr_eq(m, member));
            if members.len() == before {
                return false;
            }
        }
        self.fire_conference_event(
            ConferenceEventKind::MemberRemoved,
            Some(Arc::clone(member)),
            None,
        );
        true
    }

    /// Report a conference error to conference listeners
    ///
    /// An empty message is dropped with a warning.
    pub fn fire_conference_member_error(self: &Arc<Self>, message: impl Into<String>) {
        let message = message.into();
        if message.is_empty() {
            warn!(peer = %self.id, "dropping conference member error with empty message");
            return;
        }
        self.fire_conference_event(ConferenceEventKind::MemberErrorReceived, None, Some(message));
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_call_peer_listener(&self, listener: Arc<dyn CallPeerListener>) -> bool {
        self.peer_listeners.add(listener)
    }

    pub fn remove_call_peer_listener(&self, listener: &Arc<dyn CallPeerListener>) -> bool {
        self.peer_listeners.remove(listener)
    }

    pub fn add_call_peer_conference_listener(&self, listener: Arc<dyn CallPeerConferenceListener>) -> bool {
        self.conference_listeners.add(listener)
    }

    pub fn remove_call_peer_conference_listener(&self, listener: &Arc<dyn CallPeerConferenceListener>) -> bool {
        self.conference_listeners.remove(listener)
    }

    fn fire_peer_change(self: &Arc<Self>, change: PeerChange, reason: Option<String>, reason_code: Option<i32>) {
        let event = CallPeerChangeEvent::new(Arc::clone(self), change, reason, reason_code);
        self.peer_listeners.dispatch(|listener| match event.change() {
            PeerChange::State { .. } => listener.peer_state_changed(&event),
            PeerChange::Address { .. } => listener.peer_address_changed(&event),
            PeerChange::DisplayName { .. } => listener.peer_display_name_changed(&event),
        });
    }

    fn fire_conference_event(
        self: &Arc<Self>,
        kind: ConferenceEventKind,
        member: Option<Arc<ConferenceMember>>,
        error_message: Option<String>,
    ) {
        let event = CallPeerConferenceEvent::new(Arc::clone(self), kind, member, error_message);
        self.conference_listeners.dispatch(|listener| match kind {
            ConferenceEventKind::FocusChanged => listener.conference_focus_changed(&event),
            ConferenceEventKind::MemberAdded => listener.conference_member_added(&event),
            ConferenceEventKind::MemberRemoved => listener.conference_member_removed(&event),
            ConferenceEventKind::MemberErrorReceived => {
                listener.conference_member_error_received(&event)
            }
        });
    }
}

impl fmt::Debug for CallPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPeer")
            .field("id", &self.id)
            .field("call", &self.call_id)
            .field("address", &*self.address.read())
            .field("state", &self.state())
            .finish()
    }
}
