//! Calls: a set of peers with a forward-only lifecycle
//!
//! A call watches every peer it contains. When a peer reaches `Connected`
//! while the call is still initializing, the call moves to `InProgress`. When
//! a peer reaches `Disconnected` or `Failed` it is removed, and removing the
//! last peer ends the call with the peer's change event as the cause.
//!
//! No internal lock is held while listeners run, so listeners may call back
//! into the call or its peers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use event_dispatch::ListenerRegistry;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{CallError, Result};
use crate::event::{CallChangeEvent, CallPeerChangeEvent, CallPeerEvent, CallPeerEventKind, PeerChange};
use crate::listener::{CallChangeListener, CallPeerListener};
use crate::model::{CallId, CallPeerState, CallState, PeerId};
use crate::peer::CallPeer;

/// A call between the local account and one or more peers
pub struct Call {
    id: CallId,
    account: String,
    state: Mutex<CallState>,
    peers: RwLock<Vec<Arc<CallPeer>>>,
    listeners: ListenerRegistry<dyn CallChangeListener>,
    peer_watch: Arc<dyn CallPeerListener>,
    conference_focus: AtomicBool,
    auto_answer: AtomicBool,
}

impl Call {
    /// Create a call in `Initialization` owned by `account`
    pub fn new(account: impl Into<String>) -> Arc<Self> {
        let account = account.into();
        Arc::new_cyclic(|me: &Weak<Call>| {
            let peer_watch: Arc<dyn CallPeerListener> = Arc::new(PeerWatch { call: me.clone() });
            Self {
                id: CallId::generate(),
                account,
                state: Mutex::new(CallState::Initialization),
                peers: RwLock::new(Vec::new()),
                listeners: ListenerRegistry::new("call"),
                peer_watch,
                conference_focus: AtomicBool::new(false),
                auto_answer: AtomicBool::new(false),
            }
        })
    }

    pub fn id(&self) -> &CallId {
        &self.id
    }

    /// The local account this call was placed or received on
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn state(&self) -> CallState {
        *self.state.lock()
    }

    pub fn peers(&self) -> Vec<Arc<CallPeer>> {
        self.peers.read().clone()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    pub fn find_peer(&self, id: &PeerId) -> Option<Arc<CallPeer>> {
        self.peers.read().iter().find(|p| p.id() == id).cloned()
    }

    /// More than one remote party is present
    pub fn is_conference(&self) -> bool {
        self.peer_count() > 1
    }

    /// Whether the local side hosts the conference
    ///
    /// True once more than one peer is present, or when set explicitly.
    pub fn is_conference_focus(&self) -> bool {
        self.conference_focus.load(Ordering::Acquire) || self.is_conference()
    }

    pub fn set_conference_focus(&self, focus: bool) {
        self.conference_focus.store(focus, Ordering::Release);
    }

    pub fn is_auto_answer(&self) -> bool {
        self.auto_answer.load(Ordering::Acquire)
    }

    /// Mark the call as one the local side answers without user action
    pub fn set_auto_answer(&self, auto_answer: bool) {
        self.auto_answer.store(auto_answer, Ordering::Release);
    }

    // ========================================================================
    // Peers
    // ========================================================================

    /// Add a peer created for this call and start watching it
    ///
    /// Returns `Ok(false)` when the peer is already part of the call.
    pub fn add_peer(self: &Arc<Self>, peer: Arc<CallPeer>) -> Result<bool> {
        if !peer.belongs_to(self) {
            return Err(CallError::ForeignPeer {
                peer: peer.id().clone(),
                call: self.id.clone(),
            });
        }
        {
            let state = self.state.lock();
            if state.is_terminal() {
                return Err(CallError::CallEnded(self.id.clone()));
            }
            let mut peers = self.peers.write();
            if peers.iter().any(|p| Arc::ptr_eq(p, &peer)) {
                return Ok(false);
            }
            peers.push(Arc::clone(&peer));
        }

        peer.add_call_peer_listener(Arc::clone(&self.peer_watch));
        debug!(call = %self.id, peer = %peer.id(), "peer added");
        self.fire_peer_event(peer, CallPeerEventKind::PeerAdded);
        Ok(true)
    }

    /// Remove a peer; absent peers are ignored
    ///
    /// Removing the last peer ends the call.
    pub fn remove_peer(self: &Arc<Self>, peer: &Arc<CallPeer>) -> bool {
        self.remove_peer_with_cause(peer, None)
    }

    fn remove_peer_with_cause(self: &Arc<Self>, peer: &Arc<CallPeer>, cause: Option<CallPeerChangeEvent>) -> bool {
        let now_empty = {
            let mut peers = self.peers.write();
            let before = peers.len();
            peers.retain(|p| !Arc::ptr_eq(p, peer));
            if peers.len() == before {
                return false;
            }
            peers.is_empty()
        };

        peer.remove_call_peer_listener(&self.peer_watch);
        debug!(call = %self.id, peer = %peer.id(), "peer removed");
        self.fire_peer_event(Arc::clone(peer), CallPeerEventKind::PeerRemoved);

        if now_empty {
            self.end_if_empty(cause);
        }
        true
    }

    /// End the call unless a peer joined while `PeerRemoved` was in flight
    ///
    /// Emptiness is re-checked under the state lock, which `add_peer` also
    /// holds while inserting, so a call never ends with a live peer.
    fn end_if_empty(self: &Arc<Self>, cause: Option<CallPeerChangeEvent>) {
        let old_state = {
            let mut state = self.state.lock();
            if state.is_terminal() {
                return;
            }
            if !self.peers.read().is_empty() {
                debug!(call = %self.id, "peer joined during removal, call stays up");
                return;
            }
            std::mem::replace(&mut *state, CallState::Ended)
        };

        info!(call = %self.id, from = %old_state, to = %CallState::Ended, "call state changed");
        let event = CallChangeEvent::new(Arc::clone(self), old_state, CallState::Ended, cause);
        self.listeners
            .dispatch(|listener| listener.call_state_changed(&event));
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Move the call forward to `new_state`
    ///
    /// Setting the current state is a no-op; moving backwards is an error.
    pub fn set_state(self: &Arc<Self>, new_state: CallState) -> Result<()> {
        self.set_state_with_cause(new_state, None)
    }

    fn set_state_with_cause(self: &Arc<Self>, new_state: CallState, cause: Option<CallPeerChangeEvent>) -> Result<()> {
        let old_state = {
            let mut state = self.state.lock();
            let old_state = *state;
            if old_state == new_state {
                return Ok(());
            }
            if !old_state.can_transition_to(new_state) {
                return Err(CallError::InvalidCallTransition {
                    call: self.id.clone(),
                    from: old_state,
                    to: new_state,
                });
            }
            *state = new_state;
            old_state
        };

        info!(call = %self.id, from = %old_state, to = %new_state, "call state changed");
        let event = CallChangeEvent::new(Arc::clone(self), old_state, new_state, cause);
        self.listeners
            .dispatch(|listener| listener.call_state_changed(&event));
        Ok(())
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_call_change_listener(&self, listener: Arc<dyn CallChangeListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_call_change_listener(&self, listener: &Arc<dyn CallChangeListener>) -> bool {
        self.listeners.remove(listener)
    }

    fn fire_peer_event(self: &Arc<Self>, peer: Arc<CallPeer>, kind: CallPeerEventKind) {
        let event = CallPeerEvent::new(peer, Arc::clone(self), kind, false);
        self.listeners.dispatch(|listener| match kind {
            CallPeerEventKind::PeerAdded => listener.call_peer_added(&event),
            CallPeerEventKind::PeerRemoved => listener.call_peer_removed(&event),
        });
    }

    fn on_peer_state_changed(self: &Arc<Self>, event: &CallPeerChangeEvent) {
        let Some(new_state) = event.new_state() else {
            return;
        };
        match new_state {
            CallPeerState::Disconnected | CallPeerState::Failed => {
                self.remove_peer_with_cause(event.peer(), Some(event.clone()));
            }
            CallPeerState::Connected if self.state() == CallState::Initialization => {
                if let Err(e) = self.set_state(CallState::InProgress) {
                    debug!(call = %self.id, error = %e, "call left initialization concurrently");
                }
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.id)
            .field("account", &self.account)
            .field("state", &self.state())
            .field("peers", &self.peer_count())
            .finish()
    }
}

/// Listener the call registers on each of its peers
struct PeerWatch {
    call: Weak<Call>,
}

impl CallPeerListener for PeerWatch {
    fn peer_state_changed(&self, event: &CallPeerChangeEvent) {
        if let (Some(call), PeerChange::State { .. }) = (self.call.upgrade(), event.change()) {
            call.on_peer_state_changed(event);
        }
    }
}
