//! Simulated basic telephony
//!
//! Outgoing calls ring after `ring_delay` and are answered `answer_delay`
//! later. Incoming calls are created on demand and, with auto-answer, pick
//! themselves up after `answer_delay`. Every delayed step is scheduled and
//! only applies if the peer is still in the state it expects; a peer that was
//! hung up or otherwise moved on in the meantime is left alone.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use callkit_presence::RegistrationState;
use callkit_telephony::{
    Call, CallChangeEvent, CallChangeListener, CallPeer, CallPeerState, CallState, ConferenceMember,
    ConferenceMemberState,
};
use event_dispatch::ListenerRegistry;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{OperationFailedReason, ProviderError, Result};
use crate::scheduler::Scheduler;

/// Reason attached when the local side hangs up
pub const HANGUP_REASON: &str = "hung up locally";

// ============================================================================
// Call events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEventKind {
    IncomingCallReceived,
    OutgoingCallCreated,
    CallEnded,
}

/// A call appeared on, or left, the provider
#[derive(Debug, Clone)]
pub struct CallEvent {
    call: Arc<Call>,
    kind: CallEventKind,
}

impl CallEvent {
    pub fn new(call: Arc<Call>, kind: CallEventKind) -> Self {
        Self { call, kind }
    }

    pub fn call(&self) -> &Arc<Call> {
        &self.call
    }

    pub fn kind(&self) -> CallEventKind {
        self.kind
    }
}

impl PartialEq for CallEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call) && self.kind == other.kind
    }
}

pub trait CallListener: Send + Sync {
    fn incoming_call_received(&self, _event: &CallEvent) {}

    fn outgoing_call_created(&self, _event: &CallEvent) {}

    fn call_ended(&self, _event: &CallEvent) {}
}

// ============================================================================
// BasicTelephony
// ============================================================================

/// Timing and answering behavior taken from the provider configuration
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallTiming {
    pub ring_delay: Duration,
    pub answer_delay: Duration,
    pub auto_answer: bool,
}

/// Places and receives simulated calls for one account
pub struct BasicTelephony {
    account: String,
    timing: RwLock<CallTiming>,
    registration: Arc<RwLock<RegistrationState>>,
    scheduler: Arc<dyn Scheduler>,
    calls: RwLock<Vec<Arc<Call>>>,
    listeners: ListenerRegistry<dyn CallListener>,
    call_watch: Arc<dyn CallChangeListener>,
}

impl BasicTelephony {
    pub(crate) fn new(
        account: impl Into<String>,
        timing: CallTiming,
        registration: Arc<RwLock<RegistrationState>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Arc<Self> {
        let account = account.into();
        Arc::new_cyclic(|me: &Weak<BasicTelephony>| {
            let call_watch: Arc<dyn CallChangeListener> = Arc::new(CallWatch {
                telephony: me.clone(),
            });
            Self {
                account,
                timing: RwLock::new(timing),
                registration,
                scheduler,
                calls: RwLock::new(Vec::new()),
                listeners: ListenerRegistry::new("call"),
                call_watch,
            }
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Calls that have not ended yet
    pub fn active_calls(&self) -> Vec<Arc<Call>> {
        self.calls.read().clone()
    }

    pub fn is_auto_answer(&self) -> bool {
        self.timing.read().auto_answer
    }

    /// Change whether incoming calls answer themselves
    pub fn set_auto_answer(&self, auto_answer: bool) {
        self.timing.write().auto_answer = auto_answer;
    }

    // ========================================================================
    // Outgoing and incoming calls
    // ========================================================================

    /// Call `callee`; the remote side rings and then answers on its own
    pub fn create_call(&self, callee: &str) -> Result<Arc<Call>> {
        self.ensure_registered()?;
        let callee = callee.trim();
        if callee.is_empty() {
            return Err(ProviderError::operation_failed(
                OperationFailedReason::IllegalArgument,
                "callee address must not be empty",
            ));
        }

        let (call, peer) = self.open_call(callee)?;
        peer.set_state(CallPeerState::InitiatingCall)?;
        info!(account = %self.account, call = %call.id(), callee, "outgoing call created");
        self.fire(&call, CallEventKind::OutgoingCallCreated);

        let timing = *self.timing.read();
        let scheduler = Arc::clone(&self.scheduler);
        let target = Arc::downgrade(&peer);
        self.scheduler.schedule(
            timing.ring_delay,
            Box::new(move || {
                if advance_peer(&target, CallPeerState::InitiatingCall, CallPeerState::AlertingRemoteSide) {
                    scheduler.schedule(
                        timing.answer_delay,
                        Box::new(move || {
                            advance_peer(&target, CallPeerState::AlertingRemoteSide, CallPeerState::Connected);
                        }),
                    );
                }
            }),
        );

        Ok(call)
    }

    /// Pretend `caller` is calling us
    pub fn simulate_incoming_call(&self, caller: &str) -> Result<Arc<Call>> {
        self.ensure_registered()?;
        let caller = caller.trim();
        if caller.is_empty() {
            return Err(ProviderError::operation_failed(
                OperationFailedReason::IllegalArgument,
                "caller address must not be empty",
            ));
        }

        let timing = *self.timing.read();
        let (call, peer) = self.open_call(caller)?;
        call.set_auto_answer(timing.auto_answer);
        peer.set_state(CallPeerState::IncomingCall)?;
        info!(account = %self.account, call = %call.id(), caller, "incoming call received");
        self.fire(&call, CallEventKind::IncomingCallReceived);

        if timing.auto_answer {
            let target = Arc::downgrade(&peer);
            self.scheduler.schedule(
                timing.answer_delay,
                Box::new(move || {
                    advance_peer(&target, CallPeerState::IncomingCall, CallPeerState::Connected);
                }),
            );
        }

        Ok(call)
    }

    fn open_call(&self, address: &str) -> Result<(Arc<Call>, Arc<CallPeer>)> {
        let call = Call::new(self.account.clone());
        call.add_call_change_listener(Arc::clone(&self.call_watch));
        let peer = CallPeer::new(&call, address, address);
        call.add_peer(Arc::clone(&peer))?;
        self.calls.write().push(Arc::clone(&call));
        Ok((call, peer))
    }

    // ========================================================================
    // Peer control
    // ========================================================================

    pub fn answer_call_peer(&self, peer: &Arc<CallPeer>) -> Result<()> {
        debug!(peer = %peer.id(), "answering");
        peer.set_state(CallPeerState::Connected)?;
        Ok(())
    }

    /// Disconnect the peer; the call ends when its last peer leaves
    pub fn hangup_call_peer(&self, peer: &Arc<CallPeer>) -> Result<()> {
        debug!(peer = %peer.id(), "hanging up");
        peer.set_state_with_reason(CallPeerState::Disconnected, Some(HANGUP_REASON.to_string()), None)?;
        Ok(())
    }

    pub fn put_on_hold(&self, peer: &Arc<CallPeer>) -> Result<()> {
        peer.put_on_hold(true)?;
        Ok(())
    }

    pub fn put_off_hold(&self, peer: &Arc<CallPeer>) -> Result<()> {
        peer.put_on_hold(false)?;
        Ok(())
    }

    /// Pretend the remote side put us on hold, or released the hold
    pub fn simulate_remote_hold(&self, peer: &Arc<CallPeer>, on_hold: bool) -> Result<()> {
        peer.set_remotely_on_hold(on_hold)?;
        Ok(())
    }

    /// Pretend the peer started hosting a conference that `address` joined
    pub fn simulate_conference_member_joined(
        &self,
        peer: &Arc<CallPeer>,
        address: &str,
        display_name: &str,
    ) -> Result<Arc<ConferenceMember>> {
        if peer.state().is_terminal() {
            return Err(ProviderError::operation_failed(
                OperationFailedReason::IllegalArgument,
                format!("peer {} has already left the call", peer.id()),
            ));
        }

        peer.set_conference_focus(true);
        let member = ConferenceMember::new(peer, address, display_name);
        member.set_state(ConferenceMemberState::Connected);
        peer.add_conference_member(Arc::clone(&member))?;
        Ok(member)
    }

    /// The member left; the peer stops being a focus once nobody is left
    pub fn simulate_conference_member_left(&self, peer: &Arc<CallPeer>, member: &Arc<ConferenceMember>) -> bool {
        member.set_state(ConferenceMemberState::Disconnected);
        let removed = peer.remove_conference_member(member);
        if removed && peer.conference_member_count() == 0 {
            peer.set_conference_focus(false);
        }
        removed
    }

    /// Disconnect every peer of every active call
    pub fn hangup_all(&self, reason: &str) {
        for call in self.active_calls() {
            for peer in call.peers() {
                if let Err(e) =
                    peer.set_state_with_reason(CallPeerState::Disconnected, Some(reason.to_string()), None)
                {
                    debug!(peer = %peer.id(), error = %e, "peer already gone");
                }
            }
        }
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_call_listener(&self, listener: Arc<dyn CallListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_call_listener(&self, listener: &Arc<dyn CallListener>) -> bool {
        self.listeners.remove(listener)
    }

    fn fire(&self, call: &Arc<Call>, kind: CallEventKind) {
        let event = CallEvent::new(Arc::clone(call), kind);
        self.listeners.dispatch(|listener| match kind {
            CallEventKind::IncomingCallReceived => listener.incoming_call_received(&event),
            CallEventKind::OutgoingCallCreated => listener.outgoing_call_created(&event),
            CallEventKind::CallEnded => listener.call_ended(&event),
        });
    }

    fn ensure_registered(&self) -> Result<()> {
        let state = *self.registration.read();
        if state.is_registered() {
            Ok(())
        } else {
            Err(ProviderError::operation_failed(
                OperationFailedReason::NotRegistered,
                format!("{} is {}", self.account, state),
            ))
        }
    }

    fn on_call_ended(&self, call: &Arc<Call>) {
        let removed = {
            let mut calls = self.calls.write();
            let before = calls.len();
            calls.retain(|c| !Arc::ptr_eq(c, call));
            calls.len() != before
        };
        if removed {
            info!(account = %self.account, call = %call.id(), "call ended");
            call.remove_call_change_listener(&self.call_watch);
            self.fire(call, CallEventKind::CallEnded);
        }
    }
}

impl fmt::Debug for BasicTelephony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicTelephony")
            .field("account", &self.account)
            .field("active_calls", &self.calls.read().len())
            .finish_non_exhaustive()
    }
}

/// Apply a scheduled transition if the peer is still where it was left
fn advance_peer(peer: &Weak<CallPeer>, expected: CallPeerState, next: CallPeerState) -> bool {
    let Some(peer) = peer.upgrade() else {
        debug!(to = %next, "peer dropped before scheduled transition");
        return false;
    };

    let current = peer.state();
    if current != expected {
        debug!(peer = %peer.id(), %current, %expected, to = %next, "dropping stale scheduled transition");
        return false;
    }

    match peer.set_state(next) {
        Ok(()) => true,
        Err(e) => {
            debug!(peer = %peer.id(), error = %e, "scheduled transition rejected");
            false
        }
    }
}

struct CallWatch {
    telephony: Weak<BasicTelephony>,
}

impl CallChangeListener for CallWatch {
    fn call_state_changed(&self, event: &CallChangeEvent) {
        if event.new_state() != CallState::Ended {
            return;
        }
        if let Some(telephony) = self.telephony.upgrade() {
            telephony.on_call_ended(event.call());
        }
    }
}
