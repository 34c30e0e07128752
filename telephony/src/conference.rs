//! Conference members reported by a focus peer

use std::fmt;
use std::sync::{Arc, Weak};

use event_dispatch::ListenerRegistry;
use parking_lot::RwLock;

use crate::event::{ConferenceMemberChangeEvent, MemberChange};
use crate::listener::ConferenceMemberListener;
use crate::model::{ConferenceMemberState, MemberId, PeerId};
use crate::peer::CallPeer;

/// A participant mixed into a conference by a focus peer
pub struct ConferenceMember {
    id: MemberId,
    peer: Weak<CallPeer>,
    peer_id: PeerId,
    address: String,
    display_name: RwLock<String>,
    state: RwLock<ConferenceMemberState>,
    listeners: ListenerRegistry<dyn ConferenceMemberListener>,
}

impl ConferenceMember {
    pub fn new(peer: &Arc<CallPeer>, address: impl Into<String>, display_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: MemberId::generate(),
            peer: Arc::downgrade(peer),
            peer_id: peer.id().clone(),
            address: address.into(),
            display_name: RwLock::new(display_name.into()),
            state: RwLock::new(ConferenceMemberState::Unknown),
            listeners: ListenerRegistry::new("conference-member"),
        })
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// The focus peer that reports this member, unless it has been dropped
    pub fn peer(&self) -> Option<Arc<CallPeer>> {
        self.peer.upgrade()
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub(crate) fn reported_by(&self, peer: &Arc<CallPeer>) -> bool {
        std::ptr::eq(self.peer.as_ptr(), Arc::as_ptr(peer))
    }

    pub fn address(&self) -> String {
        self.address.clone()
    }

    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    pub fn state(&self) -> ConferenceMemberState {
        *self.state.read()
    }

    pub fn set_state(self: &Arc<Self>, new: ConferenceMemberState) {
        let old = {
            let mut state = self.state.write();
            if *state == new {
                return;
            }
            std::mem::replace(&mut *state, new)
        };
        self.fire(MemberChange::State { old, new });
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
        self.fire(MemberChange::DisplayName { old, new });
    }

    pub fn add_listener(&self, listener: Arc<dyn ConferenceMemberListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ConferenceMemberListener>) -> bool {
        self.listeners.remove(listener)
    }

    fn fire(self: &Arc<Self>, change: MemberChange) {
        let event = ConferenceMemberChangeEvent::new(Arc::clone(self), change);
        self.listeners.dispatch(|listener| match event.change() {
            MemberChange::State { .. } => listener.member_state_changed(&event),
            MemberChange::DisplayName { .. } => listener.member_display_name_changed(&event),
        });
    }
}

impl fmt::Debug for ConferenceMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConferenceMember")
            .field("id", &self.id)
            .field("peer", &self.peer_id)
            .field("address", &self.address)
            .field("state", &self.state())
            .finish()
    }
}
