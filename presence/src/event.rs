//! Presence and subscription events

use std::sync::Arc;

use crate::contact::{Contact, ContactGroup};
use crate::status::PresenceStatus;

fn same_group(a: &Option<Arc<ContactGroup>>, b: &Option<Arc<ContactGroup>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEventKind {
    Created,
    Resolved,
    Removed,
    Failed { code: i32, reason: String },
}

impl SubscriptionEventKind {
    /// Failure code when no more specific one is known
    pub const ERROR_UNSPECIFIED: i32 = -1;
}

/// A subscription was created, resolved, removed or failed
#[derive(Debug, Clone)]
pub struct SubscriptionEvent {
    contact: Arc<Contact>,
    parent: Arc<ContactGroup>,
    kind: SubscriptionEventKind,
}

impl SubscriptionEvent {
    pub fn new(contact: Arc<Contact>, parent: Arc<ContactGroup>, kind: SubscriptionEventKind) -> Self {
        Self {
            contact,
            parent,
            kind,
        }
    }

    pub fn contact(&self) -> &Arc<Contact> {
        &self.contact
    }

    /// The group the contact was in when the event fired
    pub fn parent(&self) -> &Arc<ContactGroup> {
        &self.parent
    }

    pub fn kind(&self) -> &SubscriptionEventKind {
        &self.kind
    }
}

impl PartialEq for SubscriptionEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.contact, &other.contact)
            && Arc::ptr_eq(&self.parent, &other.parent)
            && self.kind == other.kind
    }
}

/// A persistent contact changed groups
#[derive(Debug, Clone)]
pub struct SubscriptionMovedEvent {
    contact: Arc<Contact>,
    old_parent: Arc<ContactGroup>,
    new_parent: Arc<ContactGroup>,
}

impl SubscriptionMovedEvent {
    pub fn new(contact: Arc<Contact>, old_parent: Arc<ContactGroup>, new_parent: Arc<ContactGroup>) -> Self {
        Self {
            contact,
            old_parent,
            new_parent,
        }
    }

    pub fn contact(&self) -> &Arc<Contact> {
        &self.contact
    }

    pub fn old_parent(&self) -> &Arc<ContactGroup> {
        &self.old_parent
    }

    pub fn new_parent(&self) -> &Arc<ContactGroup> {
        &self.new_parent
    }
}

impl PartialEq for SubscriptionMovedEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.contact, &other.contact)
            && Arc::ptr_eq(&self.old_parent, &other.old_parent)
            && Arc::ptr_eq(&self.new_parent, &other.new_parent)
    }
}

// ============================================================================
// Presence status
// ============================================================================

/// A contact's presence status changed
#[derive(Debug, Clone)]
pub struct ContactPresenceStatusChangeEvent {
    contact: Arc<Contact>,
    parent: Option<Arc<ContactGroup>>,
    old_status: PresenceStatus,
    new_status: PresenceStatus,
}

impl ContactPresenceStatusChangeEvent {
    pub fn new(
        contact: Arc<Contact>,
        parent: Option<Arc<ContactGroup>>,
        old_status: PresenceStatus,
        new_status: PresenceStatus,
    ) -> Self {
        Self {
            contact,
            parent,
            old_status,
            new_status,
        }
    }

    pub fn contact(&self) -> &Arc<Contact> {
        &self.contact
    }

    pub fn parent(&self) -> Option<&Arc<ContactGroup>> {
        self.parent.as_ref()
    }

    pub fn old_status(&self) -> PresenceStatus {
        self.old_status
    }

    pub fn new_status(&self) -> PresenceStatus {
        self.new_status
    }
}

impl PartialEq for ContactPresenceStatusChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.contact, &other.contact)
            && same_group(&self.parent, &other.parent)
            && self.old_status == other.old_status
            && self.new_status == other.new_status
    }
}

/// The local user's published status changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPresenceStatusChangeEvent {
    pub user_id: String,
    pub old_status: PresenceStatus,
    pub new_status: PresenceStatus,
}

/// The local user's status message changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatusMessageChangeEvent {
    pub user_id: String,
    pub old_message: String,
    pub new_message: String,
}

// ============================================================================
// Server stored groups
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupEventKind {
    Created,
    Removed,
    Renamed,
    Resolved,
}

/// A group in the contact list was created, removed, renamed or resolved
#[derive(Debug, Clone)]
pub struct ServerStoredGroupEvent {
    group: Arc<ContactGroup>,
    parent: Option<Arc<ContactGroup>>,
    kind: GroupEventKind,
}

impl ServerStoredGroupEvent {
    pub fn new(group: Arc<ContactGroup>, parent: Option<Arc<ContactGroup>>, kind: GroupEventKind) -> Self {
        Self {
            group,
            parent,
            kind,
        }
    }

    pub fn group(&self) -> &Arc<ContactGroup> {
        &self.group
    }

    pub fn parent(&self) -> Option<&Arc<ContactGroup>> {
        self.parent.as_ref()
    }

    pub fn kind(&self) -> GroupEventKind {
        self.kind
    }
}

impl PartialEq for ServerStoredGroupEvent {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.group, &other.group)
            && same_group(&self.parent, &other.parent)
            && self.kind == other.kind
    }
}
