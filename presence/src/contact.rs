//! Contacts and contact groups
//!
//! The contact list is a rooted tree of [`ContactGroup`]s holding
//! [`Contact`]s. Parents are referenced weakly and children strongly, so
//! dropping the root drops the whole tree. Only [`PresenceEngine`] mutates
//! the tree; everything public here is read-only.
//!
//! [`PresenceEngine`]: crate::engine::PresenceEngine

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::status::PresenceStatus;

// ============================================================================
// Contact
// ============================================================================

/// An entry in a contact list
pub struct Contact {
    address: String,
    owner: String,
    display_name: RwLock<String>,
    status: RwLock<PresenceStatus>,
    persistent: RwLock<bool>,
    resolved: RwLock<bool>,
    persistent_data: RwLock<Option<String>>,
    parent: RwLock<Weak<ContactGroup>>,
}

impl Contact {
    pub(crate) fn new(address: impl Into<String>, owner: impl Into<String>, persistent: bool) -> Arc<Self> {
        let address = address.into();
        Arc::new(Self {
            display_name: RwLock::new(address.clone()),
            address,
            owner: owner.into(),
            status: RwLock::new(PresenceStatus::Offline),
            persistent: RwLock::new(persistent),
            resolved: RwLock::new(true),
            persistent_data: RwLock::new(None),
            parent: RwLock::new(Weak::new()),
        })
    }

    /// The protocol address, also used as the contact id
    pub fn address(&self) -> &str {
        &self.address
    }

    /// User id of the engine whose contact list holds this contact
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    pub fn presence_status(&self) -> PresenceStatus {
        *self.status.read()
    }

    /// Volatile contacts only live for the current process
    pub fn is_persistent(&self) -> bool {
        *self.persistent.read()
    }

    pub fn is_resolved(&self) -> bool {
        *self.resolved.read()
    }

    pub fn persistent_data(&self) -> Option<String> {
        self.persistent_data.read().clone()
    }

    pub fn parent(&self) -> Option<Arc<ContactGroup>> {
        self.parent.read().upgrade()
    }

    pub(crate) fn set_presence_status(&self, status: PresenceStatus) -> PresenceStatus {
        std::mem::replace(&mut *self.status.write(), status)
    }

    pub(crate) fn set_persistent(&self, persistent: bool) {
        *self.persistent.write() = persistent;
    }

    pub(crate) fn set_resolved(&self, resolved: bool) {
        *self.resolved.write() = resolved;
    }

    pub(crate) fn set_persistent_data(&self, data: Option<String>) {
        *self.persistent_data.write() = data;
    }

    pub(crate) fn set_parent(&self, parent: Option<&Arc<ContactGroup>>) {
        *self.parent.write() = parent.map(Arc::downgrade).unwrap_or_default();
    }
}

impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("status", &self.presence_status())
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

// ============================================================================
// ContactGroup
// ============================================================================

const UID_SUFFIX: &str = ".uid";

/// A named group of contacts and subgroups
pub struct ContactGroup {
    uid: String,
    name: RwLock<String>,
    persistent: bool,
    resolved: RwLock<bool>,
    persistent_data: RwLock<Option<String>>,
    parent: RwLock<Weak<ContactGroup>>,
    contacts: RwLock<Vec<Arc<Contact>>>,
    subgroups: RwLock<Vec<Arc<ContactGroup>>>,
}

impl ContactGroup {
    pub(crate) fn new(name: impl Into<String>, persistent: bool) -> Arc<Self> {
        let name = name.into();
        Self::with_uid(format!("{}-{}{}", name, Uuid::new_v4(), UID_SUFFIX), name, persistent)
    }

    pub(crate) fn with_uid(uid: impl Into<String>, name: impl Into<String>, persistent: bool) -> Arc<Self> {
        Arc::new(Self {
            uid: uid.into(),
            name: RwLock::new(name.into()),
            persistent,
            resolved: RwLock::new(true),
            persistent_data: RwLock::new(None),
            parent: RwLock::new(Weak::new()),
            contacts: RwLock::new(Vec::new()),
            subgroups: RwLock::new(Vec::new()),
        })
    }

    /// Derive a display name from a stored group uid
    pub fn name_from_uid(uid: &str) -> &str {
        uid.strip_suffix(UID_SUFFIX).unwrap_or(uid)
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_resolved(&self) -> bool {
        *self.resolved.read()
    }

    pub fn persistent_data(&self) -> Option<String> {
        self.persistent_data.read().clone()
    }

    /// `None` for the root
    pub fn parent(&self) -> Option<Arc<ContactGroup>> {
        self.parent.read().upgrade()
    }

    pub fn contacts(&self) -> Vec<Arc<Contact>> {
        self.contacts.read().clone()
    }

    pub fn subgroups(&self) -> Vec<Arc<ContactGroup>> {
        self.subgroups.read().clone()
    }

    pub fn count_contacts(&self) -> usize {
        self.contacts.read().len()
    }

    pub fn count_subgroups(&self) -> usize {
        self.subgroups.read().len()
    }

    /// Direct child contact with this address
    pub fn contact(&self, address: &str) -> Option<Arc<Contact>> {
        self.contacts
            .read()
            .iter()
            .find(|c| c.address() == address)
            .cloned()
    }

    /// Direct subgroup with this name
    pub fn subgroup(&self, name: &str) -> Option<Arc<ContactGroup>> {
        self.subgroups
            .read()
            .iter()
            .find(|g| *g.name.read() == name)
            .cloned()
    }

    /// Search this group and every group below it
    pub fn find_contact(&self, address: &str) -> Option<Arc<Contact>> {
        if let Some(contact) = self.contact(address) {
            return Some(contact);
        }
        self.subgroups()
            .iter()
            .find_map(|group| group.find_contact(address))
    }

    /// Every contact in this subtree, depth first
    pub fn all_contacts(&self) -> Vec<Arc<Contact>> {
        let mut out = self.contacts();
        for group in self.subgroups() {
            out.extend(group.all_contacts());
        }
        out
    }

    /// Whether `group` is this group or lies below it
    pub fn contains_group(self: &Arc<Self>, group: &Arc<ContactGroup>) -> bool {
        if Arc::ptr_eq(self, group) {
            return true;
        }
        self.subgroups().iter().any(|g| g.contains_group(group))
    }

    /// Walk parent links to the top of the tree
    pub fn root(self: &Arc<Self>) -> Arc<ContactGroup> {
        let mut current = Arc::clone(self);
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub(crate) fn set_name(&self, name: impl Into<String>) -> String {
        std::mem::replace(&mut *self.name.write(), name.into())
    }

    pub(crate) fn set_resolved(&self, resolved: bool) {
        *self.resolved.write() = resolved;
    }

    pub(crate) fn set_persistent_data(&self, data: Option<String>) {
        *self.persistent_data.write() = data;
    }

    pub(crate) fn add_contact(self: &Arc<Self>, contact: &Arc<Contact>) {
        let mut contacts = self.contacts.write();
        if !contacts.iter().any(|c| Arc::ptr_eq(c, contact)) {
            contacts.push(Arc::clone(contact));
        }
        contact.set_parent(Some(self));
    }

    pub(crate) fn remove_contact(&self, contact: &Arc<Contact>) -> bool {
        let mut contacts = self.contacts.write();
        let before = contacts.len();
        contacts.retain(|c| !Arc::ptr_eq(c, contact));
        let removed = contacts.len() != before;
        if removed {
            contact.set_parent(None);
        }
        removed
    }

    pub(crate) fn add_subgroup(self: &Arc<Self>, group: &Arc<ContactGroup>) {
        let mut subgroups = self.subgroups.write();
        if !subgroups.iter().any(|g| Arc::ptr_eq(g, group)) {
            subgroups.push(Arc::clone(group));
        }
        *group.parent.write() = Arc::downgrade(self);
    }

    pub(crate) fn remove_subgroup(&self, group: &Arc<ContactGroup>) -> bool {
        let mut subgroups = self.subgroups.write();
        let before = subgroups.len();
        subgroups.retain(|g| !Arc::ptr_eq(g, group));
        let removed = subgroups.len() != before;
        if removed {
            *group.parent.write() = Weak::new();
        }
        removed
    }
}

impl fmt::Debug for ContactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactGroup")
            .field("name", &*self.name.read())
            .field("contacts", &self.count_contacts())
            .field("subgroups", &self.count_subgroups())
            .field("persistent", &self.persistent)
            .finish()
    }
}
