//! The presence and subscription engine
//!
//! A `PresenceEngine` owns one user's contact list, publishes that user's
//! status and notifies listeners about every change to either. Structural
//! changes to the tree take the write side of one lock and lookups take the
//! read side, so a contact is always found in exactly one group. Listeners
//! run after the lock is released.
//!
//! Engines sharing a [`ProviderDirectory`] behave like accounts on the same
//! server: a contact whose address is another engine's user id mirrors that
//! engine's status, and authorization requests are routed to that engine's
//! handler.

use std::fmt;
use std::sync::Arc;

use event_dispatch::ListenerRegistry;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::authorization::{AuthorizationHandler, AuthorizationRequest, AuthorizationResponse};
use crate::contact::{Contact, ContactGroup};
use crate::directory::ProviderDirectory;
use crate::error::{PresenceError, Result};
use crate::event::{
    ContactPresenceStatusChangeEvent, GroupEventKind, ProviderPresenceStatusChangeEvent,
    ProviderStatusMessageChangeEvent, ServerStoredGroupEvent, SubscriptionEvent,
    SubscriptionEventKind, SubscriptionMovedEvent,
};
use crate::listener::{
    ContactPresenceStatusListener, ProviderPresenceStatusListener, ServerStoredGroupListener,
    SubscriptionListener,
};
use crate::registration::RegistrationState;
use crate::status::PresenceStatus;

/// Name of the root of every contact list
pub const ROOT_GROUP_NAME: &str = "RootGroup";

/// Name of the group that collects volatile contacts
pub const VOLATILE_GROUP_NAME: &str = "Not in contact list";

/// Published status and message, always updated together
struct OwnStatus {
    status: PresenceStatus,
    message: String,
}

pub struct PresenceEngine {
    user_id: String,
    directory: Arc<dyn ProviderDirectory>,
    root: Arc<ContactGroup>,
    tree_lock: RwLock<()>,
    own: RwLock<OwnStatus>,
    authorization_handler: RwLock<Option<Arc<dyn AuthorizationHandler>>>,
    subscription_listeners: ListenerRegistry<dyn SubscriptionListener>,
    contact_status_listeners: ListenerRegistry<dyn ContactPresenceStatusListener>,
    provider_status_listeners: ListenerRegistry<dyn ProviderPresenceStatusListener>,
    group_listeners: ListenerRegistry<dyn ServerStoredGroupListener>,
}

impl PresenceEngine {
    /// Create an engine for `user_id`, initially `Offline` with an empty list
    ///
    /// The engine does not add itself to `directory`.
    pub fn new(user_id: impl Into<String>, directory: Arc<dyn ProviderDirectory>) -> Arc<Self> {
        Arc::new(Self {
            user_id: user_id.into(),
            directory,
            root: ContactGroup::new(ROOT_GROUP_NAME, true),
            tree_lock: RwLock::new(()),
            own: RwLock::new(OwnStatus {
                status: PresenceStatus::Offline,
                message: String::new(),
            }),
            authorization_handler: RwLock::new(None),
            subscription_listeners: ListenerRegistry::new("subscription"),
            contact_status_listeners: ListenerRegistry::new("contact-presence"),
            provider_status_listeners: ListenerRegistry::new("provider-presence"),
            group_listeners: ListenerRegistry::new("server-stored-group"),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Root of the contact list
    pub fn root(&self) -> Arc<ContactGroup> {
        Arc::clone(&self.root)
    }

    /// The status last published by the local user
    pub fn presence_status(&self) -> PresenceStatus {
        self.own.read().status
    }

    pub fn current_status_message(&self) -> String {
        self.own.read().message.clone()
    }

    pub fn supported_statuses(&self) -> &'static [PresenceStatus] {
        &PresenceStatus::ALL
    }

    pub fn set_authorization_handler(&self, handler: Option<Arc<dyn AuthorizationHandler>>) {
        *self.authorization_handler.write() = handler;
    }

    pub fn find_contact_by_id(&self, contact_id: &str) -> Option<Arc<Contact>> {
        let _tree = self.tree_lock.read();
        self.root.find_contact(contact_id)
    }

    /// Current status of a contact in this list
    pub fn query_contact_status(&self, contact_id: &str) -> Result<PresenceStatus> {
        self.find_contact_by_id(contact_id)
            .map(|contact| contact.presence_status())
            .ok_or_else(|| PresenceError::UnknownContact(contact_id.to_string()))
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Subscribe to `contact_id` under the root group
    pub fn subscribe_to_root(&self, contact_id: &str) -> Result<Arc<Contact>> {
        let root = self.root();
        self.subscribe(&root, contact_id)
    }

    /// Add `contact_id` under `parent` and start following its presence
    ///
    /// Fires `Created` then `Resolved`, then a presence change from `Offline`
    /// to the contact's initial status when that differs.
    pub fn subscribe(&self, parent: &Arc<ContactGroup>, contact_id: &str) -> Result<Arc<Contact>> {
        self.ensure_owned_group(parent)?;
        if self.find_contact_by_id(contact_id).is_some() {
            return Err(PresenceError::SubscriptionAlreadyExists(contact_id.to_string()));
        }

        let contact = Contact::new(contact_id, &self.user_id, true);
        if let Err(err) = self.authorize(&contact) {
            let reason = match &err {
                PresenceError::AuthorizationRejected { reason: Some(reason), .. } => reason.clone(),
                _ => err.to_string(),
            };
            self.fire_subscription(
                &contact,
                parent,
                SubscriptionEventKind::Failed {
                    code: SubscriptionEventKind::ERROR_UNSPECIFIED,
                    reason,
                },
            );
            return Err(err);
        }

        {
            let _tree = self.tree_lock.write();
            if self.root.find_contact(contact_id).is_some() {
                return Err(PresenceError::SubscriptionAlreadyExists(contact_id.to_string()));
            }
            self.ensure_owned_group(parent)?;
            parent.add_contact(&contact);
        }

        info!(user_id = %self.user_id, contact = contact_id, group = %parent.name(), "subscribed");
        self.fire_subscription(&contact, parent, SubscriptionEventKind::Created);
        self.fire_subscription(&contact, parent, SubscriptionEventKind::Resolved);

        let status = match self.other_engine(contact_id) {
            Some(engine) => engine.presence_status(),
            None => self.presence_status(),
        };
        self.change_contact_status(&contact, status);
        Ok(contact)
    }

    /// Remove a contact from the list
    pub fn unsubscribe(&self, contact: &Arc<Contact>) -> Result<()> {
        let parent = {
            let _tree = self.tree_lock.write();
            let parent = self.owned_parent(contact)?;
            parent.remove_contact(contact);
            parent
        };

        info!(user_id = %self.user_id, contact = contact.address(), "unsubscribed");
        self.fire_subscription(contact, &parent, SubscriptionEventKind::Removed);
        Ok(())
    }

    /// Re-parent a contact in one step
    ///
    /// A persistent contact fires `Moved`. A volatile contact is treated as a
    /// new subscription: `Removed` from the old group, then `Created` in the
    /// new one, and it becomes persistent.
    pub fn move_contact_to_group(&self, contact: &Arc<Contact>, new_parent: &Arc<ContactGroup>) -> Result<()> {
        let (old_parent, was_persistent) = {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(new_parent)?;
            let old_parent = self.owned_parent(contact)?;
            if Arc::ptr_eq(&old_parent, new_parent) {
                return Ok(());
            }
            old_parent.remove_contact(contact);
            new_parent.add_contact(contact);
            let was_persistent = contact.is_persistent();
            contact.set_persistent(true);
            (old_parent, was_persistent)
        };

        debug!(
            contact = contact.address(),
            from = %old_parent.name(),
            to = %new_parent.name(),
            "contact moved"
        );
        if was_persistent {
            let event = SubscriptionMovedEvent::new(Arc::clone(contact), old_parent, Arc::clone(new_parent));
            self.subscription_listeners
                .dispatch(|listener| listener.subscription_moved(&event));
        } else {
            self.fire_subscription(contact, &old_parent, SubscriptionEventKind::Removed);
            self.fire_subscription(contact, new_parent, SubscriptionEventKind::Created);
        }
        Ok(())
    }

    /// Add a contact restored from storage; it resolves immediately
    pub fn create_unresolved_contact(
        &self,
        address: &str,
        persistent_data: Option<String>,
        parent: Option<&Arc<ContactGroup>>,
    ) -> Result<Arc<Contact>> {
        let parent = parent.cloned().unwrap_or_else(|| self.root());
        let contact = Contact::new(address, &self.user_id, true);
        contact.set_resolved(false);
        contact.set_persistent_data(persistent_data);

        {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(&parent)?;
            if self.root.find_contact(address).is_some() {
                return Err(PresenceError::SubscriptionAlreadyExists(address.to_string()));
            }
            parent.add_contact(&contact);
        }

        self.fire_subscription(&contact, &parent, SubscriptionEventKind::Created);
        contact.set_resolved(true);
        self.fire_subscription(&contact, &parent, SubscriptionEventKind::Resolved);
        self.change_contact_status(&contact, self.presence_status());
        Ok(contact)
    }

    /// Add a process-lifetime contact under the volatile group
    ///
    /// The volatile group is created on first use. An existing contact with
    /// the same address is returned unchanged.
    pub fn create_volatile_contact(&self, address: &str) -> Arc<Contact> {
        let (contact, group, group_created) = {
            let _tree = self.tree_lock.write();
            if let Some(existing) = self.root.find_contact(address) {
                return existing;
            }
            let (group, group_created) = match self.volatile_group() {
                Some(group) => (group, false),
                None => {
                    let group = ContactGroup::new(VOLATILE_GROUP_NAME, false);
                    group.set_resolved(false);
                    self.root.add_subgroup(&group);
                    (group, true)
                }
            };
            let contact = Contact::new(address, &self.user_id, false);
            group.add_contact(&contact);
            (contact, group, group_created)
        };

        if group_created {
            self.fire_group_event(&group, Some(self.root()), GroupEventKind::Created);
        }
        self.fire_subscription(&contact, &group, SubscriptionEventKind::Created);
        contact
    }

    fn volatile_group(&self) -> Option<Arc<ContactGroup>> {
        self.root
            .subgroups()
            .into_iter()
            .find(|group| !group.is_persistent())
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub fn create_server_stored_contact_group(
        &self,
        parent: &Arc<ContactGroup>,
        name: &str,
    ) -> Result<Arc<ContactGroup>> {
        let group = {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(parent)?;
            if parent.subgroup(name).is_some() {
                return Err(PresenceError::GroupAlreadyExists {
                    name: name.to_string(),
                    parent: parent.name(),
                });
            }
            let group = ContactGroup::new(name, true);
            parent.add_subgroup(&group);
            group
        };

        self.fire_group_event(&group, Some(Arc::clone(parent)), GroupEventKind::Created);
        Ok(group)
    }

    /// Remove a group together with everything below it
    pub fn remove_server_stored_contact_group(&self, group: &Arc<ContactGroup>) -> Result<()> {
        if Arc::ptr_eq(group, &self.root) {
            return Err(PresenceError::CannotRemoveRoot);
        }
        let parent = {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(group)?;
            let parent = group
                .parent()
                .ok_or_else(|| PresenceError::ForeignGroup(group.name()))?;
            parent.remove_subgroup(group);
            parent
        };

        self.fire_group_event(group, Some(parent), GroupEventKind::Removed);
        Ok(())
    }

    pub fn rename_server_stored_contact_group(&self, group: &Arc<ContactGroup>, new_name: &str) -> Result<()> {
        {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(group)?;
            if group.name() == new_name {
                return Ok(());
            }
            if let Some(parent) = group.parent() {
                if parent.subgroup(new_name).is_some() {
                    return Err(PresenceError::GroupAlreadyExists {
                        name: new_name.to_string(),
                        parent: parent.name(),
                    });
                }
            }
            group.set_name(new_name);
        }

        self.fire_group_event(group, group.parent(), GroupEventKind::Renamed);
        Ok(())
    }

    /// Add a group restored from storage; its name is derived from the uid
    pub fn create_unresolved_contact_group(
        &self,
        uid: &str,
        persistent_data: Option<String>,
        parent: Option<&Arc<ContactGroup>>,
    ) -> Result<Arc<ContactGroup>> {
        let parent = parent.cloned().unwrap_or_else(|| self.root());
        let group = ContactGroup::with_uid(uid, ContactGroup::name_from_uid(uid), true);
        group.set_resolved(false);
        group.set_persistent_data(persistent_data);

        {
            let _tree = self.tree_lock.write();
            self.ensure_owned_group(&parent)?;
            parent.add_subgroup(&group);
        }

        self.fire_group_event(&group, Some(parent), GroupEventKind::Created);
        Ok(group)
    }

    /// Mark an unresolved group as confirmed; a resolved group is left alone
    pub fn resolve_server_stored_contact_group(&self, group: &Arc<ContactGroup>) -> Result<()> {
        self.ensure_owned_group(group)?;
        if group.is_resolved() {
            return Ok(());
        }
        group.set_resolved(true);
        self.fire_group_event(group, group.parent(), GroupEventKind::Resolved);
        Ok(())
    }

    // ========================================================================
    // Own status
    // ========================================================================

    /// Publish the local user's status
    ///
    /// Every contact in this list that is not another engine takes the same
    /// status, then every contact in other engines that points at this user
    /// is updated.
    pub fn publish_presence_status(&self, status: PresenceStatus, message: impl Into<String>) {
        let message = message.into();
        let (old_status, old_message) = {
            let mut own = self.own.write();
            (
                std::mem::replace(&mut own.status, status),
                std::mem::replace(&mut own.message, message.clone()),
            )
        };

        info!(user_id = %self.user_id, from = %old_status, to = %status, "publishing presence status");
        if old_status != status {
            let event = ProviderPresenceStatusChangeEvent {
                user_id: self.user_id.clone(),
                old_status,
                new_status: status,
            };
            self.provider_status_listeners
                .dispatch(|listener| listener.provider_status_changed(&event));
        }
        if old_message != message {
            self.fire_status_message_change(old_message, message);
        }

        for contact in self.contacts_snapshot() {
            if self.other_engine(contact.address()).is_some() {
                continue;
            }
            self.change_contact_status(&contact, status);
        }

        for engine in self.directory.engines() {
            if std::ptr::eq(Arc::as_ptr(&engine), self) {
                continue;
            }
            if let Some(contact) = engine.find_contact_by_id(&self.user_id) {
                engine.change_contact_status(&contact, status);
            }
        }
    }

    /// Change the status message without touching the status
    pub fn set_status_message(&self, message: impl Into<String>) {
        let message = message.into();
        let old_message = std::mem::replace(&mut self.own.write().message, message.clone());
        if old_message != message {
            self.fire_status_message_change(old_message, message);
        }
    }

    /// React to the owning provider's registration state
    ///
    /// Once disconnected, every online contact goes `Offline`.
    pub fn handle_registration_state(&self, state: RegistrationState) {
        if !state.is_disconnected() {
            return;
        }
        debug!(user_id = %self.user_id, %state, "taking contacts offline");
        for contact in self.contacts_snapshot() {
            if contact.presence_status().is_online() {
                self.change_contact_status(&contact, PresenceStatus::Offline);
            }
        }
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    pub fn add_subscription_listener(&self, listener: Arc<dyn SubscriptionListener>) -> bool {
        self.subscription_listeners.add(listener)
    }

    pub fn remove_subscription_listener(&self, listener: &Arc<dyn SubscriptionListener>) -> bool {
        self.subscription_listeners.remove(listener)
    }

    pub fn add_contact_presence_status_listener(&self, listener: Arc<dyn ContactPresenceStatusListener>) -> bool {
        self.contact_status_listeners.add(listener)
    }

    pub fn remove_contact_presence_status_listener(
        &self,
        listener: &Arc<dyn ContactPresenceStatusListener>,
    ) -> bool {
        self.contact_status_listeners.remove(listener)
    }

    pub fn add_provider_presence_status_listener(&self, listener: Arc<dyn ProviderPresenceStatusListener>) -> bool {
        self.provider_status_listeners.add(listener)
    }

    pub fn remove_provider_presence_status_listener(
        &self,
        listener: &Arc<dyn ProviderPresenceStatusListener>,
    ) -> bool {
        self.provider_status_listeners.remove(listener)
    }

    pub fn add_server_stored_group_listener(&self, listener: Arc<dyn ServerStoredGroupListener>) -> bool {
        self.group_listeners.add(listener)
    }

    pub fn remove_server_stored_group_listener(&self, listener: &Arc<dyn ServerStoredGroupListener>) -> bool {
        self.group_listeners.remove(listener)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_owned_group(&self, group: &Arc<ContactGroup>) -> Result<()> {
        if Arc::ptr_eq(&group.root(), &self.root) {
            Ok(())
        } else {
            Err(PresenceError::ForeignGroup(group.name()))
        }
    }

    fn owned_parent(&self, contact: &Arc<Contact>) -> Result<Arc<ContactGroup>> {
        contact
            .parent()
            .filter(|parent| Arc::ptr_eq(&parent.root(), &self.root))
            .ok_or_else(|| PresenceError::UnknownContact(contact.address().to_string()))
    }

    /// Another live engine serving `user_id`
    fn other_engine(&self, user_id: &str) -> Option<Arc<PresenceEngine>> {
        self.directory
            .lookup(user_id)
            .filter(|engine| !std::ptr::eq(Arc::as_ptr(engine), self))
    }

    fn authorize(&self, contact: &Arc<Contact>) -> Result<()> {
        let Some(handler) = self.authorization_handler.read().clone() else {
            return Ok(());
        };

        let request = handler.create_authorization_request(contact);
        let response = match self.other_engine(contact.address()) {
            Some(target) => target.receive_authorization_request(&request, &self.user_id),
            None => {
                // Nobody to ask: play the remote side ourselves and accept.
                handler.process_authorization_request(&request, contact);
                AuthorizationResponse::accept()
            }
        };
        handler.process_authorization_response(&response, contact);

        if response.is_rejected() {
            info!(user_id = %self.user_id, contact = contact.address(), "subscription rejected");
            return Err(PresenceError::AuthorizationRejected {
                address: contact.address().to_string(),
                reason: response.reason,
            });
        }
        Ok(())
    }

    /// Decide on a request from `from_user_id` who wants to subscribe to us
    fn receive_authorization_request(&self, request: &AuthorizationRequest, from_user_id: &str) -> AuthorizationResponse {
        let Some(handler) = self.authorization_handler.read().clone() else {
            return AuthorizationResponse::accept();
        };
        let from = match self.find_contact_by_id(from_user_id) {
            Some(contact) => contact,
            None => self.create_volatile_contact(from_user_id),
        };
        handler.process_authorization_request(request, &from)
    }

    /// Set a contact's status, firing a change event if it differs
    fn contacts_snapshot(&self) -> Vec<Arc<Contact>> {
        let _tree = self.tree_lock.read();
        self.root.all_contacts()
    }

    fn change_contact_status(&self, contact: &Arc<Contact>, status: PresenceStatus) -> bool {
        let old_status = contact.set_presence_status(status);
        if old_status == status {
            return false;
        }
        debug!(contact = contact.address(), from = %old_status, to = %status, "contact status changed");
        let event = ContactPresenceStatusChangeEvent::new(Arc::clone(contact), contact.parent(), old_status, status);
        self.contact_status_listeners
            .dispatch(|listener| listener.contact_presence_status_changed(&event));
        true
    }

    fn fire_subscription(&self, contact: &Arc<Contact>, parent: &Arc<ContactGroup>, kind: SubscriptionEventKind) {
        let event = SubscriptionEvent::new(Arc::clone(contact), Arc::clone(parent), kind);
        self.subscription_listeners.dispatch(|listener| match event.kind() {
            SubscriptionEventKind::Created => listener.subscription_created(&event),
            SubscriptionEventKind::Resolved => listener.subscription_resolved(&event),
            SubscriptionEventKind::Removed => listener.subscription_removed(&event),
            SubscriptionEventKind::Failed { .. } => listener.subscription_failed(&event),
        });
    }

    fn fire_group_event(&self, group: &Arc<ContactGroup>, parent: Option<Arc<ContactGroup>>, kind: GroupEventKind) {
        let event = ServerStoredGroupEvent::new(Arc::clone(group), parent, kind);
        self.group_listeners.dispatch(|listener| match kind {
            GroupEventKind::Created => listener.group_created(&event),
            GroupEventKind::Removed => listener.group_removed(&event),
            GroupEventKind::Renamed => listener.group_name_changed(&event),
            GroupEventKind::Resolved => listener.group_resolved(&event),
        });
    }

    fn fire_status_message_change(&self, old_message: String, new_message: String) {
        let event = ProviderStatusMessageChangeEvent {
            user_id: self.user_id.clone(),
            old_message,
            new_message,
        };
        self.provider_status_listeners
            .dispatch(|listener| listener.provider_status_message_changed(&event));
    }
}

impl fmt::Debug for PresenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenceEngine")
            .field("user_id", &self.user_id)
            .field("status", &self.presence_status())
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{EmptyDirectory, InMemoryDirectory};

    fn engine(user_id: &str) -> Arc<PresenceEngine> {
        PresenceEngine::new(user_id, Arc::new(EmptyDirectory))
    }

    #[test]
    fn test_subscribe_takes_published_status() {
        let engine = engine("me@example.org");
        engine.publish_presence_status(PresenceStatus::Away, "lunch");
        engine.subscribe_to_root("alice@example.org").unwrap();
        assert_eq!(
            engine.query_contact_status("alice@example.org").unwrap(),
            PresenceStatus::Away
        );
    }

    #[test]
    fn test_duplicate_subscription_rejected() {
        let engine = engine("me@example.org");
        engine.subscribe_to_root("alice@example.org").unwrap();
        assert_eq!(
            engine.subscribe_to_root("alice@example.org").unwrap_err(),
            PresenceError::SubscriptionAlreadyExists("alice@example.org".to_string())
        );
    }

    #[test]
    fn test_foreign_group_rejected() {
        let mine = engine("me@example.org");
        let theirs = engine("them@example.org");
        let err = mine.subscribe(&theirs.root(), "alice@example.org").unwrap_err();
        assert!(matches!(err, PresenceError::ForeignGroup(_)));
        assert!(mine.find_contact_by_id("alice@example.org").is_none());
    }

    #[test]
    fn test_unknown_contact_query() {
        let engine = engine("me@example.org");
        assert!(matches!(
            engine.query_contact_status("nobody"),
            Err(PresenceError::UnknownContact(_))
        ));
    }

    #[test]
    fn test_unsubscribe_twice_fails_second_time() {
        let engine = engine("me@example.org");
        let alice = engine.subscribe_to_root("alice@example.org").unwrap();
        engine.unsubscribe(&alice).unwrap();
        assert!(engine.unsubscribe(&alice).is_err());
        assert!(engine.find_contact_by_id("alice@example.org").is_none());
    }

    #[test]
    fn test_volatile_group_created_once() {
        let engine = engine("me@example.org");
        let a = engine.create_volatile_contact("a@example.org");
        let b = engine.create_volatile_contact("b@example.org");
        assert!(!a.is_persistent());
        let group = a.parent().unwrap();
        assert_eq!(group.name(), VOLATILE_GROUP_NAME);
        assert!(Arc::ptr_eq(&group, &b.parent().unwrap()));
        assert_eq!(engine.root().count_subgroups(), 1);
        assert!(Arc::ptr_eq(&engine.create_volatile_contact("a@example.org"), &a));
    }

    #[test]
    fn test_group_lifecycle() {
        let engine = engine("me@example.org");
        let root = engine.root();
        let friends = engine.create_server_stored_contact_group(&root, "Friends").unwrap();
        assert!(matches!(
            engine.create_server_stored_contact_group(&root, "Friends"),
            Err(PresenceError::GroupAlreadyExists { .. })
        ));

        engine.rename_server_stored_contact_group(&friends, "Pals").unwrap();
        assert_eq!(friends.name(), "Pals");

        engine.remove_server_stored_contact_group(&friends).unwrap();
        assert_eq!(root.count_subgroups(), 0);
        assert!(matches!(
            engine.remove_server_stored_contact_group(&friends),
            Err(PresenceError::ForeignGroup(_))
        ));
        assert_eq!(
            engine.remove_server_stored_contact_group(&root).unwrap_err(),
            PresenceError::CannotRemoveRoot
        );
    }

    #[test]
    fn test_rename_onto_sibling_name_rejected() {
        let engine = engine("me@example.org");
        let root = engine.root();
        engine.create_server_stored_contact_group(&root, "Friends").unwrap();
        let work = engine.create_server_stored_contact_group(&root, "Work").unwrap();

        assert_eq!(
            engine.rename_server_stored_contact_group(&work, "Friends").unwrap_err(),
            PresenceError::GroupAlreadyExists {
                name: "Friends".to_string(),
                parent: ROOT_GROUP_NAME.to_string(),
            }
        );
        assert_eq!(work.name(), "Work");
        assert_eq!(root.count_subgroups(), 2);
    }

    #[test]
    fn test_unresolved_group_name_from_uid() {
        let engine = engine("me@example.org");
        let group = engine
            .create_unresolved_contact_group("Work.uid", Some("blob".to_string()), None)
            .unwrap();
        assert_eq!(group.name(), "Work");
        assert!(!group.is_resolved());
        engine.resolve_server_stored_contact_group(&group).unwrap();
        assert!(group.is_resolved());
        assert_eq!(group.persistent_data().as_deref(), Some("blob"));
    }

    #[test]
    fn test_contact_mirrors_other_engine() {
        let directory = InMemoryDirectory::new();
        let alice = PresenceEngine::new("alice", directory.clone());
        let bob = PresenceEngine::new("bob", directory.clone());
        directory.register(&alice);
        directory.register(&bob);

        bob.publish_presence_status(PresenceStatus::FreeForChat, "");
        alice.publish_presence_status(PresenceStatus::Online, "");
        alice.subscribe_to_root("bob").unwrap();
        assert_eq!(alice.query_contact_status("bob").unwrap(), PresenceStatus::FreeForChat);

        alice.publish_presence_status(PresenceStatus::Away, "");
        assert_eq!(alice.query_contact_status("bob").unwrap(), PresenceStatus::FreeForChat);

        bob.publish_presence_status(PresenceStatus::DoNotDisturb, "");
        assert_eq!(alice.query_contact_status("bob").unwrap(), PresenceStatus::DoNotDisturb);
    }

    #[test]
    fn test_disconnect_takes_contacts_offline() {
        let engine = engine("me@example.org");
        engine.publish_presence_status(PresenceStatus::Online, "");
        engine.subscribe_to_root("alice@example.org").unwrap();

        engine.handle_registration_state(RegistrationState::Registering);
        assert_eq!(engine.query_contact_status("alice@example.org").unwrap(), PresenceStatus::Online);

        engine.handle_registration_state(RegistrationState::ConnectionFailed);
        assert_eq!(engine.query_contact_status("alice@example.org").unwrap(), PresenceStatus::Offline);
    }
}
