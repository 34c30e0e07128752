//! Event ordering for subscriptions, moves, groups and authorization

use std::sync::Arc;

use callkit_presence::*;
use parking_lot::Mutex;

fn engine_with_events(user_id: &str) -> (Arc<PresenceEngine>, Arc<PresenceEventChannel>) {
    let engine = PresenceEngine::new(user_id, Arc::new(EmptyDirectory));
    let events = PresenceEventChannel::new();
    engine.add_subscription_listener(events.clone());
    engine.add_contact_presence_status_listener(events.clone());
    engine.add_provider_presence_status_listener(events.clone());
    engine.add_server_stored_group_listener(events.clone());
    (engine, events)
}

fn subscription_kinds(events: &[PresenceEvent]) -> Vec<SubscriptionEventKind> {
    events
        .iter()
        .filter_map(|e| match e {
            PresenceEvent::Subscription(s) => Some(s.kind().clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_subscribe_fires_created_then_resolved() {
    let (engine, events) = engine_with_events("me@example.org");
    engine.publish_presence_status(PresenceStatus::Online, "here");
    events.drain();

    let alice = engine.subscribe_to_root("alice@example");
    let alice = alice.unwrap();
    let fired = events.drain();

    assert_eq!(
        subscription_kinds(&fired),
        vec![SubscriptionEventKind::Created, SubscriptionEventKind::Resolved]
    );
    let PresenceEvent::ContactStatus(status) = &fired[2] else {
        panic!("expected a status change after resolution");
    };
    assert!(Arc::ptr_eq(status.contact(), &alice));
    assert_eq!(status.old_status(), PresenceStatus::Offline);
    assert_eq!(status.new_status(), PresenceStatus::Online);
    assert_eq!(
        engine.query_contact_status("alice@example").unwrap(),
        PresenceStatus::Online
    );
}

#[test]
fn test_subscribe_while_offline_fires_no_status_change() {
    let (engine, events) = engine_with_events("me@example.org");
    engine.subscribe_to_root("alice@example").unwrap();
    let names: Vec<_> = events.drain().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["subscription", "subscription"]);
}

#[test]
fn test_move_persistent_contact() {
    let (engine, events) = engine_with_events("me@example.org");
    let root = engine.root();
    let friends = engine.create_server_stored_contact_group(&root, "Friends").unwrap();
    let alice = engine.subscribe_to_root("alice@example").unwrap();
    events.drain();

    engine.move_contact_to_group(&alice, &friends).unwrap();
    let fired = events.drain();
    assert_eq!(fired.len(), 1);
    let PresenceEvent::SubscriptionMoved(moved) = &fired[0] else {
        panic!("expected a move");
    };
    assert!(Arc::ptr_eq(moved.old_parent(), &root));
    assert!(Arc::ptr_eq(moved.new_parent(), &friends));
    assert_eq!(root.count_contacts(), 0);
    assert_eq!(friends.count_contacts(), 1);

    engine.move_contact_to_group(&alice, &friends).unwrap();
    assert!(events.drain().is_empty());
}

#[test]
fn test_move_volatile_contact_resubscribes() {
    let (engine, events) = engine_with_events("me@example.org");
    let stranger = engine.create_volatile_contact("stranger@example");
    let volatile_group = stranger.parent().unwrap();
    assert!(!volatile_group.is_persistent());
    events.drain();

    let root = engine.root();
    engine.move_contact_to_group(&stranger, &root).unwrap();
    let fired = events.drain();

    let subscription: Vec<_> = fired
        .iter()
        .filter_map(|e| match e {
            PresenceEvent::Subscription(s) => Some((s.kind().clone(), Arc::clone(s.parent()))),
            _ => None,
        })
        .collect();
    assert_eq!(subscription.len(), 2);
    assert_eq!(subscription[0].0, SubscriptionEventKind::Removed);
    assert!(Arc::ptr_eq(&subscription[0].1, &volatile_group));
    assert_eq!(subscription[1].0, SubscriptionEventKind::Created);
    assert!(Arc::ptr_eq(&subscription[1].1, &root));
    assert!(stranger.is_persistent());
}

#[test]
fn test_volatile_contact_creates_group_first() {
    let (engine, events) = engine_with_events("me@example.org");
    engine.create_volatile_contact("stranger@example");
    let names: Vec<_> = events.drain().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["group", "subscription"]);

    engine.create_volatile_contact("other@example");
    let names: Vec<_> = events.drain().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["subscription"]);
}

#[test]
fn test_unresolved_contact_resolves_immediately() {
    let (engine, events) = engine_with_events("me@example.org");
    let contact = engine
        .create_unresolved_contact("carol@example", Some("stored".to_string()), None)
        .unwrap();
    assert!(contact.is_resolved());
    assert_eq!(contact.persistent_data().as_deref(), Some("stored"));
    assert_eq!(
        subscription_kinds(&events.drain()),
        vec![SubscriptionEventKind::Created, SubscriptionEventKind::Resolved]
    );
}

#[test]
fn test_publish_cascades_with_each_contacts_old_status() {
    let (engine, events) = engine_with_events("me@example.org");
    engine.publish_presence_status(PresenceStatus::Away, "");
    engine.subscribe_to_root("alice@example").unwrap();
    events.drain();

    engine.publish_presence_status(PresenceStatus::Online, "back");
    let fired = events.drain();
    let names: Vec<_> = fired.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec!["provider-status", "provider-status-message", "contact-status"]
    );
    let PresenceEvent::ContactStatus(change) = &fired[2] else {
        panic!("expected contact status change");
    };
    assert_eq!(change.old_status(), PresenceStatus::Away);
    assert_eq!(change.new_status(), PresenceStatus::Online);
    assert_eq!(engine.current_status_message(), "back");

    engine.publish_presence_status(PresenceStatus::Online, "back");
    assert!(events.drain().is_empty());
}

#[test]
fn test_group_events() {
    let (engine, events) = engine_with_events("me@example.org");
    let root = engine.root();
    let work = engine.create_server_stored_contact_group(&root, "Work").unwrap();
    engine.rename_server_stored_contact_group(&work, "Office").unwrap();
    engine.remove_server_stored_contact_group(&work).unwrap();

    let kinds: Vec<_> = events
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            PresenceEvent::Group(g) => Some(g.kind()),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![GroupEventKind::Created, GroupEventKind::Renamed, GroupEventKind::Removed]
    );
}

// ============================================================================
// Authorization
// ============================================================================

struct Gatekeeper {
    allow: bool,
    requests_from: Mutex<Vec<String>>,
    responses: Mutex<Vec<AuthorizationResponseCode>>,
}

impl Gatekeeper {
    fn new(allow: bool) -> Arc<Self> {
        Arc::new(Self {
            allow,
            requests_from: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
        })
    }
}

impl AuthorizationHandler for Gatekeeper {
    fn create_authorization_request(&self, _contact: &Arc<Contact>) -> AuthorizationRequest {
        AuthorizationRequest::new("let me in")
    }

    fn process_authorization_request(
        &self,
        _request: &AuthorizationRequest,
        from: &Arc<Contact>,
    ) -> AuthorizationResponse {
        self.requests_from.lock().push(from.address().to_string());
        if self.allow {
            AuthorizationResponse::accept()
        } else {
            AuthorizationResponse::reject("not today")
        }
    }

    fn process_authorization_response(&self, response: &AuthorizationResponse, _contact: &Arc<Contact>) {
        self.responses.lock().push(response.code);
    }
}

#[test]
fn test_rejected_authorization_adds_nothing() {
    let directory = InMemoryDirectory::new();
    let alice = PresenceEngine::new("alice", directory.clone());
    let bob = PresenceEngine::new("bob", directory.clone());
    directory.register(&alice);
    directory.register(&bob);

    let alice_handler = Gatekeeper::new(true);
    let bob_handler = Gatekeeper::new(false);
    alice.set_authorization_handler(Some(alice_handler.clone()));
    bob.set_authorization_handler(Some(bob_handler.clone()));
    let events = PresenceEventChannel::new();
    alice.add_subscription_listener(events.clone());

    let err = alice.subscribe_to_root("bob").unwrap_err();
    assert_eq!(
        subscription_kinds(&events.drain()),
        vec![SubscriptionEventKind::Failed {
            code: SubscriptionEventKind::ERROR_UNSPECIFIED,
            reason: "not today".to_string(),
        }]
    );
    assert_eq!(
        err,
        PresenceError::AuthorizationRejected {
            address: "bob".to_string(),
            reason: Some("not today".to_string()),
        }
    );
    assert!(alice.find_contact_by_id("bob").is_none());
    assert_eq!(*alice_handler.responses.lock(), vec![AuthorizationResponseCode::Reject]);

    // Bob saw the request from a volatile contact for alice.
    assert_eq!(*bob_handler.requests_from.lock(), vec!["alice".to_string()]);
    let volatile = bob.find_contact_by_id("alice").unwrap();
    assert!(!volatile.is_persistent());
}

#[test]
fn test_accepted_authorization_subscribes() {
    let directory = InMemoryDirectory::new();
    let alice = PresenceEngine::new("alice", directory.clone());
    let bob = PresenceEngine::new("bob", directory.clone());
    directory.register(&alice);
    directory.register(&bob);
    bob.set_authorization_handler(Some(Gatekeeper::new(true)));
    alice.set_authorization_handler(Some(Arc::new(AcceptAll)));

    alice.subscribe_to_root("bob").unwrap();
    assert!(alice.find_contact_by_id("bob").is_some());
}

#[test]
fn test_authorization_without_remote_engine_is_simulated() {
    let (engine, _events) = engine_with_events("me@example.org");
    let handler = Gatekeeper::new(false);
    engine.set_authorization_handler(Some(handler.clone()));

    // Our own handler plays the remote side, but the answer is always accept.
    engine.subscribe_to_root("alice@example").unwrap();
    assert_eq!(*handler.requests_from.lock(), vec!["alice@example".to_string()]);
    assert_eq!(*handler.responses.lock(), vec![AuthorizationResponseCode::Accept]);
}

#[test]
fn test_unregistration_takes_everyone_offline() {
    let (engine, events) = engine_with_events("me@example.org");
    engine.publish_presence_status(PresenceStatus::Online, "");
    let root = engine.root();
    let friends = engine.create_server_stored_contact_group(&root, "Friends").unwrap();
    engine.subscribe(&friends, "alice@example").unwrap();
    engine.subscribe_to_root("bob@example").unwrap();
    events.drain();

    engine.handle_registration_state(RegistrationState::Unregistered);
    let offline = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, PresenceEvent::ContactStatus(c) if c.new_status() == PresenceStatus::Offline))
        .count();
    assert_eq!(offline, 2);
}
