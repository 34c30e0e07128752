//! Two accounts watching each other and placing a call
//!
//! Run with `CALLKIT_LOG_MODE=development` to see the state machines at work.

use std::sync::Arc;
use std::time::Duration;

use callkit_gibberish::{GibberishProvider, ProviderConfig, ThreadScheduler};
use callkit_presence::{InMemoryDirectory, PresenceEventChannel, PresenceStatus};
use callkit_telephony::{init_logging_from_env, TelephonyEvent, TelephonyEventChannel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let scheduler = Arc::new(ThreadScheduler::new());
    let directory = InMemoryDirectory::new();

    let alice = GibberishProvider::new(
        ProviderConfig::new("alice").with_display_name("Alice"),
        scheduler.clone(),
        directory.clone(),
    )?;
    let bob = GibberishProvider::new(
        ProviderConfig::new("bob")
            .with_display_name("Bob")
            .with_ring_delay(Duration::from_millis(200))
            .with_answer_delay(Duration::from_millis(800)),
        scheduler.clone(),
        directory,
    )?;
    alice.register()?;
    bob.register()?;

    let presence_events = PresenceEventChannel::new();
    alice.presence().add_contact_presence_status_listener(presence_events.clone());
    alice.presence().subscribe_to_root("bob")?;
    bob.presence().publish_presence_status(PresenceStatus::Online, "at my desk");

    for event in presence_events.drain() {
        println!("alice sees: {}", event.name());
    }

    let call_events = TelephonyEventChannel::new();
    let call = bob.telephony().create_call("alice")?;
    call.add_call_change_listener(call_events.clone());
    for peer in call.peers() {
        peer.add_call_peer_listener(call_events.clone());
    }

    while let Some(event) = call_events.recv_timeout(Duration::from_secs(2)) {
        println!("bob's call: {}", event.name());
        if let TelephonyEvent::PeerChanged(change) = &event {
            if change.new_state().is_some_and(|s| s.is_established()) {
                break;
            }
        }
    }

    bob.unregister()?;
    alice.unregister()?;
    scheduler.join();
    Ok(())
}
