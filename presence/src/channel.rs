//! Bridge from presence listeners to a blocking event channel

use std::sync::Arc;
use std::time::Duration;

use event_dispatch::{EventChannel, EventIterator};
use tracing::trace;

use crate::event::{
    ContactPresenceStatusChangeEvent, ProviderPresenceStatusChangeEvent,
    ProviderStatusMessageChangeEvent, ServerStoredGroupEvent, SubscriptionEvent,
    SubscriptionMovedEvent,
};
use crate::listener::{
    ContactPresenceStatusListener, ProviderPresenceStatusListener, ServerStoredGroupListener,
    SubscriptionListener,
};

/// Any presence notification
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    Subscription(SubscriptionEvent),
    SubscriptionMoved(SubscriptionMovedEvent),
    ContactStatus(ContactPresenceStatusChangeEvent),
    ProviderStatus(ProviderPresenceStatusChangeEvent),
    ProviderStatusMessage(ProviderStatusMessageChangeEvent),
    Group(ServerStoredGroupEvent),
}

impl PresenceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PresenceEvent::Subscription(_) => "subscription",
            PresenceEvent::SubscriptionMoved(_) => "subscription-moved",
            PresenceEvent::ContactStatus(_) => "contact-status",
            PresenceEvent::ProviderStatus(_) => "provider-status",
            PresenceEvent::ProviderStatusMessage(_) => "provider-status-message",
            PresenceEvent::Group(_) => "group",
        }
    }
}

/// Listener that queues every presence notification in firing order
#[derive(Debug, Default)]
pub struct PresenceEventChannel {
    channel: EventChannel<PresenceEvent>,
}

impl PresenceEventChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn iter(&self) -> EventIterator<PresenceEvent> {
        self.channel.iter()
    }

    pub fn drain(&self) -> Vec<PresenceEvent> {
        self.channel.drain()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PresenceEvent> {
        self.channel.iter().recv_timeout(timeout)
    }

    fn push(&self, event: PresenceEvent) {
        trace!(event = event.name(), "queueing presence event");
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.channel.send(event);
    }
}

impl SubscriptionListener for PresenceEventChannel {
    fn subscription_created(&self, event: &SubscriptionEvent) {
        self.push(PresenceEvent::Subscription(event.clone()));
    }

    fn subscription_resolved(&self, event: &SubscriptionEvent) {
        self.push(PresenceEvent::Subscription(event.clone()));
    }

    fn subscription_removed(&self, event: &SubscriptionEvent) {
        self.push(PresenceEvent::Subscription(event.clone()));
    }

    fn subscription_failed(&self, event: &SubscriptionEvent) {
        self.push(PresenceEvent::Subscription(event.clone()));
    }

    fn subscription_moved(&self, event: &SubscriptionMovedEvent) {
        self.push(PresenceEvent::SubscriptionMoved(event.clone()));
    }
}

impl ContactPresenceStatusListener for PresenceEventChannel {
    fn contact_presence_status_changed(&self, event: &ContactPresenceStatusChangeEvent) {
        self.push(PresenceEvent::ContactStatus(event.clone()));
    }
}

impl ProviderPresenceStatusListener for PresenceEventChannel {
    fn provider_status_changed(&self, event: &ProviderPresenceStatusChangeEvent) {
        self.push(PresenceEvent::ProviderStatus(event.clone()));
    }

    fn provider_status_message_changed(&self, event: &ProviderStatusMessageChangeEvent) {
        self.push(PresenceEvent::ProviderStatusMessage(event.clone()));
    }
}

impl ServerStoredGroupListener for PresenceEventChannel {
    fn group_created(&self, event: &ServerStoredGroupEvent) {
        self.push(PresenceEvent::Group(event.clone()));
    }

    fn group_removed(&self, event: &ServerStoredGroupEvent) {
        self.push(PresenceEvent::Group(event.clone()));
    }

    fn group_name_changed(&self, event: &ServerStoredGroupEvent) {
        self.push(PresenceEvent::Group(event.clone()));
    }

    fn group_resolved(&self, event: &ServerStoredGroupEvent) {
        self.push(PresenceEvent::Group(event.clone()));
    }
}
