//! Listener traits for presence events
//!
//! All methods default to no-ops.

use crate::event::{
    ContactPresenceStatusChangeEvent, ProviderPresenceStatusChangeEvent,
    ProviderStatusMessageChangeEvent, ServerStoredGroupEvent, SubscriptionEvent,
    SubscriptionMovedEvent,
};

pub trait SubscriptionListener: Send + Sync {
    fn subscription_created(&self, _event: &SubscriptionEvent) {}

    fn subscription_resolved(&self, _event: &SubscriptionEvent) {}

    fn subscription_removed(&self, _event: &SubscriptionEvent) {}

    fn subscription_failed(&self, _event: &SubscriptionEvent) {}

    fn subscription_moved(&self, _event: &SubscriptionMovedEvent) {}
}

pub trait ContactPresenceStatusListener: Send + Sync {
    fn contact_presence_status_changed(&self, _event: &ContactPresenceStatusChangeEvent) {}
}

pub trait ProviderPresenceStatusListener: Send + Sync {
    fn provider_status_changed(&self, _event: &ProviderPresenceStatusChangeEvent) {}

    fn provider_status_message_changed(&self, _event: &ProviderStatusMessageChangeEvent) {}
}

pub trait ServerStoredGroupListener: Send + Sync {
    fn group_created(&self, _event: &ServerStoredGroupEvent) {}

    fn group_removed(&self, _event: &ServerStoredGroupEvent) {}

    fn group_name_changed(&self, _event: &ServerStoredGroupEvent) {}

    fn group_resolved(&self, _event: &ServerStoredGroupEvent) {}
}
