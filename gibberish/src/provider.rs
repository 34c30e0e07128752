//! The reference protocol provider
//!
//! A `GibberishProvider` bundles one account's presence engine and simulated
//! telephony behind a registration state machine. Providers created against
//! the same [`InMemoryDirectory`] can see each other: subscribing to another
//! provider's user id follows its published status.

use std::fmt;
use std::sync::Arc;

use callkit_presence::{AcceptAll, InMemoryDirectory, PresenceEngine, ProviderDirectory, RegistrationState};
use event_dispatch::ListenerRegistry;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::registration::{RegistrationStateChangeEvent, RegistrationStateChangeListener};
use crate::scheduler::Scheduler;
use crate::telephony::{BasicTelephony, CallTiming};

/// Reason given to peers disconnected by an unregistration
pub const UNREGISTER_REASON: &str = "provider unregistered";

/// One simulated account
pub struct GibberishProvider {
    config: ProviderConfig,
    registration: Arc<RwLock<RegistrationState>>,
    registration_listeners: ListenerRegistry<dyn RegistrationStateChangeListener>,
    presence: Arc<PresenceEngine>,
    telephony: Arc<BasicTelephony>,
    directory: Arc<InMemoryDirectory>,
}

impl GibberishProvider {
    /// Validate `config`, build the account and publish it in `directory`
    pub fn new(
        config: ProviderConfig,
        scheduler: Arc<dyn Scheduler>,
        directory: Arc<InMemoryDirectory>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let lookup: Arc<dyn ProviderDirectory> = directory.clone();
        let presence = PresenceEngine::new(config.user_id.clone(), lookup);
        presence.set_status_message(config.status_message.clone());
        if config.require_authorization {
            presence.set_authorization_handler(Some(Arc::new(AcceptAll)));
        }
        directory.register(&presence);

        let registration = Arc::new(RwLock::new(RegistrationState::Unregistered));
        let timing = CallTiming {
            ring_delay: config.ring_delay,
            answer_delay: config.answer_delay,
            auto_answer: config.auto_answer,
        };
        let telephony = BasicTelephony::new(config.user_id.clone(), timing, Arc::clone(&registration), scheduler);

        info!(user_id = %config.user_id, "gibberish provider created");
        Ok(Arc::new(Self {
            config,
            registration,
            registration_listeners: ListenerRegistry::new("registration"),
            presence,
            telephony,
            directory,
        }))
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn presence(&self) -> &Arc<PresenceEngine> {
        &self.presence
    }

    pub fn telephony(&self) -> &Arc<BasicTelephony> {
        &self.telephony
    }

    pub fn registration_state(&self) -> RegistrationState {
        *self.registration.read()
    }

    pub fn is_registered(&self) -> bool {
        self.registration_state().is_registered()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Go through `Registering` to `Registered`
    ///
    /// Registering a provider that is registered, or on its way there, does
    /// nothing.
    pub fn register(&self) -> Result<()> {
        let started = self.begin_transition(RegistrationState::Registering, |state| {
            !matches!(state, RegistrationState::Registered | RegistrationState::Registering)
        });
        let Some(old_state) = started else {
            debug!(user_id = %self.config.user_id, "already registered");
            return Ok(());
        };

        self.fire_state_change(old_state, RegistrationState::Registering, None);
        self.directory.register(&self.presence);
        self.change_state(RegistrationState::Registered, None);
        info!(user_id = %self.config.user_id, "registered");
        Ok(())
    }

    /// Go through `Unregistering` to `Unregistered`
    ///
    /// Active calls are hung up and every contact goes offline.
    pub fn unregister(&self) -> Result<()> {
        let started = self.begin_transition(RegistrationState::Unregistering, |state| {
            !state.is_disconnected() && state != RegistrationState::Unregistering
        });
        let Some(old_state) = started else {
            debug!(user_id = %self.config.user_id, "already unregistered");
            return Ok(());
        };

        self.fire_state_change(old_state, RegistrationState::Unregistering, None);
        self.telephony.hangup_all(UNREGISTER_REASON);
        self.change_state(RegistrationState::Unregistered, None);
        info!(user_id = %self.config.user_id, "unregistered");
        Ok(())
    }

    /// Pretend the connection to the network dropped
    pub fn simulate_connection_failure(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(user_id = %self.config.user_id, %reason, "connection failed");
        self.change_state(RegistrationState::ConnectionFailed, Some(reason.clone()));
        self.telephony.hangup_all(&reason);
    }

    /// Swap in `next` if the current state passes `allowed`
    fn begin_transition(
        &self,
        next: RegistrationState,
        allowed: impl FnOnce(RegistrationState) -> bool,
    ) -> Option<RegistrationState> {
        let mut state = self.registration.write();
        if !allowed(*state) {
            return None;
        }
        Some(std::mem::replace(&mut *state, next))
    }

    fn change_state(&self, new_state: RegistrationState, reason: Option<String>) {
        let old_state = std::mem::replace(&mut *self.registration.write(), new_state);
        if old_state != new_state {
            self.fire_state_change(old_state, new_state, reason);
        }
    }

    fn fire_state_change(&self, old_state: RegistrationState, new_state: RegistrationState, reason: Option<String>) {
        debug!(user_id = %self.config.user_id, from = %old_state, to = %new_state, "registration state changed");
        self.presence.handle_registration_state(new_state);

        let event = RegistrationStateChangeEvent {
            user_id: self.config.user_id.clone(),
            old_state,
            new_state,
            reason,
        };
        self.registration_listeners
            .dispatch(|listener| listener.registration_state_changed(&event));
    }

    pub fn add_registration_state_change_listener(&self, listener: Arc<dyn RegistrationStateChangeListener>) -> bool {
        self.registration_listeners.add(listener)
    }

    pub fn remove_registration_state_change_listener(
        &self,
        listener: &Arc<dyn RegistrationStateChangeListener>,
    ) -> bool {
        self.registration_listeners.remove(listener)
    }
}

impl fmt::Debug for GibberishProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GibberishProvider")
            .field("user_id", &self.config.user_id)
            .field("registration", &self.registration_state())
            .finish_non_exhaustive()
    }
}
