//! Registration state changes of a provider

use callkit_presence::RegistrationState;

/// The provider moved between registration states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationStateChangeEvent {
    pub user_id: String,
    pub old_state: RegistrationState,
    pub new_state: RegistrationState,
    pub reason: Option<String>,
}

pub trait RegistrationStateChangeListener: Send + Sync {
    fn registration_state_changed(&self, event: &RegistrationStateChangeEvent);
}
