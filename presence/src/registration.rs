//! Provider registration states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration state of a protocol provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationState {
    Unregistered,
    Registering,
    Registered,
    Unregistering,
    ConnectionFailed,
    AuthenticationFailed,
}

impl RegistrationState {
    pub fn is_registered(self) -> bool {
        self == RegistrationState::Registered
    }

    /// States after which nothing we hold can be considered online
    pub fn is_disconnected(self) -> bool {
        matches!(
            self,
            RegistrationState::Unregistered
                | RegistrationState::ConnectionFailed
                | RegistrationState::AuthenticationFailed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationState::Unregistered => "Unregistered",
            RegistrationState::Registering => "Registering",
            RegistrationState::Registered => "Registered",
            RegistrationState::Unregistering => "Unregistering",
            RegistrationState::ConnectionFailed => "Connection Failed",
            RegistrationState::AuthenticationFailed => "Authentication Failed",
        }
    }
}

impl Default for RegistrationState {
    fn default() -> Self {
        RegistrationState::Unregistered
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
