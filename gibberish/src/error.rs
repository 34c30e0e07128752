//! Error types for callkit-gibberish

use std::fmt;
use std::path::PathBuf;

use callkit_presence::PresenceError;
use callkit_telephony::CallError;
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Coarse classification of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationFailedReason {
    NetworkFailure,
    NotRegistered,
    InternalError,
    NotSupported,
    OfflineMessagesNotSupported,
    IllegalArgument,
    SubscriptionAlreadyExists,
    Forbidden,
}

impl fmt::Display for OperationFailedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationFailedReason::NetworkFailure => "network failure",
            OperationFailedReason::NotRegistered => "provider not registered",
            OperationFailedReason::InternalError => "internal error",
            OperationFailedReason::NotSupported => "not supported",
            OperationFailedReason::OfflineMessagesNotSupported => "offline messages not supported",
            OperationFailedReason::IllegalArgument => "illegal argument",
            OperationFailedReason::SubscriptionAlreadyExists => "subscription already exists",
            OperationFailedReason::Forbidden => "forbidden",
        };
        f.write_str(s)
    }
}

/// Errors raised by the reference provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to read configuration from {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{reason}: {message}")]
    OperationFailed {
        reason: OperationFailedReason,
        message: String,
    },

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Presence(#[from] PresenceError),
}

impl ProviderError {
    pub fn operation_failed(reason: OperationFailedReason, message: impl Into<String>) -> Self {
        ProviderError::OperationFailed {
            reason,
            message: message.into(),
        }
    }

    /// The failure class a caller would report
    pub fn reason(&self) -> OperationFailedReason {
        match self {
            ProviderError::Configuration(_) => OperationFailedReason::IllegalArgument,
            ProviderError::ConfigRead { .. } => OperationFailedReason::InternalError,
            ProviderError::OperationFailed { reason, .. } => *reason,
            ProviderError::Call(CallError::PeerTerminated { .. } | CallError::CallEnded(_)) => {
                OperationFailedReason::IllegalArgument
            }
            ProviderError::Call(_) => OperationFailedReason::InternalError,
            ProviderError::Presence(PresenceError::SubscriptionAlreadyExists(_)) => {
                OperationFailedReason::SubscriptionAlreadyExists
            }
            ProviderError::Presence(PresenceError::AuthorizationRejected { .. }) => {
                OperationFailedReason::Forbidden
            }
            ProviderError::Presence(_) => OperationFailedReason::IllegalArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_mapping() {
        let err: ProviderError = PresenceError::SubscriptionAlreadyExists("a".into()).into();
        assert_eq!(err.reason(), OperationFailedReason::SubscriptionAlreadyExists);

        let err = ProviderError::operation_failed(OperationFailedReason::NotRegistered, "register first");
        assert_eq!(err.reason(), OperationFailedReason::NotRegistered);
        assert_eq!(err.to_string(), "provider not registered: register first");
    }
}
