//! Error types for callkit-presence

use thiserror::Error;

/// Result type for presence operations
pub type Result<T> = std::result::Result<T, PresenceError>;

/// Errors raised by the presence engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("already subscribed to {0}")]
    SubscriptionAlreadyExists(String),

    #[error("no contact with id {0} in this contact list")]
    UnknownContact(String),

    #[error("group {0} does not belong to this contact list")]
    ForeignGroup(String),

    #[error("group {name} already exists under {parent}")]
    GroupAlreadyExists { name: String, parent: String },

    #[error("the contact list root cannot be removed")]
    CannotRemoveRoot,

    #[error("authorization to subscribe to {address} was rejected")]
    AuthorizationRejected {
        address: String,
        reason: Option<String>,
    },
}
