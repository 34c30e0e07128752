//! Error types for event-dispatch

use thiserror::Error;

/// Errors raised by event channels
///
/// Listener registries themselves are infallible: duplicate registration and
/// removal of an absent listener are defined as no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Every receiving end of the channel has been dropped
    #[error("Event channel has been closed")]
    ChannelClosed,
}

/// Result type for event-dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;
