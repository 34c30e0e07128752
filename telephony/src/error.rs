//! Error types for callkit-telephony

use crate::model::{CallId, CallPeerState, CallState, PeerId};
use thiserror::Error;

/// Result type for telephony operations
pub type Result<T> = std::result::Result<T, CallError>;

/// Errors raised by call and peer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("call {0} has ended")]
    CallEnded(CallId),

    #[error("call {call} cannot move from {from} to {to}")]
    InvalidCallTransition {
        call: CallId,
        from: CallState,
        to: CallState,
    },

    #[error("peer {peer} is in terminal state {state}")]
    PeerTerminated { peer: PeerId, state: CallPeerState },

    #[error("peer {peer} does not belong to call {call}")]
    ForeignPeer { peer: PeerId, call: CallId },

    #[error("conference member {member} is not reported by peer {peer}")]
    ForeignMember { member: String, peer: PeerId },
}
