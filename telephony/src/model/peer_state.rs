//! Call peer state enumeration and hold re-evaluation rules

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a remote party within a call
///
/// `Disconnected` and `Failed` are terminal. `Failed` is reachable from
/// every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallPeerState {
    /// Freshly created, nothing known yet
    Unknown,
    /// We are placing the call
    InitiatingCall,
    /// The remote side is calling us
    IncomingCall,
    /// Signalling accepted, media not yet flowing
    Connecting,
    /// Early media is being received while connecting
    ConnectingWithEarlyMedia,
    /// The remote side is ringing
    AlertingRemoteSide,
    /// Media is flowing both ways
    Connected,
    /// The remote side is busy
    Busy,
    /// We put the peer on hold
    OnHoldLocally,
    /// The peer put us on hold
    OnHoldRemotely,
    /// Both sides hold
    OnHoldMutually,
    /// The peer left the call
    Disconnected,
    /// The call with this peer failed
    Failed,
}

impl CallPeerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallPeerState::Disconnected | CallPeerState::Failed)
    }

    pub fn is_on_hold(self) -> bool {
        matches!(
            self,
            CallPeerState::OnHoldLocally
                | CallPeerState::OnHoldRemotely
                | CallPeerState::OnHoldMutually
        )
    }

    /// Connected, possibly with media paused by a hold
    pub fn is_established(self) -> bool {
        self == CallPeerState::Connected || self.is_on_hold()
    }

    /// State reached when the local hold flag becomes `locally_on_hold`
    ///
    /// Returns `self` when the flag does not affect the current state.
    pub fn with_local_hold(self, locally_on_hold: bool) -> CallPeerState {
        match self {
            CallPeerState::OnHoldLocally if !locally_on_hold => CallPeerState::Connected,
            CallPeerState::OnHoldLocally => self,
            CallPeerState::OnHoldMutually if !locally_on_hold => CallPeerState::OnHoldRemotely,
            CallPeerState::OnHoldMutually => self,
            CallPeerState::OnHoldRemotely if locally_on_hold => CallPeerState::OnHoldMutually,
            CallPeerState::OnHoldRemotely => self,
            _ if locally_on_hold => CallPeerState::OnHoldLocally,
            _ => self,
        }
    }

    /// State reached when the remote hold flag becomes `remotely_on_hold`
    pub fn with_remote_hold(self, remotely_on_hold: bool) -> CallPeerState {
        match self {
            CallPeerState::OnHoldLocally if remotely_on_hold => CallPeerState::OnHoldMutually,
            CallPeerState::OnHoldLocally => self,
            CallPeerState::OnHoldMutually if !remotely_on_hold => CallPeerState::OnHoldLocally,
            CallPeerState::OnHoldMutually => self,
            CallPeerState::OnHoldRemotely if !remotely_on_hold => CallPeerState::Connected,
            CallPeerState::OnHoldRemotely => self,
            _ if remotely_on_hold => CallPeerState::OnHoldRemotely,
            _ => self,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallPeerState::Unknown => "Unknown",
            CallPeerState::InitiatingCall => "Initiating Call",
            CallPeerState::IncomingCall => "Incoming Call",
            CallPeerState::Connecting => "Connecting",
            CallPeerState::ConnectingWithEarlyMedia => "Connecting With Early Media",
            CallPeerState::AlertingRemoteSide => "Ringing",
            CallPeerState::Connected => "Connected",
            CallPeerState::Busy => "Busy",
            CallPeerState::OnHoldLocally => "Locally On Hold",
            CallPeerState::OnHoldRemotely => "Remotely On Hold",
            CallPeerState::OnHoldMutually => "Mutually On Hold",
            CallPeerState::Disconnected => "Disconnected",
            CallPeerState::Failed => "Failed",
        }
    }
}

impl Default for CallPeerState {
    fn default() -> Self {
        CallPeerState::Unknown
    }
}

impl fmt::Display for CallPeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
