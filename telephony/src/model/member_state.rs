//! Conference member state enumeration

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a participant known through a conference focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConferenceMemberState {
    Unknown,
    Alerting,
    Connecting,
    Connected,
    OnHold,
    Disconnected,
}

impl ConferenceMemberState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConferenceMemberState::Unknown => "Unknown",
            ConferenceMemberState::Alerting => "Alerting",
            ConferenceMemberState::Connecting => "Connecting",
            ConferenceMemberState::Connected => "Connected",
            ConferenceMemberState::OnHold => "On Hold",
            ConferenceMemberState::Disconnected => "Disconnected",
        }
    }
}

impl Default for ConferenceMemberState {
    fn default() -> Self {
        ConferenceMemberState::Unknown
    }
}

impl fmt::Display for ConferenceMemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
