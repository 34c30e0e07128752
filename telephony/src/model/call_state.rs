//! Call state enumeration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a call
///
/// States only move forward: `Initialization → InProgress → Ended`.
/// `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallState {
    /// Created, no peer connected yet
    Initialization,
    /// At least one peer reached `Connected`
    InProgress,
    /// Every peer left or the call was explicitly ended
    Ended,
}

impl CallState {
    fn rank(self) -> u8 {
        match self {
            CallState::Initialization => 0,
            CallState::InProgress => 1,
            CallState::Ended => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == CallState::Ended
    }

    /// Whether `next` is a legal successor of `self` (strictly forward)
    pub fn can_transition_to(self, next: CallState) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallState::Initialization => "Initializing",
            CallState::InProgress => "In Progress",
            CallState::Ended => "Ended",
        }
    }
}

impl Default for CallState {
    fn default() -> Self {
        CallState::Initialization
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
