//! Ranked presence status values

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Availability of a contact or of the local user
///
/// Statuses are ordered by their availability rank, so `Away < Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceStatus {
    Offline,
    DoNotDisturb,
    ExtendedAway,
    Away,
    Online,
    FreeForChat,
}

impl PresenceStatus {
    /// Ranks at or above this value are online
    pub const ONLINE_THRESHOLD: u8 = 20;
    /// Ranks at or above this value are at most away
    pub const AWAY_THRESHOLD: u8 = 36;
    /// Ranks at or above this value are available for calls and chats
    pub const AVAILABLE_THRESHOLD: u8 = 50;
    /// Ranks at or above this value actively invite communication
    pub const EAGER_TO_COMMUNICATE_THRESHOLD: u8 = 80;
    pub const MAX_STATUS_VALUE: u8 = 100;

    /// Every status, lowest rank first
    pub const ALL: [PresenceStatus; 6] = [
        PresenceStatus::Offline,
        PresenceStatus::DoNotDisturb,
        PresenceStatus::ExtendedAway,
        PresenceStatus::Away,
        PresenceStatus::Online,
        PresenceStatus::FreeForChat,
    ];

    pub fn rank(self) -> u8 {
        match self {
            PresenceStatus::Offline => 0,
            PresenceStatus::DoNotDisturb => 30,
            PresenceStatus::ExtendedAway => 35,
            PresenceStatus::Away => 40,
            PresenceStatus::Online => 65,
            PresenceStatus::FreeForChat => 85,
        }
    }

    pub fn is_online(self) -> bool {
        self.rank() >= Self::ONLINE_THRESHOLD
    }

    pub fn is_available(self) -> bool {
        self.rank() >= Self::AVAILABLE_THRESHOLD
    }

    pub fn is_eager_to_communicate(self) -> bool {
        self.rank() >= Self::EAGER_TO_COMMUNICATE_THRESHOLD
    }

    pub fn name(self) -> &'static str {
        match self {
            PresenceStatus::Offline => "Offline",
            PresenceStatus::DoNotDisturb => "Do Not Disturb",
            PresenceStatus::ExtendedAway => "Extended Away",
            PresenceStatus::Away => "Away",
            PresenceStatus::Online => "Online",
            PresenceStatus::FreeForChat => "Free For Chat",
        }
    }
}

impl Default for PresenceStatus {
    fn default() -> Self {
        PresenceStatus::Offline
    }
}

impl PartialOrd for PresenceStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PresenceStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
