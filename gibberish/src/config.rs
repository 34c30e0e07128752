//! Configuration for the reference provider
//!
//! A `ProviderConfig` describes one account: who it is and how quickly its
//! simulated remote parties ring and answer. It can be built in code or
//! loaded from JSON, where delays are given in milliseconds.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// Upper bound for simulated ring and answer delays
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// Configuration for a [`GibberishProvider`](crate::GibberishProvider)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Account user id, also the address other accounts use to reach us
    /// Default: "gibberish"
    pub user_id: String,

    /// Default: "Gibberish User"
    pub display_name: String,

    /// Status message in effect before the first publish
    /// Default: "Default Status Message"
    pub status_message: String,

    /// Delay before a called party starts ringing
    /// Default: 500 ms
    #[serde(with = "duration_ms")]
    pub ring_delay: Duration,

    /// Delay before a ringing party answers
    /// Default: 2 seconds
    #[serde(with = "duration_ms")]
    pub answer_delay: Duration,

    /// Answer incoming calls after `answer_delay`
    /// Default: false
    pub auto_answer: bool,

    /// Run the authorization handshake on subscribe
    /// Default: false
    pub require_authorization: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            user_id: "gibberish".to_string(),
            display_name: "Gibberish User".to_string(),
            status_message: "Default Status Message".to_string(),
            ring_delay: Duration::from_millis(500),
            answer_delay: Duration::from_secs(2),
            auto_answer: false,
            require_authorization: false,
        }
    }
}

impl ProviderConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::default().with_user_id(user_id)
    }

    /// No simulated latency; transitions happen as soon as the scheduler runs
    pub fn instant() -> Self {
        Self {
            ring_delay: Duration::ZERO,
            answer_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Delays close to a human picking up the phone
    pub fn realistic() -> Self {
        Self {
            ring_delay: Duration::from_secs(1),
            answer_delay: Duration::from_secs(5),
            ..Default::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = message.into();
        self
    }

    pub fn with_ring_delay(mut self, delay: Duration) -> Self {
        self.ring_delay = delay;
        self
    }

    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    pub fn with_auto_answer(mut self, auto_answer: bool) -> Self {
        self.auto_answer = auto_answer;
        self
    }

    pub fn with_require_authorization(mut self, require: bool) -> Self {
        self.require_authorization = require;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "user_id must not be empty".to_string(),
            ));
        }

        if self.user_id.chars().any(char::is_whitespace) {
            return Err(ProviderError::Configuration(format!(
                "user_id must not contain whitespace: {:?}",
                self.user_id
            )));
        }

        if self.ring_delay > MAX_DELAY || self.answer_delay > MAX_DELAY {
            return Err(ProviderError::Configuration(format!(
                "ring and answer delays must not exceed {} seconds",
                MAX_DELAY.as_secs()
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ProviderError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ProviderError::Configuration(e.to_string()))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
