//! Flow configuration.

use serde::{Deserialize, Serialize};

/// Tuning for the unlock poller.
///
/// The defaults give roughly twelve minutes of polling on the stepped
/// backoff schedule before the poller gives up with a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of status polls before surfacing a timeout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Whether to jitter the delay between polls.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_attempts() -> u32 {
    40
}

fn default_jitter() -> bool {
    true
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            jitter: default_jitter(),
        }
    }
}
