use std::time::Duration;

use serde::Deserialize;

/// Tunables for the submit/poll loop
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Wall-clock budget for a job, counted from successful submission
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Pause between status polls
    #[serde(default = "default_interval", deserialize_with = "crate::duration::deserialize")]
    pub interval: Duration,
    /// Consecutive transient poll failures tolerated before giving up
    ///
    /// Zero makes the first unreachable poll terminal.
    #[serde(default)]
    pub max_poll_failures: u32,
}

impl PollingConfig {
    /// Job deadline as a duration
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            interval: default_interval(),
            max_poll_failures: 0,
        }
    }
}

pub(crate) const fn default_timeout_seconds() -> u64 {
    300
}

pub(crate) const fn default_interval() -> Duration {
    Duration::from_millis(100)
}
