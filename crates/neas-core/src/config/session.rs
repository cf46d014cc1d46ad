//! Session lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted inactivity period: one week.
pub const MAX_IDLE_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes without user interaction before the console logs out.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Capacity of the notice channel the manager publishes on.
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,
}

impl SessionConfig {
    /// The inactivity period as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_minutes.saturating_mul(60))
    }

    /// Reject idle timeouts outside `1..=MAX_IDLE_TIMEOUT_MINUTES`.
    pub fn validate(&self) -> Result<(), AppError> {
        if (1..=MAX_IDLE_TIMEOUT_MINUTES).contains(&self.idle_timeout_minutes) {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "session.idle_timeout_minutes must be between 1 and {MAX_IDLE_TIMEOUT_MINUTES}, got {}",
                self.idle_timeout_minutes
            )))
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            notice_capacity: default_notice_capacity(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    15
}

fn default_notice_capacity() -> usize {
    16
}
