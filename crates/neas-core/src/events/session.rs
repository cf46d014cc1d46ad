//! Notices the session manager publishes for the UI layer.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// User-visible outcomes of session lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionNotice {
    /// The inactivity deadline fired and the user was logged out.
    InactivityLogout {
        /// The user that was logged out, if known.
        user_id: Option<UserId>,
        /// Configured idle period in minutes.
        idle_minutes: u64,
    },
    /// The user logged out explicitly.
    SignedOut {
        /// The user that logged out, if known.
        user_id: Option<UserId>,
    },
}

impl SessionNotice {
    /// Message suitable for a toast or status line.
    pub fn message(&self) -> String {
        match self {
            Self::InactivityLogout { idle_minutes, .. } => format!(
                "You have been logged out after {idle_minutes} minutes of inactivity."
            ),
            Self::SignedOut { .. } => "You have been logged out.".to_string(),
        }
    }
}
