//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Password policy and credential-recovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn strength score (0-4) a new password must reach.
    #[serde(default = "default_min_strength")]
    pub password_min_strength: u8,
    /// URL the password-reset email links back to.
    #[serde(default = "default_reset_redirect")]
    pub reset_redirect_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
            password_min_strength: default_min_strength(),
            reset_redirect_url: default_reset_redirect(),
        }
    }
}

fn default_password_min() -> usize {
    8
}

fn default_min_strength() -> u8 {
    2
}

fn default_reset_redirect() -> String {
    "http://localhost:3000/reset-password".to_string()
}
