//! Hosted backend configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the hosted database-as-a-service that provides
/// both the identity service and the profile data store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.backend.example`.
    pub url: String,
    /// Public (anonymous) API key sent as the `apikey` header.
    pub anon_key: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

fn default_request_timeout() -> u64 {
    30
}
