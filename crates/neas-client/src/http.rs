//! Shared HTTP plumbing for the hosted backend.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use neas_core::config::BackendConfig;
use neas_core::error::{AppError, ErrorKind};

/// A configured HTTP client bound to one backend project.
///
/// Every request carries the project's public `apikey` header.
#[derive(Debug, Clone)]
pub struct BackendHttp {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl BackendHttp {
    /// Build a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Absolute URL for `path`. Absolute inputs are returned unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Start a request with the `apikey` header set. Without a user token
    /// the anon key doubles as the bearer token.
    pub fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str()))
    }
}

/// Error payloads the backend's services return. Different services use
/// different field names.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ServiceErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Read a failed response into its status and best-effort message.
pub(crate) async fn read_failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let message = response
        .json::<ServiceErrorBody>()
        .await
        .ok()
        .and_then(ServiceErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
    (status, message)
}

/// Map a transport-level failure (connect, timeout, decode).
pub(crate) fn transport_error(context: &str, err: reqwest::Error) -> AppError {
    let kind = if err.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::ExternalService
    };
    AppError::with_source(kind, format!("{context}: {err}"), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> BackendHttp {
        BackendHttp::new(&BackendConfig {
            url: "https://neas.example.org/".into(),
            anon_key: "anon".into(),
            request_timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_relative_paths() {
        assert_eq!(
            http().url("/auth/v1/logout"),
            "https://neas.example.org/auth/v1/logout"
        );
        assert_eq!(
            http().url("rest/v1/profiles"),
            "https://neas.example.org/rest/v1/profiles"
        );
    }

    #[test]
    fn test_url_keeps_absolute() {
        assert_eq!(
            http().url("https://reports.example.org/pdf"),
            "https://reports.example.org/pdf"
        );
    }

    #[test]
    fn test_error_body_prefers_description() {
        let body: ServiceErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid login credentials"));
    }
}
