//! Session entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use neas_core::types::UserId;

/// The user an identity-service session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity-service user id, also the primary key of `profiles`.
    pub id: UserId,
    /// Sign-in email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// A live session issued by the identity service.
///
/// The console never creates sessions itself; it holds a copy of the one
/// the identity service handed out and replaces it on every change
/// notification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated requests.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    pub refresh_token: String,
    /// Token type, normally `"bearer"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Absolute expiry of the access token.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    /// The authenticated user.
    pub user: AuthUser,
}

impl Session {
    /// The id of the session's user.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// Whether the access token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_identity_service_payload() {
        let json = serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "user": {
                "id": "2f0c1c7e-4d3a-4b8e-9a55-1f7f1d9f4e11",
                "email": "officer@necta.go.tz",
                "aud": "authenticated"
            }
        });

        let session: Session = serde_json::from_value(json).expect("should parse");
        assert_eq!(session.user.email.as_deref(), Some("officer@necta.go.tz"));
        assert_eq!(
            session.expires_at.map(|t| t.timestamp()),
            Some(1_900_000_000)
        );
        assert!(!session.is_expired_at(DateTime::from_timestamp(1_800_000_000, 0).unwrap()));
        assert!(session.is_expired_at(DateTime::from_timestamp(1_900_000_000, 0).unwrap()));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let session = Session {
            access_token: "secret-access".into(),
            refresh_token: "secret-refresh".into(),
            token_type: "bearer".into(),
            expires_at: None,
            user: AuthUser {
                id: UserId::new(),
                email: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
    }
}
