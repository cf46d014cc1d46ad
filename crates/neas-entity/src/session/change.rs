//! Session change notifications.

use serde::{Deserialize, Serialize};

use super::model::{AuthUser, Session};

/// What happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionChangeKind {
    /// A session was issued by signing in.
    SignedIn,
    /// The access token was refreshed.
    TokenRefreshed,
    /// The session was revoked.
    SignedOut,
    /// The user's attributes (e.g. password) were updated.
    UserUpdated,
    /// A session was established from a password-recovery link.
    PasswordRecovery,
}

/// A notification delivered to session-change subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    /// The kind of change.
    pub kind: SessionChangeKind,
    /// The session after the change, `None` once revoked.
    pub session: Option<Session>,
}

impl SessionChange {
    /// Create a notification.
    pub fn new(kind: SessionChangeKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    /// The user the new session belongs to, if any.
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }
}
