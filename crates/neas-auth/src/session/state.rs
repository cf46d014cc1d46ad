//! Observable authentication state.

use serde::Serialize;

use neas_entity::session::{AuthUser, Session};
use neas_entity::user::DerivedIdentity;

/// What the UI sees of the session manager at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    /// `true` until the initial session lookup has finished.
    pub loading: bool,
    /// The held session.
    #[serde(skip)]
    pub session: Option<Session>,
    /// The session's user.
    pub user: Option<AuthUser>,
    /// Username from the profile.
    pub username: Option<String>,
    /// Role name from the profile.
    pub role: Option<String>,
}

impl AuthSnapshot {
    /// Whether a session is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Username and role together, once both are known.
    pub fn identity(&self) -> Option<DerivedIdentity> {
        match (&self.username, &self.role) {
            (Some(username), Some(role)) => Some(DerivedIdentity {
                username: username.clone(),
                role: role.clone(),
            }),
            _ => None,
        }
    }
}
