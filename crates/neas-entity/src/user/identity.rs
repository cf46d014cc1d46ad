//! Identity derived from a profile lookup.

use serde::{Deserialize, Serialize};

use super::profile::ProfileRow;

/// Role shown when a profile has no linked role.
pub const DEFAULT_ROLE: &str = "User";

/// Display name and role of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedIdentity {
    /// Username from the profile.
    pub username: String,
    /// Role name, [`DEFAULT_ROLE`] when unassigned.
    pub role: String,
}

impl From<ProfileRow> for DerivedIdentity {
    fn from(row: ProfileRow) -> Self {
        Self {
            username: row.username,
            role: row
                .role
                .map(|r| r.role_name)
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        }
    }
}
