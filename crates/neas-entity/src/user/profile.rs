//! Profile row joined to its role.

use serde::{Deserialize, Serialize};

/// The `roles` record linked from a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// Display name of the role, e.g. `"Admin"`.
    pub role_name: String,
}

/// One row of `profiles?select=username,roles(role_name)`.
///
/// The embedded relation is absent (or `null`) when the profile has no
/// role assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Login/display name.
    pub username: String,
    /// Linked role, if any.
    #[serde(default, rename = "roles")]
    pub role: Option<RoleRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_embedded_role() {
        let row: ProfileRow =
            serde_json::from_str(r#"{"username":"u1","roles":{"role_name":"Admin"}}"#).unwrap();
        assert_eq!(row.role.map(|r| r.role_name).as_deref(), Some("Admin"));
    }

    #[test]
    fn test_null_or_missing_role() {
        let row: ProfileRow = serde_json::from_str(r#"{"username":"u1","roles":null}"#).unwrap();
        assert!(row.role.is_none());
        let row: ProfileRow = serde_json::from_str(r#"{"username":"u1"}"#).unwrap();
        assert!(row.role.is_none());
    }
}
