//! # neas-auth
//!
//! Session lifecycle management for the NEAS administration console.
//!
//! ## Modules
//!
//! - `provider`: collaborator traits (identity service, password sign-in,
//!   profile store) plus in-memory implementations
//! - `session`: the session lifecycle manager, inactivity timer and
//!   interaction listener attachment
//! - `login`: credential sign-in flow
//! - `password`: password policy and reset flow

pub mod login;
pub mod password;
pub mod provider;
pub mod session;

pub use login::{LoginFlow, LoginForm};
pub use password::{PasswordResetFlow, PasswordValidator};
pub use provider::{IdentityService, PasswordSignIn, ProfileStore};
pub use session::{AuthSnapshot, InactivityTimer, InteractionHub, SessionLifecycleManager};

use neas_core::error::AppError;

/// Collapse validator output into a single validation error carrying the
/// first field message.
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string());
    AppError::validation(message)
}
