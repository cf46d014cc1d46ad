//! Credential sign-in flow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use neas_core::result::AppResult;
use neas_entity::session::Session;

use crate::provider::PasswordSignIn;

/// Login form input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    /// Email address.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Signs a user in with email and password.
///
/// The resulting session reaches the session manager through the identity
/// service's change notification, not through this flow.
#[derive(Clone)]
pub struct LoginFlow {
    provider: Arc<dyn PasswordSignIn>,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow").finish()
    }
}

impl LoginFlow {
    /// Creates a login flow over the given sign-in provider.
    pub fn new(provider: Arc<dyn PasswordSignIn>) -> Self {
        Self { provider }
    }

    /// Validates the form and signs in. Bad credentials come back as an
    /// authentication error for the caller to display.
    pub async fn sign_in(&self, form: &LoginForm) -> AppResult<Session> {
        form.validate().map_err(crate::validation_error)?;

        let email = form.email.trim();
        match self
            .provider
            .sign_in_with_password(email, &form.password)
            .await
        {
            Ok(session) => {
                info!(user_id = %session.user_id(), "Signed in");
                Ok(session)
            }
            Err(e) => {
                warn!(email = %email, error = %e, "Sign-in failed");
                Err(e)
            }
        }
    }
}
