//! Forgot-password and reset-password flow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use neas_core::config::AuthConfig;
use neas_core::result::AppResult;

use crate::provider::IdentityService;

use super::validator::PasswordValidator;

/// Forgot-password form input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    /// Email address the reset link is sent to.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// Sends reset links and sets new passwords.
///
/// Errors are returned to the caller for display; nothing here is retried.
#[derive(Clone)]
pub struct PasswordResetFlow {
    identity: Arc<dyn IdentityService>,
    validator: PasswordValidator,
    redirect_to: String,
}

impl std::fmt::Debug for PasswordResetFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetFlow")
            .field("validator", &self.validator)
            .field("redirect_to", &self.redirect_to)
            .finish()
    }
}

impl PasswordResetFlow {
    /// Creates the flow from auth configuration.
    pub fn new(identity: Arc<dyn IdentityService>, config: &AuthConfig) -> Self {
        Self {
            identity,
            validator: PasswordValidator::new(config),
            redirect_to: config.reset_redirect_url.clone(),
        }
    }

    /// Emails a reset link to `form.email`.
    pub async fn request_reset(&self, form: &ForgotPasswordForm) -> AppResult<()> {
        form.validate().map_err(crate::validation_error)?;
        let email = form.email.trim();

        self.identity
            .reset_password_for_email(email, &self.redirect_to)
            .await
            .inspect_err(|e| warn!(email = %email, error = %e, "Reset request failed"))?;

        info!(email = %email, "Password reset link requested");
        Ok(())
    }

    /// Sets a new password for the user of the current recovery session.
    ///
    /// An expired or missing recovery session fails with an authentication
    /// error.
    pub async fn complete_reset(&self, password: &str, confirmation: &str) -> AppResult<()> {
        self.validator.validate_confirmation(password, confirmation)?;
        self.validator.validate(password)?;

        self.identity
            .update_user_password(password)
            .await
            .inspect_err(|e| warn!(error = %e, "Password update failed"))?;

        info!("Password updated");
        Ok(())
    }
}
