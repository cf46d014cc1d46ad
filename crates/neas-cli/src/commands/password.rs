//! Password recovery commands.

use clap::Args;

use neas_auth::password::ForgotPasswordForm;
use neas_auth::PasswordResetFlow;
use neas_core::config::AppConfig;
use neas_core::error::AppError;
use neas_entity::session::SessionChangeKind;

use crate::output;

/// Arguments for the forgot-password command
#[derive(Debug, Args)]
pub struct ForgotPasswordArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,
}

/// Arguments for the reset-password command
#[derive(Debug, Args)]
pub struct ResetPasswordArgs {
    /// Refresh token from the reset link
    #[arg(short, long)]
    pub refresh_token: String,
    /// New password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Email a reset link
pub async fn forgot(args: &ForgotPasswordArgs, config: &AppConfig) -> Result<(), AppError> {
    let (_, identity) = super::connect(config)?;
    let flow = PasswordResetFlow::new(identity, &config.auth);

    flow.request_reset(&ForgotPasswordForm {
        email: args.email.clone(),
    })
    .await?;

    output::print_success(&format!("Reset link sent to {}", args.email));
    output::print_kv("Redirect", &config.auth.reset_redirect_url);
    Ok(())
}

/// Enter recovery mode with the link's token and set a new password
pub async fn reset(args: &ResetPasswordArgs, config: &AppConfig) -> Result<(), AppError> {
    let (_, identity) = super::connect(config)?;
    identity
        .restore_session(&args.refresh_token, SessionChangeKind::PasswordRecovery)
        .await?;

    let (password, confirmation) = match &args.password {
        Some(p) => (p.clone(), p.clone()),
        None => {
            let password = super::password_or_prompt(None, "New password")?;
            let confirmation = super::password_or_prompt(None, "Confirm password")?;
            (password, confirmation)
        }
    };

    PasswordResetFlow::new(identity, &config.auth)
        .complete_reset(&password, &confirmation)
        .await?;

    output::print_success("Password updated. Sign in with the new password.");
    Ok(())
}
