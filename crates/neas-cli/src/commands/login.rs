//! Sign-in command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use neas_auth::provider::ProfileStore;
use neas_auth::{LoginFlow, LoginForm};
use neas_client::HostedProfileStore;
use neas_core::config::AppConfig;
use neas_core::error::AppError;
use neas_entity::user::DerivedIdentity;

use crate::output::{self, OutputFormat};

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Signed-in user row for table output
#[derive(Debug, Serialize, Tabled)]
struct IdentityRow {
    /// User ID
    user_id: String,
    /// Email
    email: String,
    /// Username
    username: String,
    /// Role
    role: String,
}

/// Execute the login command
pub async fn execute(
    args: &LoginArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (http, identity) = super::connect(config)?;
    let password = super::password_or_prompt(args.password.as_deref(), "Password")?;

    let session = LoginFlow::new(identity.clone())
        .sign_in(&LoginForm {
            email: args.email.clone(),
            password,
        })
        .await?;
    output::print_success("Signed in");

    let profiles = HostedProfileStore::new(http, identity);
    let derived = match profiles.find_profile(session.user_id()).await {
        Ok(row) => DerivedIdentity::from(row),
        Err(e) => {
            output::print_warning(&format!("Could not load profile: {}", e.message));
            return Ok(());
        }
    };

    output::print_rows(
        &[IdentityRow {
            user_id: session.user_id().to_string(),
            email: session.user.email.clone().unwrap_or_default(),
            username: derived.username,
            role: derived.role,
        }],
        format,
    )
}
