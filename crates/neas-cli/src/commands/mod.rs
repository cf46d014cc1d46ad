//! CLI command definitions and dispatch.

pub mod login;
pub mod password;
pub mod report;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use neas_client::{BackendHttp, HostedIdentityClient};
use neas_core::config::AppConfig;
use neas_core::error::AppError;

use crate::output::OutputFormat;

/// NEAS admin console tools
#[derive(Debug, Parser)]
#[command(name = "neas", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and show the derived identity
    Login(login::LoginArgs),
    /// Email a password reset link
    ForgotPassword(password::ForgotPasswordArgs),
    /// Set a new password from a reset link's refresh token
    ResetPassword(password::ResetPasswordArgs),
    /// Generate a version comparison report
    Report(report::ReportArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config)?;
        match &self.command {
            Commands::Login(args) => login::execute(args, &config, self.format).await,
            Commands::ForgotPassword(args) => password::forgot(args, &config).await,
            Commands::ResetPassword(args) => password::reset(args, &config).await,
            Commands::Report(args) => report::execute(args, &config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::from_file(config_path)
}

/// Helper: hosted backend HTTP client and identity client
pub fn connect(config: &AppConfig) -> Result<(BackendHttp, Arc<HostedIdentityClient>), AppError> {
    let http = BackendHttp::new(&config.backend)?;
    let identity = Arc::new(HostedIdentityClient::new(http.clone()));
    Ok((http, identity))
}

/// Helper: prompt for a password unless one was given
pub fn password_or_prompt(given: Option<&str>, prompt: &str) -> Result<String, AppError> {
    match given {
        Some(p) => Ok(p.to_string()),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}
