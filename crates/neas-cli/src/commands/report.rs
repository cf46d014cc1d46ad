//! Report generation command.

use std::path::PathBuf;

use clap::Args;

use neas_auth::{LoginFlow, LoginForm};
use neas_client::{ReportClient, ReportService};
use neas_core::config::AppConfig;
use neas_core::error::AppError;
use neas_core::types::RecordId;
use neas_entity::report::ReportRequest;

use crate::output;

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Master summary record ID
    #[arg(long)]
    pub id: RecordId,
    /// First version to compare
    #[arg(long)]
    pub version1: u32,
    /// Second version to compare
    #[arg(long)]
    pub version2: u32,
    /// Output file (defaults to the configured report directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Sign in as this account before requesting the report
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Execute the report command
pub async fn execute(args: &ReportArgs, config: &AppConfig) -> Result<(), AppError> {
    let (http, identity) = super::connect(config)?;

    if let Some(email) = &args.email {
        let password = super::password_or_prompt(None, "Password")?;
        LoginFlow::new(identity.clone())
            .sign_in(&LoginForm {
                email: email.clone(),
                password,
            })
            .await?;
    }

    let request = ReportRequest {
        id: args.id,
        version1: args.version1,
        version2: args.version2,
    };
    let document = ReportClient::new(http, identity, &config.report)
        .generate(&request)
        .await?;

    let path = match &args.out {
        Some(path) => path.clone(),
        None => PathBuf::from(&config.report.output_dir).join(request.file_name()),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &document.bytes).await?;

    output::print_success(&format!("Report written to {}", path.display()));
    output::print_kv("Content type", &document.content_type);
    output::print_kv("Size", &format!("{} bytes", document.bytes.len()));
    Ok(())
}
