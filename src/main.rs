//! NEAS Console: interactive admin session
//!
//! Wires the hosted backend clients into the session lifecycle manager and
//! treats every line typed on the terminal as a key press.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use neas_auth::{InteractionHub, LoginFlow, LoginForm, SessionLifecycleManager};
use neas_client::{BackendHttp, HostedIdentityClient, HostedProfileStore};
use neas_core::config::AppConfig;
use neas_core::error::AppError;
use neas_core::events::{InteractionKind, SessionNotice};
use neas_entity::session::SessionChangeKind;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    if let Ok(path) = std::env::var("NEAS_CONFIG") {
        return AppConfig::from_file(&path);
    }

    let env = std::env::var("NEAS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Main console run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NEAS console v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Hosted backend clients ───────────────────────────
    let http = BackendHttp::new(&config.backend)?;
    let identity = Arc::new(HostedIdentityClient::new(http.clone()));
    let profiles = Arc::new(HostedProfileStore::new(http, Arc::clone(&identity)));

    // ── Step 2: Session lifecycle manager ────────────────────────
    let hub = InteractionHub::new();
    let manager = SessionLifecycleManager::new(
        identity.clone(),
        profiles,
        hub.clone(),
        &config.session,
    )?;
    let mut notices = manager.notices();
    manager.start().await;

    // ── Step 3: Sign in unless a session is already held ────────
    if !manager.snapshot().is_authenticated() {
        if let Ok(token) = std::env::var("NEAS_REFRESH_TOKEN") {
            identity
                .restore_session(&token, SessionChangeKind::SignedIn)
                .await?;
        } else {
            sign_in(&identity).await?;
        }
    }

    // ── Step 4: Wait for identity derivation ─────────────────────
    let mut state = manager.watch();
    let derived = tokio::time::timeout(
        Duration::from_secs(config.backend.request_timeout_seconds),
        state.wait_for(|s| s.identity().is_some() || !s.is_authenticated()),
    )
    .await;
    match derived.ok().and_then(Result::ok).and_then(|s| s.identity()) {
        Some(who) => println!("Signed in as {} ({})", who.username, who.role),
        None => println!("Signed in; profile unavailable"),
    }
    println!(
        "Idle logout after {} minutes. Type to stay active, 'logout' to sign out.",
        config.session.idle_timeout_minutes
    );

    // ── Step 5: Terminal input as interaction source ─────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "logout" => manager.logout().await,
                    Some(_) => {
                        hub.dispatch(InteractionKind::KeyDown);
                    }
                    None => {
                        tracing::info!("Input closed");
                        break;
                    }
                }
            }
            notice = notices.recv() => {
                match notice {
                    Ok(notice) => {
                        if let SessionNotice::InactivityLogout { idle_minutes, .. } = &notice {
                            tracing::info!(idle_minutes, "Inactivity logout");
                        }
                        println!("{}", notice.message());
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed session notices");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("Interrupted, signing out");
                manager.logout().await;
                break;
            }
        }
    }

    // ── Step 6: Teardown ─────────────────────────────────────────
    manager.teardown();
    tracing::info!("NEAS console stopped");
    Ok(())
}

/// Prompt for credentials and sign in
async fn sign_in(identity: &Arc<HostedIdentityClient>) -> Result<(), AppError> {
    let email = match std::env::var("NEAS_EMAIL") {
        Ok(email) => email,
        Err(_) => dialoguer::Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?,
    };
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

    LoginFlow::new(identity.clone())
        .sign_in(&LoginForm { email, password })
        .await?;
    Ok(())
}
