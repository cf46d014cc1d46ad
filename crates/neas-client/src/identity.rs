//! Identity service client for a GoTrue-compatible auth API.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info, warn};

use neas_auth::provider::{IdentityService, PasswordSignIn, SessionCallback};
use neas_core::error::{AppError, ErrorKind};
use neas_core::listener::{ListenerRegistry, Subscription};
use neas_core::result::AppResult;
use neas_entity::session::{Session, SessionChange, SessionChangeKind};

use crate::http::{BackendHttp, read_failure, transport_error};

const TOKEN_PATH: &str = "/auth/v1/token";
const LOGOUT_PATH: &str = "/auth/v1/logout";
const RECOVER_PATH: &str = "/auth/v1/recover";
const USER_PATH: &str = "/auth/v1/user";

/// Hosted identity client.
///
/// Holds the current session in memory and notifies subscribers on every
/// change, the same way the hosted service's own SDK does.
pub struct HostedIdentityClient {
    http: BackendHttp,
    current: Mutex<Option<Session>>,
    listeners: ListenerRegistry<SessionChange>,
}

impl fmt::Debug for HostedIdentityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedIdentityClient")
            .field("http", &self.http)
            .field("has_session", &lock(&self.current).is_some())
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

impl HostedIdentityClient {
    /// Create a client with no session.
    pub fn new(http: BackendHttp) -> Self {
        Self {
            http,
            current: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Bearer token of the current session, if any.
    pub fn access_token(&self) -> Option<String> {
        lock(&self.current).as_ref().map(|s| s.access_token.clone())
    }

    /// Exchange a refresh token for a session and announce it as `kind`.
    ///
    /// Used to resume a stored session and to enter recovery mode from a
    /// password reset link.
    pub async fn restore_session(
        &self,
        refresh_token: &str,
        kind: SessionChangeKind,
    ) -> AppResult<Session> {
        let session = self.refresh_grant(refresh_token).await?;
        self.install(session.clone(), kind);
        Ok(session)
    }

    /// Rotate the current session's tokens.
    pub async fn refresh(&self) -> AppResult<Option<Session>> {
        let refresh_token = match lock(&self.current).as_ref() {
            Some(session) => session.refresh_token.clone(),
            None => return Ok(None),
        };

        match self.refresh_grant(&refresh_token).await {
            Ok(session) => {
                self.install(session.clone(), SessionChangeKind::TokenRefreshed);
                Ok(Some(session))
            }
            Err(e) if e.is_authentication() => {
                warn!(error = %e, "Refresh token rejected, dropping session");
                self.clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_grant(&self, refresh_token: &str) -> AppResult<Session> {
        let response = self
            .http
            .request(
                Method::POST,
                &format!("{TOKEN_PATH}?grant_type=refresh_token"),
                None,
            )
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| transport_error("Token refresh failed", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response
            .json::<Session>()
            .await
            .map_err(|e| transport_error("Invalid session payload", e))
    }

    fn install(&self, session: Session, kind: SessionChangeKind) {
        *lock(&self.current) = Some(session.clone());
        debug!(user_id = %session.user_id(), kind = ?kind, "Session installed");
        self.listeners.emit(&SessionChange::new(kind, Some(session)));
    }

    fn clear(&self) {
        if lock(&self.current).take().is_some() {
            self.listeners
                .emit(&SessionChange::new(SessionChangeKind::SignedOut, None));
        }
    }
}

#[async_trait]
impl IdentityService for HostedIdentityClient {
    async fn get_current_session(&self) -> AppResult<Option<Session>> {
        let expired = lock(&self.current)
            .as_ref()
            .is_some_and(|s| s.is_expired_at(Utc::now()));

        if expired {
            debug!("Access token expired, refreshing");
            return self.refresh().await;
        }
        Ok(lock(&self.current).clone())
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };

        let remote = async {
            let response = self
                .http
                .request(Method::POST, LOGOUT_PATH, Some(&token))
                .send()
                .await
                .map_err(|e| transport_error("Sign-out request failed", e))?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(status_error(response).await)
            }
        }
        .await;

        // The local session is gone either way.
        self.clear();
        remote
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        let path = format!(
            "{RECOVER_PATH}?redirect_to={}",
            urlencoding::encode(redirect_to)
        );
        let response = self
            .http
            .request(Method::POST, &path, None)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(|e| transport_error("Password reset request failed", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        info!(email = %email, "Password reset email requested");
        Ok(())
    }

    async fn update_user_password(&self, password: &str) -> AppResult<()> {
        let session = lock(&self.current)
            .clone()
            .ok_or_else(|| AppError::authentication("Auth session missing"))?;

        let response = self
            .http
            .request(Method::PUT, USER_PATH, Some(&session.access_token))
            .json(&json!({ "password": password }))
            .send()
            .await
            .map_err(|e| transport_error("Password update failed", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        self.listeners.emit(&SessionChange::new(
            SessionChangeKind::UserUpdated,
            Some(session),
        ));
        Ok(())
    }
}

#[async_trait]
impl PasswordSignIn for HostedIdentityClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http
            .request(
                Method::POST,
                &format!("{TOKEN_PATH}?grant_type=password"),
                None,
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| transport_error("Sign-in request failed", e))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let session = response
            .json::<Session>()
            .await
            .map_err(|e| transport_error("Invalid session payload", e))?;
        self.install(session.clone(), SessionChangeKind::SignedIn);
        Ok(session)
    }
}

/// Map a non-success auth API response.
async fn status_error(response: reqwest::Response) -> AppError {
    let (status, message) = read_failure(response).await;
    let kind = match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Authentication,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
            ErrorKind::ServiceUnavailable
        }
        _ => ErrorKind::ExternalService,
    };
    AppError::new(kind, message)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
