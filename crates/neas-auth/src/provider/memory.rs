//! In-memory identity service and profile store.
//!
//! Used by tests and by the console's offline mode. Both support failure
//! injection so error paths can be exercised deterministically.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use neas_core::error::AppError;
use neas_core::listener::{ListenerRegistry, Subscription};
use neas_core::result::AppResult;
use neas_core::types::UserId;
use neas_entity::session::{AuthUser, Session, SessionChange, SessionChangeKind};
use neas_entity::user::{ProfileRow, RoleRef};

use super::{IdentityService, PasswordSignIn, ProfileStore, SessionCallback};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

/// In-process identity service.
#[derive(Debug, Default)]
pub struct MemoryIdentityService {
    /// Email → account.
    accounts: DashMap<String, Account>,
    /// The session the service currently holds.
    current: Mutex<Option<Session>>,
    /// Session change subscribers.
    listeners: ListenerRegistry<SessionChange>,
    /// When set, `sign_out` fails without revoking.
    fail_sign_out: AtomicBool,
    /// When set, `get_current_session` fails.
    fail_get_session: AtomicBool,
    /// Instants at which `sign_out` was called.
    sign_outs: Mutex<Vec<Instant>>,
    /// `(email, redirect_to)` of every reset request.
    reset_requests: Mutex<Vec<(String, String)>>,
}

impl MemoryIdentityService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can sign in.
    pub fn add_account(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: UserId::new(),
            email: Some(email.to_string()),
        };
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Install a session without notifying subscribers, as if it had been
    /// restored from storage before the console started.
    pub fn preload_session(&self, user: &AuthUser) -> Session {
        let session = issue_session(user);
        *lock(&self.current) = Some(session.clone());
        session
    }

    /// Establish a session for `user` and notify subscribers.
    pub fn establish_session(&self, user: &AuthUser, kind: SessionChangeKind) -> Session {
        let session = issue_session(user);
        *lock(&self.current) = Some(session.clone());
        self.listeners
            .emit(&SessionChange::new(kind, Some(session.clone())));
        session
    }

    /// Rotate the access token of the current session and notify
    /// subscribers.
    pub fn refresh_session(&self) -> Option<Session> {
        let refreshed = {
            let mut current = lock(&self.current);
            let session = current.as_ref().map(|s| issue_session(&s.user))?;
            *current = Some(session.clone());
            session
        };
        self.listeners.emit(&SessionChange::new(
            SessionChangeKind::TokenRefreshed,
            Some(refreshed.clone()),
        ));
        Some(refreshed)
    }

    /// Revoke the current session from the service side (e.g. expiry) and
    /// notify subscribers.
    pub fn revoke_session(&self) {
        lock(&self.current).take();
        self.listeners
            .emit(&SessionChange::new(SessionChangeKind::SignedOut, None));
    }

    /// Make `sign_out` fail.
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Make `get_current_session` fail.
    pub fn set_fail_get_session(&self, fail: bool) {
        self.fail_get_session.store(fail, Ordering::SeqCst);
    }

    /// Number of `sign_out` calls so far.
    pub fn sign_out_count(&self) -> usize {
        lock(&self.sign_outs).len()
    }

    /// Instants of every `sign_out` call.
    pub fn sign_out_times(&self) -> Vec<Instant> {
        lock(&self.sign_outs).clone()
    }

    /// Recorded reset requests.
    pub fn reset_requests(&self) -> Vec<(String, String)> {
        lock(&self.reset_requests).clone()
    }

    /// Current password of an account.
    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts
            .get(&email.to_lowercase())
            .map(|a| a.password.clone())
    }

    /// Number of live session change subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    async fn get_current_session(&self) -> AppResult<Option<Session>> {
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Identity service unreachable"));
        }
        Ok(lock(&self.current).clone())
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }

    async fn sign_out(&self) -> AppResult<()> {
        lock(&self.sign_outs).push(Instant::now());

        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Sign-out request failed"));
        }

        self.revoke_session();
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        debug!(email = %email, "Recording password reset request");
        lock(&self.reset_requests).push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn update_user_password(&self, password: &str) -> AppResult<()> {
        let session = lock(&self.current)
            .clone()
            .ok_or_else(|| AppError::authentication("Auth session missing"))?;

        let email = session
            .user
            .email
            .clone()
            .map(|e| e.to_lowercase())
            .ok_or_else(|| AppError::authentication("Session user has no email"))?;

        let mut account = self
            .accounts
            .get_mut(&email)
            .ok_or_else(|| AppError::authentication("User not found"))?;
        account.password = password.to_string();
        drop(account);

        self.listeners.emit(&SessionChange::new(
            SessionChangeKind::UserUpdated,
            Some(session),
        ));
        Ok(())
    }
}

#[async_trait]
impl PasswordSignIn for MemoryIdentityService {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let user = {
            let account = self
                .accounts
                .get(&email.to_lowercase())
                .filter(|a| a.password == password)
                .ok_or_else(|| AppError::authentication("Invalid login credentials"))?;
            account.user.clone()
        };
        Ok(self.establish_session(&user, SessionChangeKind::SignedIn))
    }
}

/// In-process profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    /// User id → profile row.
    rows: DashMap<UserId, ProfileRow>,
    /// When set, every query fails.
    fail: AtomicBool,
    /// Number of queries served (including failures).
    queries: AtomicUsize,
}

impl MemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub fn insert(&self, user_id: UserId, username: &str, role: Option<&str>) {
        self.rows.insert(
            user_id,
            ProfileRow {
                username: username.to_string(),
                role: role.map(|r| RoleRef {
                    role_name: r.to_string(),
                }),
            },
        );
    }

    /// Make every query fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of queries served.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_profile(&self, user_id: UserId) -> AppResult<ProfileRow> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Profile store unreachable"));
        }

        self.rows
            .get(&user_id)
            .map(|row| row.value().clone())
            .ok_or_else(|| AppError::not_found(format!("No profile for user {user_id}")))
    }
}

fn issue_session(user: &AuthUser) -> Session {
    Session {
        access_token: format!("mem-at-{}", Uuid::new_v4()),
        refresh_token: format!("mem-rt-{}", Uuid::new_v4()),
        token_type: "bearer".to_string(),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        user: user.clone(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_notifies_subscribers() {
        let service = MemoryIdentityService::new();
        service.add_account("officer@necta.go.tz", "Mtihani#2031");

        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let seen_cb = std::sync::Arc::clone(&seen);
        let _sub = service.on_session_change(Box::new(move |change| {
            seen_cb.lock().unwrap().push(change.kind);
        }));

        service
            .sign_in_with_password("Officer@necta.go.tz", "Mtihani#2031")
            .await
            .unwrap();
        service.sign_out().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![SessionChangeKind::SignedIn, SessionChangeKind::SignedOut]
        );
        assert!(service.get_current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_credentials_are_authentication_errors() {
        let service = MemoryIdentityService::new();
        service.add_account("officer@necta.go.tz", "right");
        let err = service
            .sign_in_with_password("officer@necta.go.tz", "wrong")
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let service = MemoryIdentityService::new();
        let user = service.add_account("a@b.c", "pw");
        service.preload_session(&user);
        service.set_fail_sign_out(true);

        assert!(service.sign_out().await.is_err());
        assert!(service.get_current_session().await.unwrap().is_some());
        assert_eq!(service.sign_out_count(), 1);
    }

    #[tokio::test]
    async fn test_profile_store_missing_row_is_error() {
        let store = MemoryProfileStore::new();
        let err = store.find_profile(UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, neas_core::error::ErrorKind::NotFound);
        assert_eq!(store.query_count(), 1);
    }
}
