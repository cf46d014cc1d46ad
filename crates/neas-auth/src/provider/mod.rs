//! Collaborator contracts the session core depends on.
//!
//! The hosted identity service and data store are reached only through
//! these traits. `neas-client` implements them over HTTP; [`memory`]
//! implements them in-process.

pub mod memory;

use async_trait::async_trait;

use neas_core::listener::Subscription;
use neas_core::result::AppResult;
use neas_core::types::UserId;
use neas_entity::session::{Session, SessionChange};
use neas_entity::user::ProfileRow;

pub use memory::{MemoryIdentityService, MemoryProfileStore};

/// Callback invoked for every session change notification.
pub type SessionCallback = Box<dyn Fn(&SessionChange) + Send + Sync>;

/// The identity service contract used by the session manager and the
/// password reset flow.
#[async_trait]
pub trait IdentityService: Send + Sync + 'static {
    /// The session currently held by the identity service, if any.
    async fn get_current_session(&self) -> AppResult<Option<Session>>;

    /// Register for session change notifications. The callback stays
    /// registered until the returned subscription is dropped.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;

    /// Terminate the current session.
    async fn sign_out(&self) -> AppResult<()>;

    /// Send a password reset email linking back to `redirect_to`.
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()>;

    /// Set a new password for the currently authenticated (or recovering)
    /// user.
    async fn update_user_password(&self, password: &str) -> AppResult<()>;
}

/// Email/password sign-in, used by the login flow only.
#[async_trait]
pub trait PasswordSignIn: Send + Sync + 'static {
    /// Exchange credentials for a session. Bad credentials fail with an
    /// authentication error.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;
}

/// The data store query used for identity derivation.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// The profile of `user_id` joined to its role. Fails when no profile
    /// matches or the store cannot be reached.
    async fn find_profile(&self, user_id: UserId) -> AppResult<ProfileRow>;
}
