//! Shared test helpers for integration tests.

use std::sync::Arc;

use neas_auth::provider::{MemoryIdentityService, MemoryProfileStore, PasswordSignIn};
use neas_auth::{InteractionHub, SessionLifecycleManager};
use neas_core::config::SessionConfig;
use neas_entity::session::AuthUser;

/// In-memory console wired the same way the binary wires the hosted one.
pub struct TestApp {
    /// Identity service the manager subscribes to
    pub identity: Arc<MemoryIdentityService>,
    /// Profile store used for identity derivation
    pub profiles: Arc<MemoryProfileStore>,
    /// Interaction event target
    pub hub: InteractionHub,
    /// The manager under test
    pub manager: SessionLifecycleManager,
}

impl TestApp {
    /// Create a started manager with the default 15 minute idle period.
    pub async fn new() -> Self {
        let identity = Arc::new(MemoryIdentityService::new());
        let profiles = Arc::new(MemoryProfileStore::new());
        let hub = InteractionHub::new();

        let manager = SessionLifecycleManager::new(
            identity.clone(),
            profiles.clone(),
            hub.clone(),
            &SessionConfig::default(),
        )
        .expect("manager should build inside a runtime");
        manager.start().await;

        Self {
            identity,
            profiles,
            hub,
            manager,
        }
    }

    /// Register an account with a profile. `role` of `None` leaves the
    /// role relation empty.
    pub fn create_user(&self, email: &str, username: &str, role: Option<&str>) -> AuthUser {
        let user = self.identity.add_account(email, "Mtihani#2031");
        self.profiles.insert(user.id, username, role);
        user
    }

    /// Sign in and let identity derivation finish.
    pub async fn sign_in(&self, email: &str) {
        self.identity
            .sign_in_with_password(email, "Mtihani#2031")
            .await
            .expect("sign-in should succeed");
        settle().await;
    }
}

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
