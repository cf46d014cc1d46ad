//! Session lifecycle manager: session tracking, identity derivation and
//! inactivity logout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use neas_core::config::SessionConfig;
use neas_core::error::AppError;
use neas_core::events::{InteractionKind, SessionNotice};
use neas_core::listener::Subscription;
use neas_core::types::UserId;
use neas_entity::session::{AuthUser, Session, SessionChange};
use neas_entity::user::DerivedIdentity;

use crate::provider::{IdentityService, ProfileStore};

use super::activity::{ActivityListeners, InteractionHub};
use super::state::AuthSnapshot;
use super::timer::InactivityTimer;

/// Tracks the identity-service session for the console, derives the
/// signed-in user's username and role, and logs out after a period without
/// user interaction.
///
/// Cloning is cheap; all clones share one manager. Dropping the last clone
/// (or calling [`SessionLifecycleManager::teardown`]) unsubscribes from the
/// identity service, detaches the interaction listeners and cancels the
/// inactivity deadline.
#[derive(Clone)]
pub struct SessionLifecycleManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    /// Identity service the session comes from.
    identity: Arc<dyn IdentityService>,
    /// Data store used for identity derivation.
    profiles: Arc<dyn ProfileStore>,
    /// Where interaction listeners are attached.
    hub: InteractionHub,
    /// Runtime deadline and derivation tasks are spawned on.
    runtime: Handle,
    /// Idle period in minutes, for notices and logs.
    idle_minutes: u64,
    /// Mutable state. Never held across an `.await`.
    state: Mutex<ManagerState>,
    /// Latest state for UI consumers.
    snapshot: watch::Sender<AuthSnapshot>,
    /// User-facing notices.
    notices: broadcast::Sender<SessionNotice>,
}

struct ManagerState {
    loading: bool,
    session: Option<Session>,
    user: Option<AuthUser>,
    identity: Option<DerivedIdentity>,
    timer: InactivityTimer,
    listeners: Option<ActivityListeners>,
    subscription: Option<Subscription>,
    torn_down: bool,
}

impl ManagerState {
    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            loading: self.loading,
            session: self.session.clone(),
            user: self.user.clone(),
            username: self.identity.as_ref().map(|i| i.username.clone()),
            role: self.identity.as_ref().map(|i| i.role.clone()),
        }
    }

    /// Drop everything tied to the current session.
    fn end_session(&mut self) {
        self.session = None;
        self.user = None;
        self.identity = None;
        self.timer.cancel();
        if let Some(listeners) = self.listeners.take() {
            listeners.detach();
        }
    }
}

impl std::fmt::Debug for SessionLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleManager")
            .field("idle_minutes", &self.inner.idle_minutes)
            .field("hub", &self.inner.hub)
            .finish()
    }
}

impl SessionLifecycleManager {
    /// Creates a manager. Must be called from within a Tokio runtime; the
    /// inactivity deadline and identity derivation run on it.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        profiles: Arc<dyn ProfileStore>,
        hub: InteractionHub,
        config: &SessionConfig,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| {
            AppError::internal(format!("Session manager requires a Tokio runtime: {e}"))
        })?;

        let initial = AuthSnapshot {
            loading: true,
            ..AuthSnapshot::default()
        };
        let (snapshot, _) = watch::channel(initial);
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));

        Ok(Self {
            inner: Arc::new(ManagerInner {
                identity,
                profiles,
                hub,
                runtime,
                idle_minutes: config.idle_timeout_minutes,
                state: Mutex::new(ManagerState {
                    loading: true,
                    session: None,
                    user: None,
                    identity: None,
                    timer: InactivityTimer::new(config.idle_timeout()),
                    listeners: None,
                    subscription: None,
                    torn_down: false,
                }),
                snapshot,
                notices,
            }),
        })
    }

    /// Subscribes to session changes, then loads the current session.
    pub async fn start(&self) {
        self.subscribe_to_session_changes();
        self.initialize().await;
    }

    /// Loads the identity service's current session and derives identity
    /// for it. `loading` is cleared afterwards whatever the outcome.
    pub async fn initialize(&self) {
        self.inner.set_loading(true);

        let current = match self.inner.identity.get_current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to load current session; starting signed out");
                None
            }
        };

        if let Some(user_id) = self.inner.apply_session(current) {
            self.inner.derive_identity(user_id, true).await;
        }

        self.inner.set_loading(false);
        debug!("Session manager initialized");
    }

    /// Registers for session change notifications. Any previous
    /// registration is replaced.
    pub fn subscribe_to_session_changes(&self) {
        let weak = Arc::downgrade(&self.inner);
        let subscription = self
            .inner
            .identity
            .on_session_change(Box::new(move |change: &SessionChange| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_session_change(change);
                }
            }));

        let mut state = self.inner.state();
        if state.torn_down {
            drop(state);
            subscription.unsubscribe();
            return;
        }
        if let Some(previous) = state.subscription.replace(subscription) {
            previous.unsubscribe();
        }
    }

    /// Looks up the profile of `user_id` and records its username and role.
    ///
    /// Failures are logged and leave the previous identity in place.
    pub async fn derive_identity(&self, user_id: UserId) -> Option<DerivedIdentity> {
        self.inner.derive_identity(user_id, false).await
    }

    /// Cancels the pending inactivity deadline and, while a session is
    /// active, schedules a new one a full idle period from now.
    pub fn reset_inactivity_timer(&self) {
        self.inner.reset_timer();
    }

    /// Signs out of the identity service and clears the local session.
    ///
    /// The local state is cleared even when the remote sign-out fails.
    pub async fn logout(&self) {
        let user_id = self.inner.logout().await;
        let _ = self.inner.notices.send(SessionNotice::SignedOut { user_id });
    }

    /// Unsubscribes from session changes, detaches the interaction
    /// listeners and cancels the inactivity deadline. Idempotent.
    pub fn teardown(&self) {
        let mut state = self.inner.state();
        if state.torn_down {
            return;
        }
        state.torn_down = true;

        if let Some(subscription) = state.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(listeners) = state.listeners.take() {
            listeners.detach();
        }
        state.timer.cancel();

        debug!("Session manager torn down");
    }

    /// The current state.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state().snapshot()
    }

    /// A receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// A receiver for user-facing notices (e.g. inactivity logout).
    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.inner.notices.subscribe()
    }

    /// The pending inactivity deadline, if a session is active.
    pub fn inactivity_deadline(&self) -> Option<Instant> {
        self.inner.state().timer.deadline()
    }

    /// The hub interaction listeners are attached to.
    pub fn hub(&self) -> &InteractionHub {
        &self.inner.hub
    }
}

impl ManagerInner {
    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ManagerState) {
        self.snapshot.send_replace(state.snapshot());
    }

    fn set_loading(&self, loading: bool) {
        let mut state = self.state();
        state.loading = loading;
        self.publish(&state);
    }

    fn handle_session_change(self: &Arc<Self>, change: &SessionChange) {
        debug!(kind = ?change.kind, "Session change received");

        // No sequencing: a slower derivation for an older change may land
        // after a newer one.
        if let Some(user_id) = self.apply_session(change.session.clone()) {
            let inner = Arc::clone(self);
            self.runtime.spawn(async move {
                inner.derive_identity(user_id, true).await;
            });
        }
    }

    /// Replaces the held session. Returns the user whose identity should
    /// be derived.
    fn apply_session(self: &Arc<Self>, session: Option<Session>) -> Option<UserId> {
        let mut state = self.state();
        if state.torn_down {
            return None;
        }

        let previous = state.user.as_ref().map(|u| u.id);
        let user_id = match session {
            Some(session) => {
                let user_id = session.user_id();
                state.user = Some(session.user.clone());
                state.session = Some(session);

                if previous != Some(user_id) {
                    state.identity = None;
                    self.arm(&mut state);
                    info!(user_id = %user_id, "Session established");
                }
                Some(user_id)
            }
            None => {
                if let Some(user_id) = previous {
                    info!(user_id = %user_id, "Session ended");
                }
                state.end_session();
                None
            }
        };

        self.publish(&state);
        user_id
    }

    /// Attaches the interaction listeners and schedules the first deadline.
    fn arm(self: &Arc<Self>, state: &mut ManagerState) {
        if state.listeners.is_none() {
            let weak = Arc::downgrade(self);
            state.listeners = Some(ActivityListeners::attach(
                &self.hub,
                move |kind: InteractionKind| {
                    if let Some(inner) = weak.upgrade() {
                        trace!(kind = %kind, "Interaction");
                        inner.reset_timer();
                    }
                },
            ));
        }
        self.schedule_deadline(state);
    }

    fn schedule_deadline(self: &Arc<Self>, state: &mut ManagerState) {
        let weak = Arc::downgrade(self);
        let deadline = state
            .timer
            .schedule(&self.runtime, move |generation| async move {
                if let Some(inner) = weak.upgrade() {
                    inner.on_deadline(generation).await;
                }
            });
        trace!(deadline = ?deadline, "Inactivity deadline scheduled");
    }

    fn reset_timer(self: &Arc<Self>) {
        let mut state = self.state();
        state.timer.cancel();
        if state.session.is_some() && !state.torn_down {
            self.schedule_deadline(&mut state);
        }
    }

    async fn on_deadline(&self, generation: u64) {
        let user_id = {
            let mut state = self.state();
            if state.torn_down || !state.timer.complete(generation) {
                return;
            }
            match state.session.as_ref() {
                Some(session) => session.user_id(),
                None => return,
            }
        };

        info!(
            user_id = %user_id,
            idle_minutes = self.idle_minutes,
            "No interaction within the idle period, logging out"
        );

        self.logout().await;
        let _ = self.notices.send(SessionNotice::InactivityLogout {
            user_id: Some(user_id),
            idle_minutes: self.idle_minutes,
        });
    }

    async fn logout(&self) -> Option<UserId> {
        let user_id = self.state().user.as_ref().map(|u| u.id);

        if let Err(e) = self.identity.sign_out().await {
            warn!(error = %e, "Sign-out request failed, clearing local session anyway");
        }

        let mut state = self.state();
        state.end_session();
        self.publish(&state);
        info!(user_id = ?user_id, "Logged out");
        user_id
    }

    /// With `session_bound`, the result is discarded when `user_id` no
    /// longer holds the session by the time the lookup returns.
    async fn derive_identity(
        &self,
        user_id: UserId,
        session_bound: bool,
    ) -> Option<DerivedIdentity> {
        let row = match self.profiles.find_profile(user_id).await {
            Ok(row) => row,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to derive identity");
                return None;
            }
        };

        let identity = DerivedIdentity::from(row);
        {
            let mut state = self.state();
            if state.torn_down {
                return None;
            }
            if session_bound && state.user.as_ref().map(|u| u.id) != Some(user_id) {
                debug!(user_id = %user_id, "Session ended during derivation, discarding identity");
                return None;
            }
            state.identity = Some(identity.clone());
            self.publish(&state);
        }

        info!(
            user_id = %user_id,
            username = %identity.username,
            role = %identity.role,
            "Identity derived"
        );
        Some(identity)
    }
}
