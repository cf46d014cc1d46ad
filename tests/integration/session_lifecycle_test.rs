//! Integration tests for session tracking and inactivity logout.

mod helpers;

use std::time::Duration;

use tokio::time::Instant;

use neas_core::events::{InteractionKind, SessionNotice};

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn test_sign_in_derives_identity() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));

    app.sign_in("u1@necta.go.tz").await;

    let snap = app.manager.snapshot();
    assert!(snap.is_authenticated());
    assert_eq!(snap.username.as_deref(), Some("u1"));
    assert_eq!(snap.role.as_deref(), Some("Admin"));
    assert_eq!(app.hub.total_listeners(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_profile_without_role_defaults_to_user() {
    let app = helpers::TestApp::new().await;
    app.create_user("clerk@necta.go.tz", "clerk", None);

    app.sign_in("clerk@necta.go.tz").await;

    assert_eq!(app.manager.snapshot().role.as_deref(), Some("User"));
}

#[tokio::test(start_paused = true)]
async fn test_key_press_at_minute_14_moves_logout_to_minute_29() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    let start = Instant::now();
    app.sign_in("u1@necta.go.tz").await;

    tokio::time::sleep(14 * MINUTE).await;
    app.hub.dispatch(InteractionKind::KeyDown);

    tokio::time::sleep(2 * MINUTE).await;
    assert_eq!(app.identity.sign_out_count(), 0, "no logout at minute 15");

    tokio::time::sleep(14 * MINUTE).await;
    let times = app.identity.sign_out_times();
    assert_eq!(times.len(), 1);
    assert_eq!(times[0] - start, 29 * MINUTE);
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_logs_out_exactly_once() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    let mut notices = app.manager.notices();
    app.sign_in("u1@necta.go.tz").await;

    tokio::time::sleep(3 * 60 * MINUTE).await;

    assert_eq!(app.identity.sign_out_count(), 1);
    let snap = app.manager.snapshot();
    assert!(!snap.is_authenticated());
    assert!(snap.user.is_none());
    assert!(snap.username.is_none());
    assert!(snap.role.is_none());
    assert_eq!(app.hub.total_listeners(), 0);

    match notices.try_recv() {
        Ok(SessionNotice::InactivityLogout { idle_minutes, .. }) => assert_eq!(idle_minutes, 15),
        other => panic!("expected inactivity notice, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_logout_clears_state_when_sign_out_fails() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    app.sign_in("u1@necta.go.tz").await;
    app.identity.set_fail_sign_out(true);

    app.manager.logout().await;

    let snap = app.manager.snapshot();
    assert!(!snap.is_authenticated());
    assert!(snap.username.is_none());
    assert!(snap.role.is_none());
    assert!(app.manager.inactivity_deadline().is_none());
    assert_eq!(app.identity.sign_out_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_inactivity_logout_clears_state_when_sign_out_fails() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    app.sign_in("u1@necta.go.tz").await;
    app.identity.set_fail_sign_out(true);

    tokio::time::sleep(16 * MINUTE).await;

    assert!(!app.manager.snapshot().is_authenticated());
    assert!(app.manager.snapshot().identity().is_none());
    assert_eq!(app.hub.total_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reauthentication_derives_identity_once_per_session() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));

    app.sign_in("u1@necta.go.tz").await;
    assert_eq!(app.profiles.query_count(), 1);

    app.manager.logout().await;
    assert_eq!(app.profiles.query_count(), 1);

    app.sign_in("u1@necta.go.tz").await;
    assert_eq!(app.profiles.query_count(), 2);
    assert_eq!(app.manager.snapshot().username.as_deref(), Some("u1"));
    assert_eq!(app.hub.total_listeners(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_detaches_listeners_and_cancels_deadline() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    app.sign_in("u1@necta.go.tz").await;
    assert_eq!(app.hub.total_listeners(), 4);

    app.manager.teardown();
    app.manager.teardown();

    assert_eq!(app.hub.total_listeners(), 0);
    assert_eq!(app.identity.subscriber_count(), 0);
    assert!(app.manager.inactivity_deadline().is_none());

    tokio::time::sleep(60 * MINUTE).await;
    assert_eq!(app.identity.sign_out_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_every_interaction_kind_reschedules_single_deadline() {
    let app = helpers::TestApp::new().await;
    app.create_user("u1@necta.go.tz", "u1", Some("Admin"));
    let start = Instant::now();
    app.sign_in("u1@necta.go.tz").await;
    assert_eq!(app.manager.inactivity_deadline(), Some(start + 15 * MINUTE));

    for kind in InteractionKind::ALL {
        tokio::time::sleep(5 * MINUTE).await;
        assert_eq!(app.hub.dispatch(kind), 1);
        assert_eq!(
            app.manager.inactivity_deadline(),
            Some(Instant::now() + 15 * MINUTE),
            "{kind} should reschedule"
        );
    }

    // Last event at minute 20: nothing fires at 15, 25 or 30.
    tokio::time::sleep(14 * MINUTE).await;
    assert_eq!(app.identity.sign_out_count(), 0);

    tokio::time::sleep(2 * MINUTE).await;
    let times = app.identity.sign_out_times();
    assert_eq!(times.len(), 1);
    assert_eq!(times[0] - start, 35 * MINUTE);
}

#[tokio::test(start_paused = true)]
async fn test_interactions_without_session_do_nothing() {
    let app = helpers::TestApp::new().await;

    assert_eq!(app.hub.dispatch(InteractionKind::PointerDown), 0);
    assert!(app.manager.inactivity_deadline().is_none());

    tokio::time::sleep(30 * MINUTE).await;
    assert_eq!(app.identity.sign_out_count(), 0);
}
