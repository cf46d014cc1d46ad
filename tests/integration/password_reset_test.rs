//! Integration tests for the forgot-password and reset-password flow.

mod helpers;

use std::sync::Arc;

use neas_auth::PasswordResetFlow;
use neas_auth::password::ForgotPasswordForm;
use neas_auth::provider::MemoryIdentityService;
use neas_core::config::AuthConfig;
use neas_core::error::ErrorKind;
use neas_entity::session::SessionChangeKind;

fn flow(identity: &Arc<MemoryIdentityService>) -> PasswordResetFlow {
    PasswordResetFlow::new(identity.clone(), &AuthConfig::default())
}

#[tokio::test]
async fn test_reset_link_uses_configured_redirect() {
    let identity = Arc::new(MemoryIdentityService::new());

    flow(&identity)
        .request_reset(&ForgotPasswordForm {
            email: "officer@necta.go.tz".into(),
        })
        .await
        .unwrap();

    assert_eq!(
        identity.reset_requests(),
        vec![(
            "officer@necta.go.tz".to_string(),
            "http://localhost:3000/reset-password".to_string()
        )]
    );
}

#[tokio::test]
async fn test_malformed_email_is_rejected_before_request() {
    let identity = Arc::new(MemoryIdentityService::new());

    let err = flow(&identity)
        .request_reset(&ForgotPasswordForm {
            email: "not-an-email".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(identity.reset_requests().is_empty());
}

#[tokio::test]
async fn test_recovery_session_sets_new_password() {
    let identity = Arc::new(MemoryIdentityService::new());
    let user = identity.add_account("officer@necta.go.tz", "old-password-1");
    identity.establish_session(&user, SessionChangeKind::PasswordRecovery);

    flow(&identity)
        .complete_reset("Kibaha#Mtihani2031", "Kibaha#Mtihani2031")
        .await
        .unwrap();

    assert_eq!(
        identity.password_of("officer@necta.go.tz").as_deref(),
        Some("Kibaha#Mtihani2031")
    );
}

#[tokio::test]
async fn test_expired_link_is_authentication_error() {
    let identity = Arc::new(MemoryIdentityService::new());
    identity.add_account("officer@necta.go.tz", "old-password-1");

    let err = flow(&identity)
        .complete_reset("Kibaha#Mtihani2031", "Kibaha#Mtihani2031")
        .await
        .unwrap_err();

    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_mismatch_and_weak_passwords_never_reach_the_service() {
    let identity = Arc::new(MemoryIdentityService::new());
    let user = identity.add_account("officer@necta.go.tz", "old-password-1");
    identity.establish_session(&user, SessionChangeKind::PasswordRecovery);
    let flow = flow(&identity);

    let mismatch = flow
        .complete_reset("Kibaha#Mtihani2031", "Kibaha#Mtihani2032")
        .await
        .unwrap_err();
    assert_eq!(mismatch.kind, ErrorKind::Validation);

    let weak = flow.complete_reset("password1", "password1").await.unwrap_err();
    assert_eq!(weak.kind, ErrorKind::Validation);

    assert_eq!(
        identity.password_of("officer@necta.go.tz").as_deref(),
        Some("old-password-1")
    );
}

#[tokio::test(start_paused = true)]
async fn test_recovery_session_is_tracked_by_manager() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("u1@necta.go.tz", "u1", Some("Admin"));

    app.identity
        .establish_session(&user, SessionChangeKind::PasswordRecovery);
    helpers::settle().await;

    assert_eq!(app.manager.snapshot().username.as_deref(), Some("u1"));
    assert!(app.manager.inactivity_deadline().is_some());
}
