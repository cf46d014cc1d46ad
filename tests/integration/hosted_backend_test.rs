//! Integration tests for the manager running against the hosted backend
//! clients, with the backend mocked over HTTP.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neas_auth::{InteractionHub, LoginFlow, LoginForm, SessionLifecycleManager};
use neas_client::{BackendHttp, HostedIdentityClient, HostedProfileStore};
use neas_core::config::{BackendConfig, SessionConfig};

const USER_ID: &str = "7d4e9b0a-0c1f-4e59-a4f1-2b8f3c6d5e70";

struct Backend {
    server: MockServer,
    identity: Arc<HostedIdentityClient>,
    manager: SessionLifecycleManager,
    hub: InteractionHub,
}

async fn backend() -> Backend {
    let server = MockServer::start().await;
    let http = BackendHttp::new(&BackendConfig {
        url: server.uri(),
        anon_key: "anon-key".into(),
        request_timeout_seconds: 5,
    })
    .unwrap();
    let identity = Arc::new(HostedIdentityClient::new(http.clone()));
    let profiles = Arc::new(HostedProfileStore::new(http, identity.clone()));
    let hub = InteractionHub::new();
    let manager =
        SessionLifecycleManager::new(identity.clone(), profiles, hub.clone(), &SessionConfig::default())
            .unwrap();
    manager.start().await;

    Backend {
        server,
        identity,
        manager,
        hub,
    }
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-u1",
            "refresh_token": "rt-u1",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": chrono::Utc::now().timestamp() + 3600,
            "user": { "id": USER_ID, "email": "u1@necta.go.tz" }
        })))
        .mount(server)
        .await;
}

async fn sign_in(backend: &Backend) {
    LoginFlow::new(backend.identity.clone())
        .sign_in(&LoginForm {
            email: "u1@necta.go.tz".into(),
            password: "Mtihani#2031".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_in_derives_identity_from_profile_query() {
    let backend = backend().await;
    mount_sign_in(&backend.server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{USER_ID}")))
        .and(header("authorization", "Bearer at-u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "u1",
            "roles": { "role_name": "Admin" }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut state = backend.manager.watch();
    sign_in(&backend).await;

    let snap = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.identity().is_some()),
    )
    .await
    .expect("identity should be derived")
    .unwrap()
    .clone();

    assert_eq!(snap.username.as_deref(), Some("u1"));
    assert_eq!(snap.role.as_deref(), Some("Admin"));
    assert_eq!(backend.hub.total_listeners(), 4);
}

#[tokio::test]
async fn test_failed_profile_query_leaves_session_without_identity() {
    let backend = backend().await;
    mount_sign_in(&backend.server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backend.server)
        .await;

    sign_in(&backend).await;
    // Give the spawned derivation time to hit the mock.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let snap = backend.manager.snapshot();
    assert!(snap.is_authenticated());
    assert!(snap.identity().is_none());
}

#[tokio::test]
async fn test_logout_clears_state_when_remote_sign_out_fails() {
    let backend = backend().await;
    mount_sign_in(&backend.server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "u1",
            "roles": null
        })))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&backend.server)
        .await;

    sign_in(&backend).await;
    backend.manager.logout().await;

    let snap = backend.manager.snapshot();
    assert!(!snap.is_authenticated());
    assert!(snap.username.is_none());
    assert!(snap.role.is_none());
    assert_eq!(backend.hub.total_listeners(), 0);
    assert!(backend.identity.access_token().is_none());
}
