//! Session lifecycle tests: login, logout, and the unauthorized-retry path.

mod common;

use std::net::TcpListener;

use hse_client::{AuthTokens, ErrorKind, HseClient, RequestDescriptor};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TokenLog, builder_for, logged_in_client};

fn station_list() -> serde_json::Value {
    json!([{"id": "st-1", "organizationId": "org-1", "name": "Alpha Station"}])
}

// ─────────────────────────────────────────────────────────────────────────────
// Login / Signup / Logout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_commits_tokens_and_notifies_observer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(
            json!({"email": "admin@example.com", "password": "password123"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "A",
            "refreshToken": "R",
            "user": {"id": "u1", "name": "Admin", "email": "admin@example.com", "role": "Admin"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let log = TokenLog::default();
    let client = log.attach(builder_for(&server)).build().unwrap();

    let response = client
        .auth()
        .login("admin@example.com", "password123")
        .await
        .unwrap();

    assert_eq!(response.user.unwrap().name, "Admin");
    assert_eq!(client.current_auth_header().as_deref(), Some("Bearer A"));
    assert_eq!(log.seen(), vec![AuthTokens::new("A", "R")]);
}

#[tokio::test]
async fn signup_sends_organization_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup-with-org"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "pw",
            "organizationName": "Acme Fuels"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"accessToken": "A", "refreshToken": "R"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = builder_for(&server).build().unwrap();
    client
        .auth()
        .signup("Ada", "ada@example.com", "pw", "Acme Fuels")
        .await
        .unwrap();

    assert_eq!(client.session().tokens(), Some(AuthTokens::new("A", "R")));
}

#[tokio::test]
async fn login_without_tokens_in_response_leaves_session_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = builder_for(&server).build().unwrap();
    let err = client.auth().login("a@b.c", "pw").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    assert!(client.current_auth_header().is_none());
}

#[tokio::test]
async fn bad_credentials_do_not_attempt_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = builder_for(&server).build().unwrap();
    let err = client
        .auth()
        .login("wrong@example.com", "wrongpassword")
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.message(), "Invalid credentials");
    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn logout_revokes_refresh_token_and_clears() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer A"))
        .and(body_json(json!({"refreshToken": "R"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A", "R");
    client.auth().logout().await.unwrap();

    assert!(client.session().access_token().is_none());
    assert!(client.session().refresh_token().is_none());
}

#[tokio::test]
async fn logout_without_refresh_token_is_local_only() {
    let server = MockServer::start().await;

    let client = builder_for(&server).access_token("static").build().unwrap();
    client.auth().logout().await.unwrap();

    assert!(client.current_auth_header().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_logout_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad token"})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A", "R");
    let err = client.auth().logout().await.unwrap_err();

    assert!(err.is_validation_error());
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("A", "R")));
}

// ─────────────────────────────────────────────────────────────────────────────
// Unauthorized retry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn expired_token_is_refreshed_and_request_resent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "new", "refreshToken": "r2"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(station_list()))
        .expect(1)
        .mount(&server)
        .await;

    let log = TokenLog::default();
    let client = log
        .attach(builder_for(&server))
        .tokens(AuthTokens::new("old", "r1"))
        .build()
        .unwrap();

    let stations = client.stations().list(None).await.unwrap();

    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0].name, "Alpha Station");
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("new", "r2")));
    assert_eq!(log.seen(), vec![AuthTokens::new("new", "r2")]);
}

#[tokio::test]
async fn execute_returns_resent_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/usage/current"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "new", "refreshToken": "r2"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/usage/current"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"audits": 12})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "old", "r1");
    let body = client
        .execute(RequestDescriptor::get("/api/usage/current"))
        .await
        .unwrap();

    assert_eq!(body, json!({"audits": 12}));
}

#[tokio::test]
async fn rejected_refresh_clears_session_and_reports_refresh_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audits/a1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid refresh token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let log = TokenLog::default();
    let client = log
        .attach(builder_for(&server))
        .tokens(AuthTokens::new("old", "r1"))
        .build()
        .unwrap();

    let err = client.audits().get("a1").await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.message(), "Invalid refresh token");
    assert!(client.session().access_token().is_none());
    assert!(client.session().refresh_token().is_none());
    assert!(log.seen().is_empty());
}

#[tokio::test]
async fn refresh_server_error_still_surfaces_as_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(500).set_body_string("token store unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder_for(&server)
        .max_retries(0)
        .tokens(AuthTokens::new("old", "r1"))
        .build()
        .unwrap();

    let err = client.users().list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.message(), "token store unavailable");
    assert_eq!(err.status_code(), Some(500));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn malformed_refresh_response_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contractors"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "half"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "old", "r1");
    let err = client.contractors().list().await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(client.session().tokens().is_none());
}

#[tokio::test]
async fn resend_rejected_again_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/incidents/i1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Forbidden user"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "new", "refreshToken": "r2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "old", "r1");
    let err = client.incidents().get("i1").await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.message(), "Forbidden user");
    // The refresh itself succeeded, so its pair is kept.
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("new", "r2")));
}

#[tokio::test]
async fn no_refresh_without_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = builder_for(&server).access_token("static").build().unwrap();
    let err = client.stations().list(None).await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.message(), "Token expired");
    // Nothing was refreshed, so nothing was cleared.
    assert_eq!(client.current_auth_header().as_deref(), Some("Bearer static"));
}

#[tokio::test]
async fn descriptor_flag_disables_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "old", "r1");
    let err = client
        .execute(RequestDescriptor::get("/api/users").without_unauthorized_retry())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("old", "r1")));
}

// ─────────────────────────────────────────────────────────────────────────────
// Explicit refresh
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn explicit_refresh_without_token_makes_no_request() {
    let server = MockServer::start().await;

    let client = builder_for(&server).build().unwrap();
    let err = client.auth().refresh().await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.message(), "No refresh token available");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_refresh_failure_leaves_session_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A", "R");
    let err = client.auth().refresh().await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("A", "R")));
}

#[tokio::test]
async fn explicit_refresh_replaces_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let log = TokenLog::default();
    let client = log
        .attach(builder_for(&server))
        .tokens(AuthTokens::new("A", "R"))
        .build()
        .unwrap();
    client.auth().refresh().await.unwrap();

    assert_eq!(client.current_auth_header().as_deref(), Some("Bearer A2"));
    assert_eq!(log.seen(), vec![AuthTokens::new("A2", "R2")]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_server_is_generic_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HseClient::builder()
        .base_url(format!("http://{}", addr))
        .max_retries(1)
        .retry_backoff(std::time::Duration::ZERO)
        .tokens(AuthTokens::new("A", "R"))
        .build()
        .unwrap();

    let err = client.stations().list(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    assert!(err.message().starts_with("Request failed"));
    assert_eq!(client.session().tokens(), Some(AuthTokens::new("A", "R")));
}
