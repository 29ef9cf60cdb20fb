#![allow(clippy::unwrap_used)]
// Integration tests for `Session` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eveng_api::models::{InterfaceLink, NetworkPayload, NodeAction, NodePayload, UserPayload};
use eveng_api::{Error, Session};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "6f1c0c4e-session";

fn session_for(server: &MockServer) -> Session {
    Session::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "admin".into(),
        "eve".to_string().into(),
    )
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "eve", "html5": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("{}={TOKEN}; path=/", eveng_api::SESSION_COOKIE).as_str())
                .set_body_json(json!({"code": 200, "status": "success", "message": "User logged in (90013)."})),
        )
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let session = session_for(&server);
    session.login().await.unwrap();
    (server, session)
}

fn cookie() -> String {
    format!("unetlab_session={TOKEN}")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let (_server, session) = setup().await;
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_login_without_cookie_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_failure_reports_envelope_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400, "status": "fail", "message": "Invalid credentials (90012)."
        })))
        .mount(&server)
        .await;

    let err = session_for(&server).login().await.unwrap_err();
    match err {
        Error::Authentication { message } => {
            assert!(message.contains("Invalid credentials"), "{message}");
            assert!(message.contains("400"), "{message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_failure_with_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = session_for(&server).login().await.unwrap_err();
    match err {
        Error::Authentication { message } => {
            assert!(message.contains("502"), "{message}");
            assert!(message.contains("Bad Gateway"), "{message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_calls_before_login_are_no_session() {
    let server = MockServer::start().await;
    let session = session_for(&server);
    let result = session.get_lab("/demo.unl").await;
    assert!(matches!(result, Err(Error::NoSession)), "got: {result:?}");
}

#[tokio::test]
async fn test_logout_clears_token_even_on_error() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.logout().await.unwrap();
    assert!(!session.is_authenticated());
    // A second logout is a no-op.
    session.logout().await.unwrap();
}

// ── Envelope boundary ───────────────────────────────────────────────

#[tokio::test]
async fn test_requests_carry_session_cookie() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/demo.unl"))
        .and(header("cookie", cookie().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "status": "success",
            "data": {"name": "demo", "version": "1", "lock": 0, "scripttimeout": 300}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lab = session.get_lab("/demo.unl").await.unwrap();
    assert_eq!(lab.name, "demo");
    assert!(!lab.lock);
}

#[tokio::test]
async fn test_http_200_with_error_code_is_api_error() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/missing.unl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 404, "status": "fail", "message": "Lab does not exist (60038)."
        })))
        .mount(&server)
        .await;

    let err = session.get_lab("/missing.unl").await.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_http_error_uses_envelope_when_present() {
    let (server, session) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/labs/demo.unl/networks/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404, "status": "fail", "message": "Network does not exist."
        })))
        .mount(&server)
        .await;

    let err = session.delete_network("/demo.unl", 9).await.unwrap_err();
    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Network does not exist.");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_with_raw_body() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = session.status().await.unwrap_err();
    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_is_decode_error() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/demo.unl/networks/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = session.get_network("/demo.unl", 1).await;
    assert!(matches!(result, Err(Error::Decode { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_expired_session_is_authentication_error() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/demo.unl"))
        .respond_with(ResponseTemplate::new(412).set_body_json(json!({
            "code": 412, "status": "unauthorized",
            "message": "User is not authenticated or session timed out (90001)."
        })))
        .mount(&server)
        .await;

    let err = session.get_lab("/demo.unl").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_delete_with_embedded_failure_code_is_api_error() {
    let (server, session) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/labs/demo.unl/networks/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400, "status": "fail", "message": "Lab is locked"
        })))
        .mount(&server)
        .await;

    let err = session.delete_network("/demo.unl", 1).await.unwrap_err();
    assert_eq!(err.api_code(), Some(400));
}

#[tokio::test]
async fn test_user_create_with_embedded_failure_code_is_api_error() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400, "status": "fail", "message": "Username already exists"
        })))
        .mount(&server)
        .await;

    let payload = UserPayload {
        username: Some("alice".into()),
        ..UserPayload::default()
    };
    let err = session.create_user(&payload).await.unwrap_err();
    match err {
        Error::Api { code, message } => {
            assert_eq!(code, 400);
            assert_eq!(message, "Username already exists");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_mutation_without_envelope_body_succeeds() {
    let (server, session) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/labs/demo.unl/Unlock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    session.unlock_lab("/demo.unl").await.unwrap();
}

// ── Endpoints ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_network_sends_only_set_fields() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/labs/demo.unl/networks"))
        .and(body_json(json!({"name": "mgmt", "type": "bridge"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "code": 201, "status": "success", "data": {"id": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = NetworkPayload {
        name: Some("mgmt".into()),
        network_type: Some("bridge".into()),
        ..NetworkPayload::default()
    };
    assert_eq!(session.create_network("/demo.unl", &payload).await.unwrap(), 3);
}

#[tokio::test]
async fn test_create_network_rejects_wrong_code() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/labs/demo.unl/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400, "status": "fail", "message": "Invalid network type"
        })))
        .mount(&server)
        .await;

    let err = session
        .create_network("/demo.unl", &NetworkPayload::default())
        .await
        .unwrap_err();
    assert_eq!(err.api_code(), Some(400));
}

#[tokio::test]
async fn test_create_node_accepts_id_array() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/labs/demo.unl/nodes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "code": 201, "status": "success", "data": {"id": [7]}
        })))
        .mount(&server)
        .await;

    let payload = NodePayload {
        name: Some("r1".into()),
        ..NodePayload::default()
    };
    assert_eq!(session.create_node("/demo.unl", &payload).await.unwrap(), 7);
}

#[tokio::test]
async fn test_network_list_accepts_empty_array() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/demo.unl/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "status": "success", "data": []
        })))
        .mount(&server)
        .await;

    assert!(session.list_networks("/demo.unl").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_interface_body() {
    let (server, session) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/labs/demo.unl/nodes/2/interfaces"))
        .and(body_json(json!({"1": 4})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"code": 201})))
        .expect(1)
        .mount(&server)
        .await;

    session
        .set_interface("/demo.unl", 2, 1, &InterfaceLink::Network(4))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_node_power_action_is_get() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/labs/demo.unl/nodes/2/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
        .expect(1)
        .mount(&server)
        .await;

    session
        .node_action("/demo.unl", 2, NodeAction::Start)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_lock_sends_no_body() {
    let (server, session) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/labs/demo.unl/Lock"))
        .and(header("cookie", cookie().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
        .expect(1)
        .mount(&server)
        .await;

    session.lock_lab("/demo.unl").await.unwrap();
    let requests = server.received_requests().await.unwrap();
    let lock = requests
        .iter()
        .find(|r| r.url.path() == "/api/labs/demo.unl/Lock")
        .unwrap();
    assert!(lock.body.is_empty());
    assert!(lock.headers.get("content-type").is_none());
}
