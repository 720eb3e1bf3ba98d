mod common;

use common::{closed_port, received, spawn_server, CannedResponse};

use unifi_collector::collectors::unifi::errors::ControllerError;
use unifi_collector::collectors::{ControllerClient, UnifiController};
use unifi_collector::config::{ControllerConfig, ControllerVersion};
use unifi_collector::models::StatValue;

/// Integration tests for the UniFi controller client
/// A throwaway HTTP server plays the controller: it answers login and
/// `stat/device` requests from a script and records what the client sent

const DEVICES_BODY: &str = r#"{
    "meta": {"rc": "ok"},
    "data": [
        {"name": "ap1", "mac": "aa:bb:cc:00:00:01", "stat": {"uptime": 9999.0, "port_1-rx_bytes": 100.0}},
        {"mac": "aa:bb:cc:00:00:02", "stat": {"uptime": 12.5}}
    ]
}"#;

fn controller_config(port: u16, version: ControllerVersion) -> ControllerConfig {
    ControllerConfig {
        url: format!("http://127.0.0.1:{port}"),
        username: "admin".to_string(),
        password: "secret".to_string(),
        site_id: "default".to_string(),
        version,
        ssl: true,
        sleep: 30,
        port: 8443,
    }
}

fn login_ok() -> CannedResponse {
    CannedResponse::new("200 OK", r#"{"meta":{"rc":"ok"},"data":[]}"#)
        .with_header("Content-Type", "application/json")
}

fn login_with_token(token: &str) -> CannedResponse {
    login_ok().with_header("X-CSRF-Token", token)
}

fn devices() -> CannedResponse {
    CannedResponse::new("200 OK", DEVICES_BODY).with_header("Content-Type", "application/json")
}

fn unauthorized() -> CannedResponse {
    CannedResponse::new("401 Unauthorized", r#"{"meta":{"rc":"error","msg":"api.err.LoginRequired"}}"#)
}

#[tokio::test]
async fn test_v5_login_and_device_paths() {
    let (port, mut requests) = spawn_server(vec![login_ok(), devices()]).await;

    let mut controller = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap();
    let access_points = controller.list_access_points().await.unwrap();

    let seen = received(&mut requests);
    let paths: Vec<_> = seen.iter().map(|request| request.method_and_path()).collect();
    assert_eq!(
        paths,
        vec!["POST /api/login", "GET /api/s/default/stat/device"]
    );

    let login = &seen[0];
    assert!(login.body.contains(r#""username":"admin""#), "{}", login.body);
    assert!(login.body.contains(r#""password":"secret""#), "{}", login.body);
    assert!(seen[1].header("x-csrf-token").is_none());

    let names: Vec<_> = access_points.iter().map(|ap| ap.name.as_str()).collect();
    assert_eq!(names, vec!["ap1", "aa:bb:cc:00:00:02"]);
    assert_eq!(access_points[0].stat["uptime"], StatValue::Float(9999.0));
}

#[tokio::test]
async fn test_unifi_os_uses_proxy_prefix_and_replays_csrf_token() {
    let (port, mut requests) = spawn_server(vec![login_with_token("tok1"), devices()]).await;

    let mut controller =
        UnifiController::connect(&controller_config(port, ControllerVersion::UnifiOs))
            .await
            .unwrap();
    controller.list_access_points().await.unwrap();

    let seen = received(&mut requests);
    let paths: Vec<_> = seen.iter().map(|request| request.method_and_path()).collect();
    assert_eq!(
        paths,
        vec![
            "POST /api/auth/login",
            "GET /proxy/network/api/s/default/stat/device"
        ]
    );
    assert_eq!(seen[1].header("x-csrf-token"), Some("tok1"));
}

#[tokio::test]
async fn test_expired_session_logs_in_again_once() {
    let (port, mut requests) = spawn_server(vec![
        login_with_token("tok1"),
        unauthorized(),
        login_with_token("tok2"),
        devices(),
    ])
    .await;

    let mut controller =
        UnifiController::connect(&controller_config(port, ControllerVersion::UnifiOs))
            .await
            .unwrap();
    let access_points = controller.list_access_points().await.unwrap();

    let seen = received(&mut requests);
    let paths: Vec<_> = seen.iter().map(|request| request.method_and_path()).collect();
    assert_eq!(
        paths,
        vec![
            "POST /api/auth/login",
            "GET /proxy/network/api/s/default/stat/device",
            "POST /api/auth/login",
            "GET /proxy/network/api/s/default/stat/device",
        ]
    );
    assert_eq!(seen[1].header("x-csrf-token"), Some("tok1"));
    assert_eq!(seen[3].header("x-csrf-token"), Some("tok2"));
    assert_eq!(access_points[0].name, "ap1");
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried_again() {
    let (port, mut requests) = spawn_server(vec![
        login_ok(),
        unauthorized(),
        login_ok(),
        unauthorized(),
    ])
    .await;

    let mut controller = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap();
    let error = controller.list_access_points().await.unwrap_err();

    match error {
        ControllerError::Status { url, status } => {
            assert_eq!(status, 401);
            assert!(url.ends_with("/api/s/default/stat/device"), "{url}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(received(&mut requests).len(), 4);
}

#[tokio::test]
async fn test_server_error_on_device_fetch_is_status_error() {
    let (port, _requests) = spawn_server(vec![
        login_ok(),
        CannedResponse::new("500 Internal Server Error", "oops"),
    ])
    .await;

    let mut controller = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap();
    let error = controller.list_access_points().await.unwrap_err();

    assert!(
        matches!(error, ControllerError::Status { status: 500, .. }),
        "{error:?}"
    );
}

#[tokio::test]
async fn test_api_error_envelope_is_api_error() {
    let (port, _requests) = spawn_server(vec![
        login_ok(),
        CannedResponse::new("200 OK", r#"{"meta":{"rc":"error","msg":"api.err.NoSiteContext"}}"#),
    ])
    .await;

    let mut controller = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap();
    let error = controller.list_access_points().await.unwrap_err();

    match error {
        ControllerError::Api { message } => assert_eq!(message, "api.err.NoSiteContext"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_login_fails_connect() {
    let (port, mut requests) = spawn_server(vec![CannedResponse::new(
        "400 Bad Request",
        r#"{"meta":{"rc":"error","msg":"api.err.Invalid"}}"#,
    )])
    .await;

    let error = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap_err();

    match error {
        ControllerError::LoginRejected { username, status } => {
            assert_eq!(username, "admin");
            assert_eq!(status, 400);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(received(&mut requests).len(), 1);
}

#[tokio::test]
async fn test_unreachable_controller_is_transport_error() {
    let port = closed_port().await;

    let error = UnifiController::connect(&controller_config(port, ControllerVersion::V5))
        .await
        .unwrap_err();

    assert!(matches!(error, ControllerError::Transport { .. }), "{error:?}");
}
