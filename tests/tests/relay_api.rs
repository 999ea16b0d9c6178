#![cfg(feature = "testing")]
use nova_launch::{
    relay::{
        config::RelayConfig,
        routes::{ROUTE_NOT_FOUND, SUBSCRIPTION_NOT_FOUND, TOO_MANY_REQUESTS},
        run_server, RelayError, RelayState,
    },
    test_utils::fixtures::{mock_token_address, setup},
};
use reqwest::StatusCode;
use rstest::*;
use serde_json::{json, Value};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};

struct Relay {
    url: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), RelayError>>,
}

async fn start_relay(config: RelayConfig) -> Relay {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("failed to bind relay");
    let url = format!("http://{}", listener.local_addr().expect("failed to get local addr"));
    let state = Arc::new(RelayState::new(&config).expect("failed to create relay state"));
    let (shutdown, receiver) = watch::channel(false);
    let task = tokio::spawn(run_server(listener, state, receiver));
    Relay { url, shutdown, task }
}

#[fixture]
fn config() -> RelayConfig {
    RelayConfig::default()
}

#[rstest]
#[tokio::test]
async fn test_health_carries_security_and_cors_headers(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;

    // When
    let response = reqwest::Client::new()
        .get(format!("{}/health", relay.url))
        .header("Origin", "https://app.example.com")
        .send()
        .await
        .unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["access-control-allow-origin"], "*");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[rstest]
#[tokio::test]
async fn test_cors_preflight(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;

    // When
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/webhooks/subscribe", relay.url))
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    // Then
    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[rstest]
#[tokio::test]
async fn test_unknown_route(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;

    // When
    let response = reqwest::get(format!("{}/api/tokens", relay.url)).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "success": false, "error": ROUTE_NOT_FOUND }));
}

#[rstest]
#[tokio::test]
async fn test_webhook_lifecycle(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;
    let client = reqwest::Client::new();
    let token = mock_token_address();

    // When
    let created = client
        .post(format!("{}/api/webhooks/subscribe", relay.url))
        .json(&json!({ "url": "https://hooks.example.com/nova", "tokenAddress": token, "events": ["token.burned"] }))
        .send()
        .await
        .unwrap();

    // Then
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["tokenAddress"], token);
    assert_eq!(created["data"]["events"], json!(["burned"]));
    let id = created["data"]["id"].as_u64().unwrap();

    // When
    let listed: Value =
        client.get(format!("{}/api/webhooks", relay.url)).send().await.unwrap().json().await.unwrap();

    // Then
    assert_eq!(listed["data"][0]["id"], id);

    // When
    let deleted = client.delete(format!("{}/api/webhooks/{id}", relay.url)).send().await.unwrap();
    let deleted_again = client.delete(format!("{}/api/webhooks/{id}", relay.url)).send().await.unwrap();

    // Then
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(deleted_again.status(), StatusCode::NOT_FOUND);
    assert_eq!(deleted_again.json::<Value>().await.unwrap()["error"], SUBSCRIPTION_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_invalid_subscription_is_rejected(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;

    // When
    let response = reqwest::Client::new()
        .post(format!("{}/api/webhooks/subscribe", relay.url))
        .json(&json!({ "url": "https://hooks.example.com", "tokenAddress": "not-a-contract" }))
        .send()
        .await
        .unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please check your input and try again: Invalid token address");
}

#[rstest]
#[tokio::test]
async fn test_rate_limit(_setup: ()) {
    // Given
    let relay = start_relay(RelayConfig { rate_limit_max: NonZeroU32::new(2).unwrap(), ..Default::default() }).await;

    // When
    let mut statuses = Vec::new();
    for _ in 0..3 {
        statuses.push(reqwest::get(format!("{}/health", relay.url)).await.unwrap());
    }

    // Then
    let limited = statuses.pop().unwrap();
    assert!(statuses.iter().all(|response| response.status() == StatusCode::OK));
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.json::<Value>().await.unwrap()["error"], TOO_MANY_REQUESTS);
}

#[rstest]
#[tokio::test]
async fn test_metrics_endpoint(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;
    reqwest::get(format!("{}/health", relay.url)).await.unwrap();

    // When
    let body = reqwest::get(format!("{}/metrics", relay.url)).await.unwrap().text().await.unwrap();

    // Then
    assert!(body.contains(r#"relay_http_requests_total{route="health",status="200"} 1"#));
}

#[rstest]
#[tokio::test]
async fn test_graceful_shutdown(config: RelayConfig, _setup: ()) {
    // Given
    let relay = start_relay(config).await;
    reqwest::get(format!("{}/health", relay.url)).await.unwrap();

    // When
    relay.shutdown.send(true).unwrap();

    // Then
    let result = tokio::time::timeout(Duration::from_secs(15), relay.task).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert!(reqwest::get(format!("{}/health", relay.url)).await.is_err());
}
