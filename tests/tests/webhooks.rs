#![cfg(feature = "testing")]
use hyper::Method;
use nova_launch::{
    models::event::{TokenEvent, TokenEventKind},
    prometheus_handler::{gather, Registry},
    relay::{
        metrics::RelayMetrics,
        webhooks::{DispatchReport, Dispatcher, SubscribeRequest, SubscriptionStore},
    },
    test_utils::fixtures::{mock_token_address, mock_transaction_hash, setup},
};
use rstest::*;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn deploy_event(token: &str) -> TokenEvent {
    TokenEvent {
        id: "0000000123-0000000001".into(),
        kind: TokenEventKind::Deployed,
        contract_id: "CFACTORY".into(),
        ledger: 123,
        transaction_hash: mock_transaction_hash(),
        value: serde_json::json!({ "token": token, "name": "My Token", "symbol": "MTK" }),
    }
}

async fn subscribe(store: &SubscriptionStore, url: String, token: Option<String>, events: Option<Vec<TokenEventKind>>) {
    store.subscribe(SubscribeRequest { url, token_address: token, events }).await.expect("failed to subscribe");
}

async fn mock_receiver(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("POST")).and(path(route)).respond_with(ResponseTemplate::new(status)).mount(server).await;
}

#[rstest]
#[tokio::test]
async fn test_dispatch_posts_to_matching_subscribers(_setup: ()) {
    // Given
    let receiver = MockServer::start().await;
    for route in ["/all", "/token", "/burns", "/other"] {
        mock_receiver(&receiver, route, 200).await;
    }
    let store = Arc::new(SubscriptionStore::new());
    let token = mock_token_address();
    subscribe(&store, format!("{}/all", receiver.uri()), None, None).await;
    subscribe(&store, format!("{}/token", receiver.uri()), Some(token.clone()), Some(vec![TokenEventKind::Deployed]))
        .await;
    subscribe(&store, format!("{}/burns", receiver.uri()), None, Some(vec![TokenEventKind::Burned])).await;
    subscribe(&store, format!("{}/other", receiver.uri()), Some(format!("C{}", "Y".repeat(55))), None).await;

    let registry = Registry::default();
    let dispatcher = Dispatcher::new(store, RelayMetrics::new(&registry).unwrap(), Duration::from_secs(5)).unwrap();

    // When
    let report = dispatcher.dispatch(&deploy_event(&token)).await;

    // Then
    assert_eq!(report, DispatchReport { delivered: 2, failed: 0 });
    let requests = receiver.received_requests().await.unwrap();
    let mut paths: Vec<&str> = requests.iter().map(|request| request.url.path()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["/all", "/token"]);

    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.headers["content-type"], "application/json");
    let payload: Value = request.body_json().unwrap();
    assert_eq!(payload["event"], "token.deployed");
    assert_eq!(payload["data"]["value"]["token"], token);
    assert_eq!(payload["data"]["ledger"], 123);
    assert!(payload["timestamp"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_failed_deliveries_are_counted(_setup: ()) {
    // Given
    let receiver = MockServer::start().await;
    mock_receiver(&receiver, "/broken", 500).await;
    mock_receiver(&receiver, "/fine", 204).await;
    let store = Arc::new(SubscriptionStore::new());
    subscribe(&store, format!("{}/broken", receiver.uri()), None, None).await;
    subscribe(&store, format!("{}/fine", receiver.uri()), None, None).await;
    // Nothing listens on the discard port.
    subscribe(&store, "http://127.0.0.1:9/unreachable".to_string(), None, None).await;

    let registry = Registry::default();
    let dispatcher = Dispatcher::new(store, RelayMetrics::new(&registry).unwrap(), Duration::from_secs(5)).unwrap();

    // When
    let report = dispatcher.dispatch(&deploy_event(&mock_token_address())).await;

    // Then
    assert_eq!(report, DispatchReport { delivered: 1, failed: 2 });
    let exposition = String::from_utf8(gather(&registry).unwrap().body.to_vec()).unwrap();
    assert!(exposition.contains(r#"relay_webhook_deliveries_total{outcome="failure"} 2"#));
    assert!(exposition.contains(r#"relay_webhook_deliveries_total{outcome="success"} 1"#));
}
