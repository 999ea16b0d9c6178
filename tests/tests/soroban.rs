#![cfg(feature = "testing")]
use nova_launch::{
    models::event::TokenEventKind,
    relay::listener::{EventCursor, EventSource, EventSourceError, SorobanEventSource},
    test_utils::{
        fixtures::setup,
        wiremock_utils::{received_json, rpc_error, setup_soroban_wiremock},
    },
};
use rstest::*;
use serde_json::{json, Value};
use url::Url;
use wiremock::{matchers::any, Mock, MockServer, ResponseTemplate};

const FACTORY: &str = "CFACTORYXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
const CURSOR: &str = "0000004299262263297-0000000002";

fn event(id: &str, topic: &str, token: &str) -> Value {
    json!({
        "type": "contract",
        "ledger": 1001,
        "ledgerClosedAt": "2024-01-15T10:30:00Z",
        "contractId": FACTORY,
        "id": id,
        "inSuccessfulContractCall": true,
        "txHash": "cd".repeat(32),
        "topicJson": [{ "symbol": topic }, { "address": token }],
        "valueJson": { "map": [
            { "key": { "symbol": "token" }, "val": { "address": token } },
            { "key": { "symbol": "amount" }, "val": { "i128": "2500" } }
        ]}
    })
}

async fn soroban_rpc() -> MockServer {
    let events = vec![
        event("0000004299262263297-0000000001", "deploy", "CTOKENA"),
        event("0000004299262263297-0000000002", "set_admin", "CTOKENA"),
        event("0000004299262263297-0000000003", "burn", "CTOKENB"),
    ];
    setup_soroban_wiremock(1000, events, CURSOR).await
}

fn source(server: &MockServer) -> SorobanEventSource {
    SorobanEventSource::new(Url::parse(&server.uri()).unwrap(), FACTORY).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_latest_ledger(_setup: ()) {
    // Given
    let rpc = soroban_rpc().await;

    // When
    let ledger = source(&rpc).latest_ledger().await.unwrap();

    // Then
    assert_eq!(ledger, 1000);
    let request = &received_json(&rpc).await[0];
    assert_eq!(request["jsonrpc"], "2.0");
    assert_eq!(request["method"], "getLatestLedger");
    assert!(request.get("params").is_none());
}

#[rstest]
#[tokio::test]
async fn test_events_from_ledger(_setup: ()) {
    // Given
    let rpc = soroban_rpc().await;

    // When
    let page = source(&rpc).events(&EventCursor::Ledger(1000)).await.unwrap();

    // Then
    let kinds: Vec<TokenEventKind> = page.events.iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![TokenEventKind::Deployed, TokenEventKind::Burned]);
    assert_eq!(page.events[0].token_address(), "CTOKENA");
    assert_eq!(page.events[1].token_address(), "CTOKENB");
    assert_eq!(page.events[1].value["amount"], "2500");
    assert_eq!(page.events[0].transaction_hash, "cd".repeat(32));
    assert_eq!(page.cursor.as_deref(), Some(CURSOR));

    let params = &received_json(&rpc).await[0]["params"];
    assert_eq!(params["startLedger"], 1000);
    assert_eq!(params["xdrFormat"], "json");
    assert_eq!(params["filters"][0]["contractIds"], json!([FACTORY]));
}

#[rstest]
#[tokio::test]
async fn test_events_from_cursor(_setup: ()) {
    // Given
    let rpc = soroban_rpc().await;

    // When
    source(&rpc).events(&EventCursor::Token("0000000001-0000000001".into())).await.unwrap();

    // Then
    let params = &received_json(&rpc).await[0]["params"];
    assert!(params.get("startLedger").is_none());
    assert_eq!(params["pagination"]["cursor"], "0000000001-0000000001");
}

#[rstest]
#[tokio::test]
async fn test_rpc_errors(_setup: ()) {
    // Given
    let rpc = MockServer::start().await;
    Mock::given(any()).respond_with(rpc_error(-32600, "bad ledger")).mount(&rpc).await;

    // When
    let err = source(&rpc).latest_ledger().await.unwrap_err();

    // Then
    assert!(matches!(err, EventSourceError::Rpc { code: -32600, ref message } if message == "bad ledger"));
}

#[rstest]
#[tokio::test]
async fn test_http_errors(_setup: ()) {
    // Given
    let rpc = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(503)).mount(&rpc).await;

    // Then
    assert!(matches!(source(&rpc).latest_ledger().await, Err(EventSourceError::Http(_))));
}
