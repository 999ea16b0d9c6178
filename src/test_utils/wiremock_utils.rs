use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

pub const MOCK_IMAGE_CID: &str = "QmImage";
pub const MOCK_METADATA_CID: &str = "QmMetadata";

/// A JSON-RPC success envelope around `result`.
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

/// A JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } }))
}

/// Answers the JSON-RPC `rpc_method` with `result`.
pub fn mock_rpc_method(rpc_method: &str, result: Value) -> Mock {
    Mock::given(method("POST")).and(body_partial_json(json!({ "method": rpc_method }))).respond_with(rpc_result(result))
}

pub fn mock_pin_file() -> Mock {
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": MOCK_IMAGE_CID, "PinSize": 10 })))
}

pub fn mock_pin_json() -> Mock {
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": MOCK_METADATA_CID, "PinSize": 2 })))
}

pub fn mock_test_authentication() -> Mock {
    Mock::given(method("GET"))
        .and(path("/data/testAuthentication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Congratulations!" })))
}

pub fn mock_unpin() -> Mock {
    Mock::given(method("DELETE")).and(path_regex("^/pinning/unpin/.+$")).respond_with(ResponseTemplate::new(200))
}

/// Starts a server answering the pinning service endpoints used by the
/// uploader.
pub async fn setup_pinata_wiremock() -> MockServer {
    let mock_server = MockServer::start().await;

    mock_pin_file().mount(&mock_server).await;
    mock_pin_json().mount(&mock_server).await;
    mock_test_authentication().mount(&mock_server).await;
    mock_unpin().mount(&mock_server).await;

    mock_server
}

/// Starts a Soroban RPC server at ledger `latest_ledger` returning `events`
/// from `getEvents`, paginated by `cursor`.
pub async fn setup_soroban_wiremock(latest_ledger: u64, events: Vec<Value>, cursor: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    mock_rpc_method("getLatestLedger", json!({ "id": "abc", "protocolVersion": 22, "sequence": latest_ledger }))
        .mount(&mock_server)
        .await;
    mock_rpc_method("getEvents", json!({ "latestLedger": latest_ledger + 2, "cursor": cursor, "events": events }))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Bodies of every request `server` received, parsed as JSON.
pub async fn received_json(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.body_json().unwrap_or_default())
        .collect()
}
