#![cfg(feature = "testing")]
use hyper::Method;
use nova_launch::{
    config::IpfsConfig,
    errors::ErrorCode,
    ipfs::{IpfsMetadata, PinataClient},
    test_utils::{
        fixtures::{mock_image, setup},
        wiremock_utils::{setup_pinata_wiremock, MOCK_IMAGE_CID, MOCK_METADATA_CID},
    },
};
use rstest::*;
use serde_json::{json, Value};
use url::Url;
use wiremock::{matchers::any, Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> PinataClient {
    let mut config = IpfsConfig::new("key-123", "secret-456");
    config.api_url = Url::parse(&server.uri()).unwrap();
    PinataClient::new(config).unwrap()
}

fn metadata() -> IpfsMetadata {
    IpfsMetadata { name: "My Token".into(), description: "The token of the tests".into() }
}

#[rstest]
#[tokio::test]
async fn test_upload_pins_image_then_metadata(_setup: ()) {
    // Given
    let server = setup_pinata_wiremock().await;
    let image = mock_image("logo.png", 2048, "image/png");

    // When
    let result = client(&server).upload(&image, &metadata()).await.unwrap();

    // Then
    assert_eq!(result.image_cid, MOCK_IMAGE_CID);
    assert_eq!(result.metadata_cid, MOCK_METADATA_CID);
    assert_eq!(result.image_url, "https://gateway.pinata.cloud/ipfs/QmImage");
    assert_eq!(result.metadata_url, "https://gateway.pinata.cloud/ipfs/QmMetadata");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let file = &requests[0];
    assert_eq!(file.url.path(), "/pinning/pinFileToIPFS");
    assert_eq!(file.headers["pinata_api_key"], "key-123");
    assert_eq!(file.headers["pinata_secret_api_key"], "secret-456");
    assert!(file.headers["content-type"].to_str().unwrap().starts_with("multipart/form-data"));
    assert!(String::from_utf8_lossy(&file.body).contains(r#"filename="logo.png""#));

    let document: Value = requests[1].body_json().unwrap();
    assert_eq!(requests[1].url.path(), "/pinning/pinJSONToIPFS");
    assert_eq!(
        document["pinataContent"],
        json!({ "name": "My Token", "description": "The token of the tests", "image": "ipfs://QmImage" })
    );
}

#[rstest]
#[tokio::test]
async fn test_oversized_image_is_rejected_locally(_setup: ()) {
    // Given
    let server = setup_pinata_wiremock().await;
    let image = mock_image("huge.png", 5 * 1024 * 1024 + 1, "image/png");

    // When
    let err = client(&server).upload(&image, &metadata()).await.unwrap_err();

    // Then
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.details.as_deref(), Some("File size must be less than 5MB"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_rejected_credentials(_setup: ()) {
    // Given
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key" })))
        .mount(&server)
        .await;
    let client = client(&server);

    // When
    let err = client.upload(&mock_image("logo.svg", 64, "image/svg+xml"), &metadata()).await.unwrap_err();

    // Then
    assert_eq!(err.code, ErrorCode::IpfsUploadFailed);
    assert!(err.details.unwrap().contains("401"));
    assert!(!client.test_connection().await);
}

#[rstest]
#[tokio::test]
async fn test_connection_and_unpin(_setup: ()) {
    // Given
    let server = setup_pinata_wiremock().await;
    let client = client(&server);

    // Then
    assert!(client.test_connection().await);
    client.unpin(MOCK_IMAGE_CID).await.unwrap();
    let unpin = server.received_requests().await.unwrap().pop().unwrap();
    assert_eq!(unpin.method, Method::DELETE);
    assert_eq!(unpin.url.path(), "/pinning/unpin/QmImage");
}
