//! Registration API tests driven through the router.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;

use common::{registration, TestApp};

#[tokio::test]
async fn test_list_is_empty_without_storage_file() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_post_replaces_existing_record() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/registrations", Some(registration("0xABC", "first")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    app.send(Method::POST, "/registrations", Some(registration("0xabc", "second")))
        .await;

    let (_, body) = app.send(Method::GET, "/registrations", None).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "second");
    assert_eq!(records[0]["walletAddress"], "0xabc");
    // Survey answers keep the front end's field names
    assert_eq!(records[0]["technologiesUsed"]["polkaVM"], false);
    assert_eq!(records[0]["precompilesFamiliarity"], 3);
}

#[tokio::test]
async fn test_get_single_registration() {
    let app = TestApp::new();
    app.send(Method::POST, "/registrations", Some(registration("0xabc", "Ada")))
        .await;

    let (status, body) = app.send(Method::GET, "/registrations/0xABC", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let (status, _) = app.send(Method::GET, "/registrations/0xdef", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_wallet_address() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::DELETE, "/registrations", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wallet address is required");

    let (status, _) = app
        .send(Method::DELETE, "/registrations", Some(json!({ "walletAddress": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_key_succeeds() {
    let app = TestApp::new();
    app.send(Method::POST, "/registrations", Some(registration("0x01", "a")))
        .await;

    let (status, body) = app
        .send(Method::DELETE, "/registrations", Some(json!({ "walletAddress": "0x02" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = app.send(Method::GET, "/registrations", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_existing_key() {
    let app = TestApp::new();
    app.send(Method::POST, "/api/storage", Some(registration("0x01", "a")))
        .await;

    let (status, _) = app
        .send(Method::DELETE, "/api/storage", Some(json!({ "walletAddress": "0X01" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send(Method::GET, "/api/storage", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_corrupt_storage_is_server_error() {
    let app = TestApp::new();
    std::fs::write(app.storage_path(), "{ not json").unwrap();

    let (status, body) = app.send(Method::GET, "/registrations", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "StorageIOError");

    let (status, _) = app
        .send(Method::POST, "/registrations", Some(registration("0x01", "a")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_to_string(app.storage_path()).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new();
    let status = app.send_raw(Method::POST, "/registrations", "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::POST, "/registrations", Some(registration("  ", "nobody")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chain_endpoints_unavailable_without_client() {
    let app = TestApp::new();
    for uri in [
        "/contract",
        "/deposits/0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
        "/redemption/0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
    ] {
        let (status, _) = app.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
    }

    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "unconfigured");
}
