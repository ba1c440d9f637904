//! Shared utilities for the HTTP integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use deposit_desk::blockchain::ChainDescriptor;
use deposit_desk::config::ServerConfig;
use deposit_desk::http::{AppState, HttpServer};
use deposit_desk::registrations::FileStore;

/// A server over a fresh store file, without chain access.
pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path().join("storage.json")));
        let state = AppState::new(store, ChainDescriptor::default());
        let router = HttpServer::new(&ServerConfig::default(), state).router();
        Self { dir, router }
    }

    pub fn storage_path(&self) -> std::path::PathBuf {
        self.dir.path().join("storage.json")
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }
}

/// A registration body as the web front end posts it.
pub fn registration(wallet_address: &str, name: &str) -> Value {
    json!({
        "walletAddress": wallet_address,
        "name": name,
        "portfolioLink": "https://example.dev",
        "hasUsedSubstratePolkadot": true,
        "technologiesUsed": {
            "ink": false,
            "evmSolidity": true,
            "polkaVM": false,
            "xcm": false,
            "polkadotJsApi": true
        },
        "precompilesFamiliarity": 3,
        "depositPaid": true,
        "depositTxHash": "0x1234"
    })
}
