//! Integration tests for the HTTP surface backed by mocked providers.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use nqi_core::{config::AppConfig, index::SnapshotService, metrics::MetricsCollector};
use serde_json::Value;
use server::{create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt;

use crate::mock_infrastructure::{fast_config, with_providers, RpcMockBuilder};

fn build_app(config: &AppConfig) -> Router {
    let service = Arc::new(SnapshotService::from_config(config).unwrap());
    create_app(AppState::new(service, MetricsCollector::new()), &config.server)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response =
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_api_nqi_end_to_end() {
    let mut premium = RpcMockBuilder::new().await;
    premium.mock_healthy(300_000_000);
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(300_000_000);

    let mut config = fast_config(3, 2000);
    config.response.build = Some("v-test".to_string());
    config.response.deployment = Some("nqi.example.com".to_string());
    with_providers(&mut config, &[("Helius", premium.url())], public.url());

    let (status, body) = get_json(build_app(&config), "/api/nqi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["build"], "v-test");
    assert_eq!(body["deployment"], "nqi.example.com");
    assert_eq!(body["successRate"], 100.0);
    assert_eq!(body["retryPressure"], "Low");
    assert_eq!(body["feeEfficiency"], 0.00002);
    assert_eq!(body["rpcRankings"].as_array().unwrap().len(), 2);
    assert_eq!(body["rpcRankings"][0]["trend"], "up");
    assert_eq!(body["rpcRankings"][1]["trend"], "flat");
    assert_eq!(body["debug"]["bestSlot"], 300_000_000_u64);
    assert!(body["nqiRaw"].is_number());
}

#[tokio::test]
async fn test_api_nqi_debug_block_can_be_disabled() {
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(10);

    let mut config = fast_config(2, 2000);
    config.response.include_debug = false;
    config.providers.public_url = public.url();

    let (status, body) = get_json(build_app(&config), "/api/nqi").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("debug").is_none());
    assert_eq!(body["rpcRankings"][0]["name"], "Public RPC");
}

#[tokio::test]
async fn test_api_nqi_outage_still_200() {
    let mut public = RpcMockBuilder::new().await;
    public.mock_server_error();

    let mut config = fast_config(2, 2000);
    config.providers.public_url = public.url();

    let (status, body) = get_json(build_app(&config), "/api/nqi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nqi"], 80.0);
    assert_eq!(body["successRate"], 95.0);
    assert_eq!(body["rpcRankings"][0]["latencyMs"], 650);
    assert_eq!(
        body["context"],
        "Live sampling unavailable. Serving fallback execution context."
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(10);

    let mut config = fast_config(1, 2000);
    config.providers.public_url = public.url();

    let request = Request::builder()
        .uri("/api/nqi")
        .header("x-request-id", "dashboard-poll-42")
        .body(Body::empty())
        .unwrap();
    let response = build_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "dashboard-poll-42");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
}
