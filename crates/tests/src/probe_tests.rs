//! Integration tests for the HTTP probe.
//!
//! These tests verify that one probe call:
//! - returns the JSON-RPC `result` verbatim on success
//! - maps HTTP errors, error envelopes and malformed bodies to failures
//! - gives up after the configured timeout when the endpoint never answers

use nqi_core::upstream::{ProbeError, ProbeFailureKind, RpcProbe};
use serde_json::json;
use std::time::{Duration, Instant};

use crate::mock_infrastructure::{closed_endpoint_url, http_probe, RpcMockBuilder, SilentEndpoint};

fn params() -> serde_json::Value {
    json!([{ "commitment": "confirmed" }])
}

#[tokio::test]
async fn test_probe_get_slot_success() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_get_slot(250_000_123);

    let probe = http_probe(Duration::from_secs(2));
    let result = probe.call(&mock.url(), "getSlot", params()).await.unwrap();

    assert_eq!(result, json!(250_000_123));
}

#[tokio::test]
async fn test_probe_latest_blockhash_success() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_latest_blockhash(42);

    let probe = http_probe(Duration::from_secs(2));
    let result = probe.call(&mock.url(), "getLatestBlockhash", params()).await.unwrap();

    assert_eq!(result["context"]["slot"], 42);
    assert!(result["value"]["blockhash"].is_string());
}

#[tokio::test]
async fn test_probe_http_500_is_transport_failure() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_server_error();

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&mock.url(), "getSlot", params()).await.unwrap_err();

    match &err {
        ProbeError::HttpError(status, body) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("Expected HttpError, got {other:?}"),
    }
    assert_eq!(err.kind(), ProbeFailureKind::Transport);
}

#[tokio::test]
async fn test_probe_http_429_is_failure() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_http_status("getSlot", 429);

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&mock.url(), "getSlot", params()).await.unwrap_err();

    assert!(matches!(err, ProbeError::HttpError(429, _)));
}

#[tokio::test]
async fn test_probe_rpc_error_message_surfaces() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_rpc_error("getLatestBlockhash", -32005, "Node is behind by 120 slots");

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&mock.url(), "getLatestBlockhash", params()).await.unwrap_err();

    match &err {
        ProbeError::RpcError(code, message) => {
            assert_eq!(*code, -32005);
            assert_eq!(message, "Node is behind by 120 slots");
        }
        other => panic!("Expected RpcError, got {other:?}"),
    }
    assert_eq!(err.kind(), ProbeFailureKind::Protocol);
}

#[tokio::test]
async fn test_probe_rpc_error_without_message_uses_default() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_rpc_error_without_message("getSlot");

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&mock.url(), "getSlot", params()).await.unwrap_err();

    match err {
        ProbeError::RpcError(_, message) => assert_eq!(message, "RPC error"),
        other => panic!("Expected RpcError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_probe_malformed_body_is_protocol_failure() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_malformed("getSlot");

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&mock.url(), "getSlot", params()).await.unwrap_err();

    assert!(matches!(err, ProbeError::InvalidResponse(_)));
    assert_eq!(err.kind(), ProbeFailureKind::Protocol);
}

#[tokio::test]
async fn test_probe_times_out_on_silent_endpoint() {
    let endpoint = SilentEndpoint::bind().await;

    let probe = http_probe(Duration::from_millis(200));
    let started = Instant::now();
    let err = probe.call(endpoint.url(), "getSlot", params()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ProbeError::Timeout));
    assert_eq!(err.kind(), ProbeFailureKind::Timeout);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "timeout not enforced: {elapsed:?}");
}

#[tokio::test]
async fn test_probe_connection_refused() {
    let url = closed_endpoint_url().await;

    let probe = http_probe(Duration::from_secs(2));
    let err = probe.call(&url, "getSlot", params()).await.unwrap_err();

    assert!(matches!(err, ProbeError::ConnectionFailed(_)));
    assert_eq!(err.kind(), ProbeFailureKind::Transport);
}
