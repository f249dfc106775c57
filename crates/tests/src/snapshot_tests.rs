//! Integration tests for the full snapshot path over real HTTP.
//!
//! These tests verify that:
//! - healthy providers produce a live payload with slot lag measured against the best slot
//! - partial failures lower the failure share without aborting the snapshot
//! - a total outage is served as the canned fallback payload

use nqi_core::index::{DebugInfo, NqiReport, SnapshotService, Stability};
use std::time::{Duration, Instant};

use crate::mock_infrastructure::{fast_config, with_providers, RpcMockBuilder, SilentEndpoint};

fn provider<'a>(debug: &'a DebugInfo, name: &str) -> &'a nqi_core::index::report::ProviderDebug {
    debug.providers.iter().find(|p| p.name == name).unwrap()
}

#[tokio::test]
async fn test_live_snapshot_with_slot_lag() {
    let mut quicknode = RpcMockBuilder::new().await;
    quicknode.mock_healthy(250_000_000);
    let mut helius = RpcMockBuilder::new().await;
    helius.mock_healthy(250_000_000);
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(249_999_995);

    let mut config = fast_config(4, 2000);
    with_providers(
        &mut config,
        &[("QuickNode", quicknode.url()), ("Helius", helius.url())],
        public.url(),
    );

    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;

    assert!(!report.is_fallback());
    assert_eq!(report.success_rate, 100.0);
    assert_eq!(report.latency_stability, Stability::Stable);
    assert_eq!(report.rpc_rankings.len(), 3);
    assert!((0.0..=98.0).contains(&report.nqi));
    assert_eq!(report.updated_seconds_ago, 0);

    let debug = report.debug.as_ref().unwrap();
    assert_eq!(debug.best_slot, 250_000_000);
    assert_eq!(debug.samples_per_provider, 4);
    assert_eq!(provider(debug, "QuickNode").slot_lag, 0);
    assert_eq!(provider(debug, "Helius").slot_lag, 0);

    let public_debug = provider(debug, "Public RPC");
    assert_eq!(public_debug.slot_lag, 5);
    assert_eq!(public_debug.slot_penalty, 0.6);
    // Localhost latency sits under the execution floor.
    assert_eq!(public_debug.scored_latency_ms, 120);
    assert_eq!(public_debug.fail_pct, 0.0);
}

#[tokio::test]
async fn test_blockhash_errors_count_as_failures() {
    let mut premium = RpcMockBuilder::new().await;
    premium.mock_get_slot(1_000).mock_rpc_error("getLatestBlockhash", -32005, "Node is behind");
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(1_000);

    let mut config = fast_config(4, 2000);
    with_providers(&mut config, &[("Helius", premium.url())], public.url());

    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;

    assert!(!report.is_fallback());
    let debug = report.debug.as_ref().unwrap();
    let helius = provider(debug, "Helius");
    // Even sample indices call getLatestBlockhash.
    assert_eq!(helius.fail_pct, 50.0);
    assert_eq!(helius.observed_slot_median, 1_000);
    assert_eq!(report.success_rate, 75.0);

    let helius_rank = report.rpc_rankings.iter().find(|r| r.name == "Helius").unwrap();
    assert_eq!(helius_rank.error_rate, 50.0);
}

#[tokio::test]
async fn test_dead_premium_does_not_abort_snapshot() {
    let mut premium = RpcMockBuilder::new().await;
    premium.mock_server_error();
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(500);

    let mut config = fast_config(3, 2000);
    with_providers(&mut config, &[("QuickNode", premium.url())], public.url());

    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;

    assert!(!report.is_fallback());
    assert_eq!(report.success_rate, 50.0);
    assert_eq!(report.rpc_rankings[0].name, "Public RPC");
    assert_eq!(report.rpc_rankings[1].name, "QuickNode");
    assert_eq!(report.rpc_rankings[1].health, 0);
    assert_eq!(report.rpc_rankings[1].error_rate, 100.0);
}

#[tokio::test]
async fn test_silent_premium_times_out_per_probe() {
    let silent = SilentEndpoint::bind().await;
    let mut public = RpcMockBuilder::new().await;
    public.mock_healthy(2_000);

    let mut config = fast_config(2, 150);
    with_providers(&mut config, &[("Helius", silent.url().to_string())], public.url());

    let started = Instant::now();
    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;
    let elapsed = started.elapsed();

    assert!(!report.is_fallback());
    let helius = provider(report.debug.as_ref().unwrap(), "Helius");
    assert_eq!(helius.fail_pct, 100.0);
    assert_eq!(helius.health, 0);
    // Two sequential probes, each cut at the timeout.
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(3), "probes not bounded: {elapsed:?}");
}

#[tokio::test]
async fn test_total_outage_serves_fallback() {
    let mut premium = RpcMockBuilder::new().await;
    premium.mock_server_error();
    let mut public = RpcMockBuilder::new().await;
    public.mock_server_error();

    let mut config = fast_config(3, 2000);
    with_providers(&mut config, &[("QuickNode", premium.url())], public.url());

    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;

    assert_eq!(report, NqiReport::fallback());
    let body = serde_json::to_value(&report).unwrap();
    assert_eq!(body["updatedSecondsAgo"], 10);
    assert!(body.get("debug").is_none());
    assert!(body.get("nqiRaw").is_none());
}

#[tokio::test]
async fn test_overall_deadline_serves_fallback() {
    let silent = SilentEndpoint::bind().await;

    let mut config = fast_config(5, 1000);
    config.sampling.overall_deadline_ms = Some(200);
    config.providers.public_url = silent.url().to_string();

    let started = Instant::now();
    let report = SnapshotService::from_config(&config).unwrap().snapshot().await;

    assert!(report.is_fallback());
    assert!(started.elapsed() < Duration::from_secs(2));
}
