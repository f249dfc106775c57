//! Prometheus metrics for probes and snapshots.
//!
//! Recording goes through the `metrics` facade and is a no-op until a recorder is
//! installed, so library code records unconditionally. [`MetricsCollector`] installs the
//! Prometheus recorder once per process and renders the exposition text.
//!
//! Provider names are exposed as label values. Configure generic names if the metrics
//! endpoint is public.

use crate::{
    index::{aggregator::AggregateResult, report::NqiReport},
    types::RpcMethod,
    upstream::errors::ProbeFailureKind,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Snapshot outcome label values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Live,
    Fallback,
}

impl SnapshotOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

fn try_init_prometheus_recorder(
) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match try_init_prometheus_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "failed to install Prometheus recorder, attempting fallback"
                );
                let recorder = PrometheusBuilder::new().build_recorder();
                tracing::warn!("using fallback Prometheus recorder, metrics may not be globally visible");
                recorder.handle()
            }
        })
        .clone()
}

/// Owns the process-wide Prometheus handle.
#[derive(Clone)]
pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    /// Installs the global recorder on first use; later calls share it.
    #[must_use]
    pub fn new() -> Self {
        Self { prometheus_handle: init_prometheus_recorder() }
    }

    /// Prometheus text exposition of every recorded metric.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Records the duration of a successful probe.
pub fn record_probe_success(provider: &str, method: RpcMethod, elapsed: Duration) {
    histogram!(
        "nqi_probe_duration_seconds",
        "provider" => provider.to_string(),
        "method" => method.as_str()
    )
    .record(elapsed.as_secs_f64());
}

/// Counts a failed probe by failure kind.
pub fn record_probe_failure(provider: &str, method: RpcMethod, kind: ProbeFailureKind) {
    counter!(
        "nqi_probe_failures_total",
        "provider" => provider.to_string(),
        "method" => method.as_str(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Publishes headline and per-provider gauges for a live snapshot.
#[allow(clippy::cast_precision_loss)]
pub fn record_aggregate(result: &AggregateResult) {
    gauge!("nqi_index").set(result.nqi);
    gauge!("nqi_index_raw").set(result.nqi_raw);
    gauge!("nqi_success_rate").set(result.success_rate);

    for provider in &result.ranked_providers {
        let name = provider.name.clone();
        gauge!("nqi_provider_health", "provider" => name.clone()).set(f64::from(provider.health));
        gauge!("nqi_provider_latency_ms", "provider" => name.clone())
            .set(provider.raw_median_latency_ms);
        gauge!("nqi_provider_slot_lag", "provider" => name).set(provider.slot_lag as f64);
    }
}

/// Counts a served snapshot. Fallback snapshots also publish the fallback headline.
pub fn record_snapshot(outcome: SnapshotOutcome, report: &NqiReport) {
    counter!("nqi_snapshots_total", "outcome" => outcome.as_str()).increment(1);
    if outcome == SnapshotOutcome::Fallback {
        gauge!("nqi_index").set(report.nqi);
        gauge!("nqi_success_rate").set(report.success_rate);
    }
}
