//! The JSON payload served to dashboards.

use serde::{Deserialize, Serialize};

use super::aggregator::{AggregateResult, RetryPressure, Stability, Trend};
use crate::{
    stats::round1,
    upstream::{provider::ProviderTier, sampler::SamplingConfig, ProviderSummary},
};

/// Placeholder fee efficiency. Not computed from chain data.
pub const DEFAULT_FEE_EFFICIENCY: f64 = 0.00002;

/// Context string served with the fallback payload.
pub const FALLBACK_CONTEXT: &str = "Live sampling unavailable. Serving fallback execution context.";

/// `[response]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Attach the `debug` block to live payloads (default: true)
    #[serde(default = "default_include_debug")]
    pub include_debug: bool,

    /// Value served as `feeEfficiency` (default: 0.00002)
    #[serde(default = "default_fee_efficiency")]
    pub fee_efficiency: f64,

    /// Build stamp. Defaults to the package version.
    #[serde(default)]
    pub build: Option<String>,

    /// Deployment stamp. Defaults to "unknown".
    #[serde(default)]
    pub deployment: Option<String>,
}

fn default_include_debug() -> bool {
    true
}
fn default_fee_efficiency() -> f64 {
    DEFAULT_FEE_EFFICIENCY
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            include_debug: default_include_debug(),
            fee_efficiency: default_fee_efficiency(),
            build: None,
            deployment: None,
        }
    }
}

/// One row of `rpcRankings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRanking {
    pub name: String,
    pub health: u8,
    /// Raw (unfloored) median latency.
    pub latency_ms: u64,
    /// Failure percentage, one decimal.
    pub error_rate: f64,
    pub trend: Trend,
}

/// Per-provider breakdown in the debug block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDebug {
    pub name: String,
    pub tier: ProviderTier,
    pub raw_median_latency_ms: u64,
    pub scored_latency_ms: u64,
    pub jitter_ms: u64,
    pub fail_pct: f64,
    pub observed_slot_median: u64,
    pub slot_lag: u64,
    pub slot_penalty: f64,
    pub base_health: f64,
    pub health: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub samples_per_provider: usize,
    pub timeout_ms: u64,
    pub execution_floor_ms: u64,
    pub sleep_ms: u64,
    pub generation_seconds: u64,
    pub best_slot: u64,
    pub smoothing_alpha: f64,
    pub providers: Vec<ProviderDebug>,
}

/// Payload of `GET /api/nqi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NqiReport {
    /// Smoothed headline, one decimal.
    pub nqi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nqi_raw: Option<f64>,
    pub success_rate: f64,
    pub latency_stability: Stability,
    pub fee_efficiency: f64,
    pub retry_pressure: RetryPressure,
    pub updated_seconds_ago: u64,
    pub rpc_rankings: Vec<RpcRanking>,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl NqiReport {
    /// Static payload served whenever live sampling cannot produce a result.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            nqi: 80.0,
            nqi_raw: None,
            success_rate: 95.0,
            latency_stability: Stability::Stable,
            fee_efficiency: DEFAULT_FEE_EFFICIENCY,
            retry_pressure: RetryPressure::Low,
            updated_seconds_ago: 10,
            rpc_rankings: vec![RpcRanking {
                name: "Public RPC".to_string(),
                health: 75,
                latency_ms: 650,
                error_rate: 3.0,
                trend: Trend::Flat,
            }],
            context: FALLBACK_CONTEXT.to_string(),
            build: None,
            deployment: None,
            debug: None,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.context == FALLBACK_CONTEXT
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_ms(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

/// Shapes an [`AggregateResult`] into an [`NqiReport`].
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    response: ResponseConfig,
    sampling: SamplingConfig,
    smoothing_alpha: f64,
}

impl ReportAssembler {
    #[must_use]
    pub fn new(response: ResponseConfig, sampling: SamplingConfig, smoothing_alpha: f64) -> Self {
        Self { response, sampling, smoothing_alpha }
    }

    #[must_use]
    pub fn assemble(&self, result: &AggregateResult) -> NqiReport {
        let rpc_rankings = result
            .ranked_providers
            .iter()
            .enumerate()
            .map(|(rank, provider)| RpcRanking {
                name: provider.name.clone(),
                health: provider.health,
                latency_ms: whole_ms(provider.raw_median_latency_ms),
                error_rate: round1(provider.fail_pct),
                trend: Trend::for_rank(rank),
            })
            .collect();

        let debug = self.response.include_debug.then(|| self.debug_info(result));

        NqiReport {
            nqi: round1(result.nqi),
            nqi_raw: Some(round1(result.nqi_raw)),
            success_rate: round1(result.success_rate),
            latency_stability: result.stability,
            fee_efficiency: self.response.fee_efficiency,
            retry_pressure: result.retry_pressure,
            updated_seconds_ago: 0,
            rpc_rankings,
            context: result.context.to_string(),
            build: Some(
                self.response.build.clone().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            ),
            deployment: Some(
                self.response.deployment.clone().unwrap_or_else(|| "unknown".to_string()),
            ),
            debug,
        }
    }

    fn debug_info(&self, result: &AggregateResult) -> DebugInfo {
        DebugInfo {
            samples_per_provider: self.sampling.samples_per_provider,
            timeout_ms: self.sampling.timeout_ms,
            execution_floor_ms: self.sampling.execution_floor_ms,
            sleep_ms: self.sampling.sleep_ms,
            generation_seconds: result.generation_seconds,
            best_slot: result.best_slot,
            smoothing_alpha: self.smoothing_alpha,
            providers: result.ranked_providers.iter().map(provider_debug).collect(),
        }
    }
}

fn provider_debug(summary: &ProviderSummary) -> ProviderDebug {
    ProviderDebug {
        name: summary.name.clone(),
        tier: summary.tier,
        raw_median_latency_ms: whole_ms(summary.raw_median_latency_ms),
        scored_latency_ms: whole_ms(summary.scored_latency_ms),
        jitter_ms: whole_ms(summary.jitter_ms),
        fail_pct: summary.fail_pct,
        observed_slot_median: summary.observed_slot_median,
        slot_lag: summary.slot_lag,
        slot_penalty: round1(summary.slot_penalty),
        base_health: round1(summary.base_health),
        health: summary.health,
    }
}
