//! Per-provider batch sampling.
//!
//! A sampler runs a fixed number of strictly sequential probes against one provider,
//! alternating `getLatestBlockhash` and `getSlot`, sleeping a fixed interval after each
//! one. The batch is then reduced to a [`ProviderSummary`].

use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::{
    probe::RpcProbe,
    provider::{ProviderConfig, ProviderTier},
    scoring::ScoringConfig,
};
use crate::{
    metrics,
    stats::{median, round1, std_dev},
    types::{commitment_params, RpcMethod},
};

/// Reported median latency of a provider with no successful probe.
pub const DEGRADED_LATENCY_MS: f64 = 2000.0;
/// Reported jitter of a provider with no successful probe.
pub const DEGRADED_JITTER_MS: f64 = 300.0;

/// Configuration for provider sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Probes per provider per snapshot (default: 7)
    #[serde(default = "default_samples_per_provider")]
    pub samples_per_provider: usize,

    /// Pause after each probe in milliseconds (default: 120)
    #[serde(default = "default_sleep_ms")]
    pub sleep_ms: u64,

    /// Per-probe timeout in milliseconds (default: 2500)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Latency floor applied before scoring, in milliseconds (default: 120)
    #[serde(default = "default_execution_floor_ms")]
    pub execution_floor_ms: u64,

    /// Issue one discarded `getSlot` before the batch (default: true)
    #[serde(default = "default_warmup")]
    pub warmup: bool,

    /// Commitment level sent with every probe (default: "confirmed")
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Optional deadline for a whole snapshot in milliseconds. Unset means no deadline.
    #[serde(default)]
    pub overall_deadline_ms: Option<u64>,
}

fn default_samples_per_provider() -> usize {
    7
}
fn default_sleep_ms() -> u64 {
    120
}
fn default_timeout_ms() -> u64 {
    2500
}
fn default_execution_floor_ms() -> u64 {
    120
}
fn default_warmup() -> bool {
    true
}
fn default_commitment() -> String {
    "confirmed".to_string()
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples_per_provider: default_samples_per_provider(),
            sleep_ms: default_sleep_ms(),
            timeout_ms: default_timeout_ms(),
            execution_floor_ms: default_execution_floor_ms(),
            warmup: default_warmup(),
            commitment: default_commitment(),
            overall_deadline_ms: None,
        }
    }
}

impl SamplingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    #[must_use]
    pub fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline_ms.map(Duration::from_millis)
    }

    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.samples_per_provider == 0 {
            return Err("samples_per_provider must be greater than 0".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.commitment.trim().is_empty() {
            return Err("commitment cannot be empty".to_string());
        }
        if self.overall_deadline_ms == Some(0) {
            return Err("overall_deadline_ms must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}

/// Reduction of one provider's probe batch.
///
/// `slot_lag`, `slot_penalty` and `health` are provisional until the aggregator has seen
/// every provider: the sampler alone cannot know the freshest slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub name: String,
    pub tier: ProviderTier,
    /// True median of successful latencies, rounded to whole milliseconds.
    pub raw_median_latency_ms: f64,
    /// `max(execution_floor_ms, raw_median_latency_ms)`.
    pub scored_latency_ms: f64,
    pub jitter_ms: f64,
    pub fail_pct: f64,
    /// Median `getSlot` result, `0` when no slot was observed.
    pub observed_slot_median: u64,
    pub base_health: f64,
    pub slot_lag: u64,
    pub slot_penalty: f64,
    pub health: u8,
    pub successful_samples: usize,
}

impl ProviderSummary {
    /// Summary for a provider whose every probe failed.
    #[must_use]
    pub fn degraded(provider: &ProviderConfig) -> Self {
        Self {
            name: provider.name.clone(),
            tier: provider.tier,
            raw_median_latency_ms: DEGRADED_LATENCY_MS,
            scored_latency_ms: DEGRADED_LATENCY_MS,
            jitter_ms: DEGRADED_JITTER_MS,
            fail_pct: 100.0,
            observed_slot_median: 0,
            base_health: 0.0,
            slot_lag: 0,
            slot_penalty: 0.0,
            health: 0,
            successful_samples: 0,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.successful_samples == 0
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.tier == ProviderTier::Premium
    }
}

/// Raw observations from one batch, before reduction.
#[derive(Debug, Default)]
struct Batch {
    latencies_ms: Vec<f64>,
    slots: Vec<f64>,
    failures: usize,
}

/// Runs probe batches against single providers.
pub struct ProviderSampler {
    probe: Arc<dyn RpcProbe>,
    sampling: SamplingConfig,
    scoring: ScoringConfig,
}

impl ProviderSampler {
    #[must_use]
    pub fn new(probe: Arc<dyn RpcProbe>, sampling: SamplingConfig, scoring: ScoringConfig) -> Self {
        Self { probe, sampling, scoring }
    }

    #[must_use]
    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    #[must_use]
    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Samples one provider and reduces the batch.
    ///
    /// Never fails: every probe error is absorbed as one failed sample.
    pub async fn sample(&self, provider: &ProviderConfig) -> ProviderSummary {
        let params = commitment_params(&self.sampling.commitment);

        if self.sampling.warmup {
            // Absorbs cold-connection setup; the outcome is discarded.
            if let Err(e) = self
                .probe
                .call(&provider.endpoint_url, RpcMethod::GetSlot.as_str(), params.clone())
                .await
            {
                trace!(provider = %provider.name, error = %e, "warm-up probe failed");
            }
        }

        let mut batch = Batch::default();
        for index in 0..self.sampling.samples_per_provider {
            let method = RpcMethod::for_sample(index);
            let started = Instant::now();
            let result = self.probe.call(&provider.endpoint_url, method.as_str(), params.clone()).await;
            let elapsed = started.elapsed();

            match result {
                Ok(value) => {
                    metrics::record_probe_success(&provider.name, method, elapsed);
                    batch.latencies_ms.push(elapsed.as_secs_f64() * 1000.0);
                    if method == RpcMethod::GetSlot {
                        match value.as_u64() {
                            #[allow(clippy::cast_precision_loss)]
                            Some(slot) => batch.slots.push(slot as f64),
                            None => trace!(provider = %provider.name, "getSlot returned a non-integer result"),
                        }
                    }
                }
                Err(e) => {
                    metrics::record_probe_failure(&provider.name, method, e.kind());
                    debug!(
                        provider = %provider.name,
                        method = %method,
                        kind = e.kind().as_str(),
                        error = %e,
                        "probe failed"
                    );
                    batch.failures += 1;
                }
            }

            tokio::time::sleep(self.sampling.sleep()).await;
        }

        self.reduce(provider, &batch)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn reduce(&self, provider: &ProviderConfig, batch: &Batch) -> ProviderSummary {
        let Some(raw_median) = median(&batch.latencies_ms).map(f64::round) else {
            warn!(
                provider = %provider.name,
                failures = batch.failures,
                "every probe failed, provider degraded"
            );
            return ProviderSummary::degraded(provider);
        };

        let scored_latency = raw_median.max(self.sampling.execution_floor_ms as f64);
        let jitter = std_dev(&batch.latencies_ms).round();
        let fail_pct =
            round1(batch.failures as f64 / self.sampling.samples_per_provider as f64 * 100.0);
        let observed_slot_median = median(&batch.slots).map_or(0, |m| m.round() as u64);
        let base_health = self.scoring.base_health(scored_latency, jitter, fail_pct);
        debug!(
            provider = %provider.name,
            raw_median_ms = raw_median,
            jitter_ms = jitter,
            fail_pct,
            observed_slot_median,
            "provider sampled"
        );

        ProviderSummary {
            name: provider.name.clone(),
            tier: provider.tier,
            raw_median_latency_ms: raw_median,
            scored_latency_ms: scored_latency,
            jitter_ms: jitter,
            fail_pct,
            observed_slot_median,
            base_health,
            slot_lag: 0,
            slot_penalty: 0.0,
            health: super::scoring::health(base_health, 0.0),
            successful_samples: batch.latencies_ms.len(),
        }
    }
}
