//! Fan-out sampling and headline index computation.
//!
//! One aggregation samples every provider concurrently, then in order:
//!
//! 1. penalizes each provider for trailing the freshest observed slot,
//! 2. averages premium healths into the headline (all providers when none are premium),
//! 3. deducts for public-endpoint failures and for an unstable best provider,
//! 4. clamps to `[0, 98]` and folds the result into the smoother.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use super::smoothing::NqiSmoother;
use crate::{
    stats::{clamp, mean},
    upstream::{
        provider::{ProviderSet, ProviderTier},
        sampler::{ProviderSampler, ProviderSummary},
        scoring,
    },
};

/// Highest headline value the index may report.
pub const NQI_CEILING: f64 = 98.0;

/// Canned context strings, keyed by success rate and stability.
pub const CONTEXT_BASELINE: &str =
    "Trader-region execution remains above baseline. Current conditions favor standard routing.";
pub const CONTEXT_ELEVATED_RETRIES: &str =
    "Execution is stable, but elevated retries detected on some routes in this region.";
pub const CONTEXT_STRESSED: &str =
    "Execution quality is stressed in this region. Expect retries and inconsistent confirmation latency.";

/// Errors that prevent a live aggregate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no providers configured")]
    NoProviders,

    /// Every probe against every provider failed.
    #[error("no provider returned a successful probe")]
    NoLiveSamples,
}

/// Latency stability of the best provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    Volatile,
    Degrading,
}

impl Stability {
    /// Classifies from the best provider's statistics. Degrading takes precedence.
    #[must_use]
    pub fn classify(scored_latency_ms: f64, jitter_ms: f64, fail_pct: f64) -> Self {
        if fail_pct >= 15.0 || scored_latency_ms >= 900.0 {
            Self::Degrading
        } else if jitter_ms >= 180.0 {
            Self::Volatile
        } else {
            Self::Stable
        }
    }

    /// Points deducted from the headline.
    #[must_use]
    pub const fn penalty(&self) -> f64 {
        match self {
            Self::Stable => 0.0,
            Self::Volatile => 3.0,
            Self::Degrading => 7.0,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Volatile => "Volatile",
            Self::Degrading => "Degrading",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetryPressure {
    Low,
    Medium,
    High,
}

impl RetryPressure {
    #[must_use]
    pub fn from_success_rate(success_rate: f64) -> Self {
        if success_rate >= 97.0 {
            Self::Low
        } else if success_rate >= 90.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RetryPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display hint for a ranking row. Rank-based, not a time-series derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Flat,
}

impl Trend {
    /// Top-ranked provider is `Up`, everyone else `Flat`.
    #[must_use]
    pub const fn for_rank(rank: usize) -> Self {
        if rank == 0 {
            Self::Up
        } else {
            Self::Flat
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the canned context string.
#[must_use]
pub fn context_message(success_rate: f64, stability: Stability) -> &'static str {
    if success_rate >= 95.0 && stability == Stability::Stable {
        CONTEXT_BASELINE
    } else if success_rate >= 88.0 {
        CONTEXT_ELEVATED_RETRIES
    } else {
        CONTEXT_STRESSED
    }
}

/// Output of one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Smoothed headline, within `[0, 98]`.
    pub nqi: f64,
    /// Headline before smoothing, within `[0, 98]`.
    pub nqi_raw: f64,
    /// `100 - mean(fail_pct)`, within `[0, 100]`.
    pub success_rate: f64,
    pub stability: Stability,
    pub retry_pressure: RetryPressure,
    /// Finalized summaries, descending by health. Ties keep configuration order.
    pub ranked_providers: Vec<ProviderSummary>,
    pub context: &'static str,
    /// Freshest observed slot, `0` if none.
    pub best_slot: u64,
    pub generation_seconds: u64,
}

/// Runs samplers for every provider and blends their summaries.
///
/// Owns the smoothing state; nothing else reads or writes it.
pub struct Aggregator {
    sampler: ProviderSampler,
    smoother: NqiSmoother,
}

impl Aggregator {
    #[must_use]
    pub fn new(sampler: ProviderSampler, smoother: NqiSmoother) -> Self {
        Self { sampler, smoother }
    }

    #[must_use]
    pub fn sampler(&self) -> &ProviderSampler {
        &self.sampler
    }

    #[must_use]
    pub fn smoother(&self) -> &NqiSmoother {
        &self.smoother
    }

    /// Samples every provider concurrently and computes the index.
    ///
    /// Individual provider failures are absorbed into their summaries.
    ///
    /// # Errors
    ///
    /// - [`AggregateError::NoProviders`] if `providers` is empty
    /// - [`AggregateError::NoLiveSamples`] if not a single probe succeeded
    pub async fn aggregate(&self, providers: &ProviderSet) -> Result<AggregateResult, AggregateError> {
        if providers.is_empty() {
            return Err(AggregateError::NoProviders);
        }

        let started = Instant::now();
        let summaries =
            join_all(providers.providers().iter().map(|provider| self.sampler.sample(provider)))
                .await;

        if summaries.iter().all(ProviderSummary::is_degraded) {
            return Err(AggregateError::NoLiveSamples);
        }

        let mut result = self.blend(summaries);
        result.generation_seconds = generation_seconds(started.elapsed().as_secs_f64());

        info!(
            nqi = result.nqi,
            nqi_raw = result.nqi_raw,
            success_rate = result.success_rate,
            stability = %result.stability,
            providers = result.ranked_providers.len(),
            generation_seconds = result.generation_seconds,
            "aggregate computed"
        );

        Ok(result)
    }

    /// Finalizes slot penalties and computes the headline from sampled summaries.
    ///
    /// `summaries` must be non-empty. Advances the smoother.
    #[must_use]
    pub fn blend(&self, summaries: Vec<ProviderSummary>) -> AggregateResult {
        let scoring_config = self.sampler.scoring();

        let best_slot = summaries.iter().map(|s| s.observed_slot_median).max().unwrap_or(0);
        let mut summaries: Vec<ProviderSummary> = summaries
            .into_iter()
            .map(|mut summary| {
                summary.slot_lag = if summary.observed_slot_median == 0 {
                    // Unknown freshness is never treated as fresh.
                    scoring_config.max_slot_lag
                } else {
                    best_slot.saturating_sub(summary.observed_slot_median)
                };
                summary.slot_penalty = scoring_config.slot_lag_penalty(summary.slot_lag);
                summary.health = scoring::health(summary.base_health, summary.slot_penalty);
                summary
            })
            .collect();

        let fail_pcts: Vec<f64> = summaries.iter().map(|s| s.fail_pct).collect();
        let success_rate = clamp(100.0 - mean(&fail_pcts).unwrap_or(100.0), 0.0, 100.0);

        let healths = |premium_only: bool| -> Vec<f64> {
            summaries
                .iter()
                .filter(|s| !premium_only || s.is_premium())
                .map(|s| f64::from(s.health))
                .collect()
        };
        let premium_healths = healths(true);
        let mut headline = if premium_healths.is_empty() {
            mean(&healths(false)).unwrap_or(0.0)
        } else {
            mean(&premium_healths).unwrap_or(0.0)
        };

        if let Some(public) = summaries.iter().find(|s| s.tier == ProviderTier::Public) {
            if public.fail_pct >= 30.0 {
                headline -= 4.0;
            } else if public.fail_pct >= 15.0 {
                headline -= 2.0;
            }
        }

        // Stable sort: ties keep configuration order.
        summaries.sort_by(|a, b| b.health.cmp(&a.health));

        let stability = summaries.first().map_or(Stability::Degrading, |best| {
            Stability::classify(best.scored_latency_ms, best.jitter_ms, best.fail_pct)
        });
        headline -= stability.penalty();

        let nqi_raw = clamp(headline, 0.0, NQI_CEILING);
        let nqi = clamp(self.smoother.apply(nqi_raw), 0.0, NQI_CEILING);

        debug!(best_slot, nqi_raw, nqi, "headline blended");

        AggregateResult {
            nqi,
            nqi_raw,
            success_rate,
            stability,
            retry_pressure: RetryPressure::from_success_rate(success_rate),
            context: context_message(success_rate, stability),
            ranked_providers: summaries,
            best_slot,
            generation_seconds: 1,
        }
    }
}

/// `max(1, round(elapsed_seconds))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn generation_seconds(elapsed_seconds: f64) -> u64 {
    (elapsed_seconds.round().max(1.0)) as u64
}
