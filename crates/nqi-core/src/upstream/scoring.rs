//! Scoring curves for provider health.
//!
//! Each statistic maps onto a 0-100 sub-score through a tuned curve. Sub-scores are
//! blended into a continuous base health, and a slot-lag penalty relative to the freshest
//! provider in the same snapshot is subtracted to produce the integer health.
//!
//! Everything here is pure: identical inputs always give identical outputs.

use crate::stats::clamp;
use serde::{Deserialize, Serialize};

/// Latency curve domain, in milliseconds.
const LATENCY_MIN_MS: f64 = 50.0;
const LATENCY_MAX_MS: f64 = 2500.0;

/// Jitter above this many milliseconds is treated as this value.
const JITTER_CAP_MS: f64 = 300.0;
/// Jitter at which the jitter score reaches zero.
const JITTER_ZERO_MS: f64 = 250.0;

/// Failure percentages above this are treated as this value.
const FAILURE_CAP_PCT: f64 = 50.0;
/// Failure percentage at which the failure score reaches zero.
const FAILURE_ZERO_PCT: f64 = 40.0;

/// Logarithmic latency curve: `133 - 22 * log10(ms)` over `[50, 2500]` ms.
///
/// 120ms scores about 87, 300ms about 79, 600ms about 71, 1500ms about 63, 2500ms about 58.
#[must_use]
pub fn latency_score(ms: f64) -> f64 {
    let ms = clamp(ms, LATENCY_MIN_MS, LATENCY_MAX_MS);
    clamp(133.0 - 22.0 * ms.log10(), 0.0, 100.0)
}

/// Linear jitter curve reaching zero at 250ms.
#[must_use]
pub fn jitter_score(ms: f64) -> f64 {
    let ms = clamp(ms, 0.0, JITTER_CAP_MS);
    clamp(100.0 - (ms / JITTER_ZERO_MS) * 100.0, 0.0, 100.0)
}

/// Linear failure curve reaching zero at 40% failures.
#[must_use]
pub fn failure_score(fail_pct: f64) -> f64 {
    let pct = clamp(fail_pct, 0.0, FAILURE_CAP_PCT);
    clamp(100.0 - (pct / FAILURE_ZERO_PCT) * 100.0, 0.0, 100.0)
}

/// Sub-score weights for base health. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Latency sub-score weight (default: 0.60)
    #[serde(default = "default_latency_weight")]
    pub latency: f64,

    /// Failure sub-score weight (default: 0.33)
    #[serde(default = "default_failure_weight")]
    pub failure: f64,

    /// Jitter sub-score weight (default: 0.07)
    #[serde(default = "default_jitter_weight")]
    pub jitter: f64,
}

fn default_latency_weight() -> f64 {
    0.60
}
fn default_failure_weight() -> f64 {
    0.33
}
fn default_jitter_weight() -> f64 {
    0.07
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            latency: default_latency_weight(),
            failure: default_failure_weight(),
            jitter: default_jitter_weight(),
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.latency + self.failure + self.jitter
    }
}

/// Configuration for provider scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,

    /// Slot lag at which the penalty saturates (default: 200)
    #[serde(default = "default_max_slot_lag")]
    pub max_slot_lag: u64,

    /// Penalty applied at `max_slot_lag` (default: 25.0)
    #[serde(default = "default_max_slot_penalty")]
    pub max_slot_penalty: f64,
}

fn default_max_slot_lag() -> u64 {
    200
}
fn default_max_slot_penalty() -> f64 {
    25.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            max_slot_lag: default_max_slot_lag(),
            max_slot_penalty: default_max_slot_penalty(),
        }
    }
}

impl ScoringConfig {
    /// Validates weights and penalty bounds.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        let w = &self.weights;
        if !(w.latency.is_finite() && w.failure.is_finite() && w.jitter.is_finite()) {
            return Err("scoring weights must be finite numbers".to_string());
        }
        if w.latency < 0.0 || w.failure < 0.0 || w.jitter < 0.0 {
            return Err("scoring weights must be non-negative".to_string());
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            return Err(format!("scoring weights must sum to 1.0 (got {:.4})", w.sum()));
        }
        if self.max_slot_lag == 0 {
            return Err("max_slot_lag must be greater than 0".to_string());
        }
        if !(0.0..=100.0).contains(&self.max_slot_penalty) {
            return Err("max_slot_penalty must be within [0, 100]".to_string());
        }
        Ok(())
    }

    /// Weighted blend of the three sub-scores, before slot-lag correction.
    #[must_use]
    pub fn base_health(&self, scored_latency_ms: f64, jitter_ms: f64, fail_pct: f64) -> f64 {
        let w = &self.weights;
        latency_score(scored_latency_ms) * w.latency +
            failure_score(fail_pct) * w.failure +
            jitter_score(jitter_ms) * w.jitter
    }

    /// Linear penalty for trailing the freshest provider, saturating at `max_slot_lag`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slot_lag_penalty(&self, lag_slots: u64) -> f64 {
        let max_lag = self.max_slot_lag.max(1);
        let lag = lag_slots.min(max_lag);
        (lag as f64 / max_lag as f64) * self.max_slot_penalty
    }
}

/// Final integer health: `round(clamp(base - penalty, 0, 100))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn health(base_health: f64, slot_penalty: f64) -> u8 {
    let value = base_health - slot_penalty;
    if value.is_nan() {
        return 0;
    }
    clamp(value, 0.0, 100.0).round() as u8
}
