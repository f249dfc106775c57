//! Exponential smoothing of the headline index across snapshots.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// `[smoothing]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// When false the smoothed value always equals the raw value (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Weight of the newest raw value, in `(0, 1]` (default: 0.25)
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_enabled() -> bool {
    true
}
fn default_alpha() -> f64 {
    0.25
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { enabled: default_enabled(), alpha: default_alpha() }
    }
}

impl SmoothingConfig {
    /// # Errors
    ///
    /// Returns an error if `alpha` is outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(format!("smoothing alpha must be within (0, 1] (got {})", self.alpha));
        }
        Ok(())
    }
}

/// Holds the last emitted headline value.
///
/// `smoothed = previous * (1 - alpha) + raw * alpha`; the first value seeds the state.
/// Each update is atomic. Concurrent snapshots may apply their updates in either order.
#[derive(Debug)]
pub struct NqiSmoother {
    config: SmoothingConfig,
    last: Mutex<Option<f64>>,
}

impl NqiSmoother {
    #[must_use]
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config, last: Mutex::new(None) }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.config.alpha
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Folds `raw` into the state and returns the new smoothed value.
    pub fn apply(&self, raw: f64) -> f64 {
        if !self.config.enabled {
            return raw;
        }

        let mut last = self.last.lock();
        let smoothed = match *last {
            Some(previous) => previous * (1.0 - self.config.alpha) + raw * self.config.alpha,
            None => raw,
        };
        *last = Some(smoothed);
        smoothed
    }

    /// Last emitted value, if any snapshot has been smoothed yet.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        *self.last.lock()
    }

    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

impl Default for NqiSmoother {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}
