//! Descriptive statistics over small sample batches.
//!
//! Batches are at most a handful of values per provider, so every helper copies and
//! sorts where needed instead of maintaining running state.

/// Clamps `value` into `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics on inverted bounds; `lo` wins. NaN maps to `lo`.
#[inline]
#[must_use]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.min(hi).max(lo)
}

/// Arithmetic mean. Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median. Even-length inputs average the two middle values.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Population standard deviation. Fewer than two samples have no spread and yield `0.0`.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let Some(m) = mean(values) else {
        return 0.0;
    };
    let squared: Vec<f64> = values.iter().map(|x| (x - m).powi(2)).collect();
    mean(&squared).unwrap_or(0.0).sqrt()
}

/// Rounds to one decimal place.
#[inline]
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
