//! Spread Statistics
//!
//! Population moments over the sample window contents.
//!
//! The threshold math downstream is calibrated against the population
//! standard deviation (sum of squared deviations divided by n, not n-1).
//! That divisor is a numerical contract, not a style choice; switching to
//! the sample estimator would silently widen every threshold.

use serde::Serialize;

/// Per-side summary statistics for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SideStats {
    /// All-zero statistics for an empty buffer.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }

    /// Compute summary statistics over a buffer, or `None` when empty.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let (mean, std) = moments(values);
        let mut min = values[0];
        let mut max = values[0];
        for &v in &values[1..] {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        Some(Self {
            count: values.len(),
            mean,
            std,
            min,
            max,
        })
    }
}

/// Mean and population standard deviation over all held values.
///
/// Stable two-pass accumulation: mean first, then squared deviations from
/// it. Returns `(0.0, 0.0)` for an empty buffer.
pub fn moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
