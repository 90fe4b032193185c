//! Token-length outlier screening using an interquartile-range fence.

use serde::{Deserialize, Serialize};

/// Method tag recorded in every report produced by this module.
pub const OUTLIER_METHOD: &str = "iqr-1.5";

/// Outlier detection is skipped below this many samples; a fence over a
/// handful of points flags spurious singletons.
pub const MIN_SAMPLES: usize = 5;

const IQR_FENCE_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub count: usize,
    pub method: String,
    /// Indices into the original example collection, ascending.
    pub flagged_indices: Vec<usize>,
}

impl OutlierReport {
    fn empty() -> Self {
        Self { count: 0, method: OUTLIER_METHOD.to_string(), flagged_indices: Vec::new() }
    }
}

/// Screens `(example_index, token_count)` samples for lengths outside the
/// 1.5x IQR fence. Indices refer to the caller's original collection so
/// malformed examples that produced no count keep the numbering intact.
#[must_use]
pub fn detect_outliers(samples: &[(usize, u64)]) -> OutlierReport {
    if samples.len() < MIN_SAMPLES {
        return OutlierReport::empty();
    }

    let mut counts: Vec<f64> = samples.iter().map(|(_, c)| *c as f64).collect();
    counts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = quartile(&counts, 0.25);
    let q3 = quartile(&counts, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - IQR_FENCE_MULTIPLIER * iqr;
    let upper_fence = q3 + IQR_FENCE_MULTIPLIER * iqr;

    let mut flagged_indices: Vec<usize> = samples
        .iter()
        .filter(|(_, count)| {
            let count = *count as f64;
            count < lower_fence || count > upper_fence
        })
        .map(|(idx, _)| *idx)
        .collect();
    flagged_indices.sort_unstable();

    OutlierReport {
        count: flagged_indices.len(),
        method: OUTLIER_METHOD.to_string(),
        flagged_indices,
    }
}

/// Linear-interpolated quantile over sorted data.
fn quartile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}
