//! Time, memory-fit, and cost estimation for a configured training run.
//!
//! The throughput table holds calibrated samples/second figures for the
//! (tier class, model bracket) pairs we have measured; everything else
//! falls back to the nearest measured bracket with a warning instead of
//! refusing to answer.

use crate::benchmarks::{BenchmarkRegistry, HardwareTier, ThroughputClass};
use crate::config::{FineTuningMethod, ModelSizeClass, TrainingConfiguration};
use crate::error::{EstimationError, EstimationResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Step count above which an estimation carries a "very long run" warning.
pub const VERY_LONG_RUN_STEPS: u64 = 100_000;

/// Full fine-tuning moves far more state per step than adapter training.
const FULL_TUNING_THROUGHPUT_FACTOR: f64 = 0.35;

/// Result of one estimation request. Produced fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEstimation {
    pub total_steps: u64,
    pub effective_batch_size: u64,
    pub projected_tokens: u64,
    pub duration_hours: u64,
    /// Always in [0, 59]; overflow carries into `duration_hours`.
    pub duration_minutes: u64,
    /// Absent when the tier has no metered pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    pub gpu_utilization_percent: f64,
    pub fits_in_memory: bool,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<RecommendedSettings>,
}

/// Additive suggestions attached when the run does not fit in memory.
/// The estimate itself is never re-run with these applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedSettings {
    pub use_parameter_efficient: bool,
    pub suggested_batch_size: u32,
    pub suggested_grad_accum_steps: u32,
}

/// Estimator over an immutable tier catalog.
pub struct TrainingEstimator<'a> {
    registry: &'a BenchmarkRegistry,
}

impl<'a> TrainingEstimator<'a> {
    #[must_use]
    pub fn new(registry: &'a BenchmarkRegistry) -> Self {
        Self { registry }
    }

    /// Answers "how long will this take and will it fit" for one
    /// configuration + tier pairing.
    ///
    /// `dataset_size` overrides `config.dataset_size_hint` when given;
    /// with neither available the request fails, an estimate without an
    /// example count would be a guess.
    pub fn estimate(
        &self,
        config: &TrainingConfiguration,
        tier_id: &str,
        dataset_size: Option<u64>,
    ) -> EstimationResult<TimeEstimation> {
        let tier = self.registry.tier(tier_id)?;
        let dataset_size = dataset_size.or(config.dataset_size_hint).ok_or_else(|| {
            EstimationError::InsufficientData(
                "dataset size is unknown; pass an explicit size or set dataset_size_hint"
                    .to_string(),
            )
        })?;
        config.validate()?;
        if dataset_size == 0 {
            return Err(EstimationError::InvalidConfiguration(
                "dataset must contain at least one example".to_string(),
            ));
        }

        let mut warnings = Vec::new();

        let effective_batch_size = config.effective_batch_size();
        let steps_per_epoch = dataset_size.div_ceil(effective_batch_size);
        let total_steps = steps_per_epoch * u64::from(config.epochs);

        let (peft_rate, calibrated_bracket) =
            resolve_throughput(tier.throughput_class, config.model_size_class);
        if calibrated_bracket != config.model_size_class {
            warnings.push(format!(
                "no throughput calibration for a {} model on {}; using the {} bracket",
                config.model_size_class.display_name(),
                tier.display_name,
                calibrated_bracket.display_name()
            ));
        }
        let samples_per_second = match config.method {
            FineTuningMethod::Full => peft_rate * FULL_TUNING_THROUGHPUT_FACTOR,
            FineTuningMethod::ParameterEfficient => peft_rate,
        };

        let duration_seconds =
            total_steps as f64 * effective_batch_size as f64 / samples_per_second;
        let (duration_hours, duration_minutes) = split_duration(duration_seconds);
        let estimated_cost = cost_for(duration_seconds, tier);

        let footprint_gb =
            estimated_footprint_gb(config.model_size_class, config.method, config.batch_size);
        let fits_in_memory = footprint_gb <= tier.memory_gb;
        let recommended = if fits_in_memory {
            None
        } else {
            warnings.push(format!(
                "estimated memory footprint {:.1} GB exceeds the {:.0} GB capacity of {}",
                footprint_gb, tier.memory_gb, tier.display_name
            ));
            Some(recommended_settings(config))
        };

        if total_steps > VERY_LONG_RUN_STEPS {
            warnings.push(format!(
                "very long run: {total_steps} steps; consider fewer epochs or a smaller dataset"
            ));
        }

        let gpu_utilization_percent = (effective_batch_size as f64
            / ideal_effective_batch(tier.throughput_class)
            * 100.0)
            .min(100.0);

        let projected_tokens = dataset_size
            .saturating_mul(u64::from(config.max_seq_len))
            .saturating_mul(u64::from(config.epochs));

        debug!(
            tier = %tier.id,
            total_steps,
            duration_hours,
            duration_minutes,
            fits_in_memory,
            "Estimated training run"
        );

        Ok(TimeEstimation {
            total_steps,
            effective_batch_size,
            projected_tokens,
            duration_hours,
            duration_minutes,
            estimated_cost,
            gpu_utilization_percent,
            fits_in_memory,
            warnings,
            recommended,
        })
    }
}

/// Calibrated adapter-training samples/second for measured combinations.
fn tabulated_rate(class: ThroughputClass, size: ModelSizeClass) -> Option<f64> {
    use ModelSizeClass as S;
    use ThroughputClass as T;
    let rate = match (class, size) {
        (T::Low, S::Tiny) => 12.0,
        (T::Low, S::Small) => 3.6,
        (T::Medium, S::Tiny) => 26.0,
        (T::Medium, S::Small) => 8.0,
        (T::Medium, S::Medium) => 3.0,
        (T::High, S::Tiny) => 50.0,
        (T::High, S::Small) => 16.0,
        (T::High, S::Medium) => 7.0,
        (T::High, S::Large) => 1.6,
        (T::VeryHigh, S::Tiny) => 80.0,
        (T::VeryHigh, S::Small) => 26.0,
        (T::VeryHigh, S::Medium) => 12.0,
        (T::VeryHigh, S::Large) => 3.0,
        (T::VeryHigh, S::XLarge) => 1.2,
        _ => return None,
    };
    Some(rate)
}

/// Looks up the calibrated rate, falling back to the nearest measured
/// bracket by parameter count. Returns the rate and the bracket it came
/// from so callers can tell whether a fallback happened.
fn resolve_throughput(class: ThroughputClass, size: ModelSizeClass) -> (f64, ModelSizeClass) {
    if let Some(rate) = tabulated_rate(class, size) {
        return (rate, size);
    }
    let target = size.approx_params_billions();
    let mut best: Option<(f64, ModelSizeClass, f64)> = None;
    for &candidate in ModelSizeClass::all() {
        if let Some(rate) = tabulated_rate(class, candidate) {
            let distance = (candidate.approx_params_billions() - target).abs();
            if best.is_none_or(|(d, _, _)| distance < d) {
                best = Some((distance, candidate, rate));
            }
        }
    }
    // Every class tabulates at least the two smallest brackets.
    let (_, bracket, rate) = best.unwrap_or((0.0, ModelSizeClass::Tiny, 1.0));
    (rate, bracket)
}

/// Memory footprint in GB. Full tuning carries gradients and optimizer
/// state for every parameter; adapter tuning keeps the frozen base in
/// half precision plus a small adapter budget.
pub(crate) fn estimated_footprint_gb(
    size: ModelSizeClass,
    method: FineTuningMethod,
    batch_size: u32,
) -> f64 {
    let params_b = size.approx_params_billions();
    let activations = f64::from(batch_size) * params_b.sqrt() * 0.15;
    match method {
        FineTuningMethod::Full => params_b * 16.0 + activations,
        FineTuningMethod::ParameterEfficient => params_b * 2.0 + 1.5 + activations,
    }
}

fn recommended_settings(config: &TrainingConfiguration) -> RecommendedSettings {
    let suggested_batch_size = (config.batch_size / 2).max(1);
    // Halving the batch doubles accumulation so the effective batch holds.
    let suggested_grad_accum_steps = if suggested_batch_size < config.batch_size {
        config.grad_accum_steps * 2
    } else {
        config.grad_accum_steps
    };
    RecommendedSettings {
        use_parameter_efficient: config.method == FineTuningMethod::Full,
        suggested_batch_size,
        suggested_grad_accum_steps,
    }
}

/// Effective batch size that saturates a tier class, for the display-only
/// utilization figure.
fn ideal_effective_batch(class: ThroughputClass) -> f64 {
    match class {
        ThroughputClass::Low => 8.0,
        ThroughputClass::Medium => 16.0,
        ThroughputClass::High => 32.0,
        ThroughputClass::VeryHigh => 64.0,
    }
}

/// Splits a duration into whole hours and minutes in [0, 59], rounding
/// the total up to the next minute so short runs never show as zero.
fn split_duration(seconds: f64) -> (u64, u64) {
    let total_minutes = (seconds / 60.0).ceil() as u64;
    (total_minutes / 60, total_minutes % 60)
}

/// Cost from the exact fractional hours, not the rounded display split.
fn cost_for(duration_seconds: f64, tier: &HardwareTier) -> Option<f64> {
    tier.pricing
        .as_ref()
        .map(|pricing| duration_seconds / 3600.0 * pricing.total_cost_per_hour)
}
