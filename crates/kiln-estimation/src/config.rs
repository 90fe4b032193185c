use crate::error::{EstimationError, EstimationResult};
use serde::{Deserialize, Serialize};

/// Parameter-count bracket of the base model being fine-tuned.
///
/// The brackets drive the memory model and the throughput table; anything
/// finer-grained than this is noise at estimation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSizeClass {
    /// Sub-1B models (~0.5B parameters).
    Tiny,
    /// ~3B parameters.
    Small,
    /// ~8B parameters.
    Medium,
    /// ~34B parameters.
    Large,
    /// ~70B parameters.
    XLarge,
}

impl ModelSizeClass {
    /// Approximate parameter count in billions, used for memory math.
    #[must_use]
    pub fn approx_params_billions(self) -> f64 {
        match self {
            Self::Tiny => 0.5,
            Self::Small => 3.0,
            Self::Medium => 8.0,
            Self::Large => 34.0,
            Self::XLarge => 70.0,
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Tiny => "under 1B",
            Self::Small => "3B",
            Self::Medium => "8B",
            Self::Large => "34B",
            Self::XLarge => "70B",
        }
    }

    /// All brackets in ascending parameter-count order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Tiny, Self::Small, Self::Medium, Self::Large, Self::XLarge]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineTuningMethod {
    /// Every parameter is updated; needs optimizer state for the full model.
    Full,
    /// LoRA-style adapters; the base model stays frozen.
    ParameterEfficient,
}

/// Value object describing one fine-tuning run as assembled by the wizard UI.
/// Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfiguration {
    pub model_id: String,
    pub model_size_class: ModelSizeClass,
    pub method: FineTuningMethod,
    pub epochs: u32,
    pub batch_size: u32,
    pub grad_accum_steps: u32,
    pub max_seq_len: u32,
    /// Example count, when the dataset has already been inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_size_hint: Option<u64>,
}

impl TrainingConfiguration {
    pub fn validate(&self) -> EstimationResult<()> {
        if self.model_id.trim().is_empty() {
            return Err(EstimationError::InvalidConfiguration("model_id is required".to_string()));
        }
        if self.epochs == 0 {
            return Err(EstimationError::InvalidConfiguration("epochs must be >= 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(EstimationError::InvalidConfiguration("batch_size must be >= 1".to_string()));
        }
        if self.grad_accum_steps == 0 {
            return Err(EstimationError::InvalidConfiguration(
                "grad_accum_steps must be >= 1".to_string(),
            ));
        }
        if self.max_seq_len == 0 {
            return Err(EstimationError::InvalidConfiguration("max_seq_len must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Batch size actually consumed per optimizer step.
    #[must_use]
    pub fn effective_batch_size(&self) -> u64 {
        u64::from(self.batch_size) * u64::from(self.grad_accum_steps)
    }
}
