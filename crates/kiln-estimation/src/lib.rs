//! Kiln Estimation
//!
//! Pure, synchronous cost and capacity modeling for fine-tuning runs:
//! - A versioned hardware tier catalog (`BenchmarkRegistry`)
//! - Pre-flight dataset statistics (`DatasetAnalyzer`)
//! - Step, duration, memory-fit, and cost estimation (`TrainingEstimator`)
//! - Budget policy checks (`evaluate_budget`)
//! - Hardware recommendations (`recommend_tier`)
//!
//! No component performs I/O or holds mutable state; every call operates
//! on its arguments and the immutable catalog, so concurrent use needs no
//! coordination.

pub mod benchmarks;
pub mod budget;
pub mod config;
pub mod dataset;
pub mod error;
pub mod estimator;
pub mod recommend;

pub use benchmarks::{BenchmarkRegistry, HardwareTier, ThroughputClass, TierPricing, CATALOG_VERSION};
pub use budget::{evaluate_budget, BudgetPolicy, BudgetVerdict, DEFAULT_WARN_AT_PERCENT};
pub use config::{FineTuningMethod, ModelSizeClass, TrainingConfiguration};
pub use dataset::{
    CostProjection, DatasetAnalyzer, EnhancedDatasetStats, QualityReport, ShapeCounts,
};
pub use dataset::outlier::{detect_outliers, OutlierReport, OUTLIER_METHOD};
pub use dataset::shape::{classify, ClassifiedExample, ExampleShape};
pub use dataset::tokenizer::{Tokenizer, TOKENIZER_NAME};
pub use error::{EstimationError, EstimationResult};
pub use estimator::{
    RecommendedSettings, TimeEstimation, TrainingEstimator, VERY_LONG_RUN_STEPS,
};
pub use recommend::{recommend_tier, TierRecommendation};
