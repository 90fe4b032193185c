//! Dataset Statistics Analyzer
//!
//! Turns a raw collection of training examples into actionable pre-flight
//! statistics: token distribution, structural quality issues, duplicate and
//! outlier screening, and an optional cost projection. One bad record never
//! aborts the batch; per-example problems are folded into the quality
//! counters so the rest of the dataset still gets analyzed.

pub mod outlier;
pub mod shape;
pub mod tokenizer;

use crate::benchmarks::HardwareTier;
use crate::error::{EstimationError, EstimationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

pub use outlier::OutlierReport;
pub use shape::ExampleShape;
pub use tokenizer::Tokenizer;

use outlier::detect_outliers;
use shape::{alternation_ok, classify};

// Quality-score penalty per issue category, applied proportionally to the
// issue's share of the dataset. Fixed so the score is reproducible across
// releases; changing these is a breaking change for stored reports.
const EMPTY_PENALTY: f64 = 40.0;
const MALFORMED_PENALTY: f64 = 40.0;
const ALTERNATION_PENALTY: f64 = 30.0;
const DUPLICATE_PENALTY: f64 = 20.0;

/// Counts of structural quality issues plus the aggregate 0-100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub empty_examples: usize,
    pub malformed_examples: usize,
    pub alternation_errors: usize,
    pub duplicate_count: usize,
    pub score: f64,
}

impl QualityReport {
    #[must_use]
    pub fn issue_total(&self) -> usize {
        self.empty_examples + self.malformed_examples + self.alternation_errors + self.duplicate_count
    }
}

/// Per-shape composition of the dataset, for the dataset card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCounts {
    pub conversation: usize,
    pub instruction_output: usize,
    pub preference_pair: usize,
    pub free_text: usize,
    pub unrecognized: usize,
}

impl ShapeCounts {
    fn record(&mut self, shape: ExampleShape) {
        match shape {
            ExampleShape::Conversation => self.conversation += 1,
            ExampleShape::InstructionOutput => self.instruction_output += 1,
            ExampleShape::PreferencePair => self.preference_pair += 1,
            ExampleShape::FreeText => self.free_text += 1,
            ExampleShape::Unrecognized => self.unrecognized += 1,
        }
    }
}

/// Monetary projection for training on the configured tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostProjection {
    pub tier_id: String,
    pub epochs: u32,
    pub currency: String,
    pub estimated_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

/// Full analyzer output for one dataset at one epoch count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedDatasetStats {
    pub token_count_total: u64,
    pub token_count_avg: f64,
    pub token_count_min: u64,
    pub token_count_max: u64,
    pub tokenizer_used: String,
    /// Content hash over the normalized payloads; stable across calls for
    /// the same dataset, so callers can key caches on it.
    pub fingerprint: String,
    pub shape_counts: ShapeCounts,
    pub quality: QualityReport,
    pub outliers: OutlierReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_projection: Option<CostProjection>,
}

/// Analyzer over raw example documents.
///
/// Pure and stateless between calls; the optional pricing tier only adds a
/// cost projection to the output.
#[derive(Debug, Clone, Default)]
pub struct DatasetAnalyzer {
    tokenizer: Tokenizer,
    pricing_tier: Option<HardwareTier>,
}

impl DatasetAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self { tokenizer: Tokenizer::new(), pricing_tier: None }
    }

    /// Creates an analyzer that also projects cost against `tier`.
    /// Unpriced tiers yield no projection.
    #[must_use]
    pub fn with_pricing(tier: HardwareTier) -> Self {
        Self { tokenizer: Tokenizer::new(), pricing_tier: Some(tier) }
    }

    /// Analyzes `examples` for a run of `epochs` epochs.
    ///
    /// # Errors
    /// Returns `InvalidDataset` for an empty collection; per-example
    /// problems are recorded in the quality counters instead of failing.
    pub fn analyze(&self, examples: &[Value], epochs: u32) -> EstimationResult<EnhancedDatasetStats> {
        if examples.is_empty() {
            return Err(EstimationError::InvalidDataset("dataset must not be empty".to_string()));
        }

        let mut shape_counts = ShapeCounts::default();
        let mut empty_examples = 0usize;
        let mut malformed_examples = 0usize;
        let mut alternation_errors = 0usize;
        let mut duplicate_count = 0usize;
        let mut token_samples: Vec<(usize, u64)> = Vec::with_capacity(examples.len());
        let mut seen_payloads: HashSet<[u8; 32]> = HashSet::with_capacity(examples.len());
        let mut fingerprint_hasher = Sha256::new();

        for (idx, example) in examples.iter().enumerate() {
            let classified = classify(example);
            shape_counts.record(classified.shape);

            if let Some(roles) = &classified.roles {
                if !alternation_ok(roles) {
                    alternation_errors += 1;
                }
            }

            let Some(payload) = classified.payload else {
                malformed_examples += 1;
                continue;
            };

            fingerprint_hasher.update(payload.as_bytes());
            fingerprint_hasher.update(b"\n");

            if payload.trim().is_empty() {
                empty_examples += 1;
                token_samples.push((idx, 0));
                continue;
            }

            token_samples.push((idx, self.tokenizer.count(&payload)));

            // Duplicate screening is a set-membership check over the hashed
            // normalized payload, so it stays linear in dataset size. The
            // first occurrence is not counted (pair of twins -> 1).
            let digest: [u8; 32] = Sha256::digest(normalize_payload(&payload).as_bytes()).into();
            if !seen_payloads.insert(digest) {
                duplicate_count += 1;
            }
        }

        let token_count_total: u64 = token_samples.iter().map(|(_, c)| c).sum();
        let token_count_min = token_samples.iter().map(|(_, c)| *c).min().unwrap_or(0);
        let token_count_max = token_samples.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let token_count_avg = if token_samples.is_empty() {
            0.0
        } else {
            token_count_total as f64 / token_samples.len() as f64
        };

        let quality = QualityReport {
            empty_examples,
            malformed_examples,
            alternation_errors,
            duplicate_count,
            score: quality_score(
                examples.len(),
                empty_examples,
                malformed_examples,
                alternation_errors,
                duplicate_count,
            ),
        };

        let outliers = detect_outliers(&token_samples);
        let cost_projection = self.project_cost(token_count_total, epochs);

        let stats = EnhancedDatasetStats {
            token_count_total,
            token_count_avg,
            token_count_min,
            token_count_max,
            tokenizer_used: self.tokenizer.name().to_string(),
            fingerprint: hex::encode(fingerprint_hasher.finalize()),
            shape_counts,
            quality,
            outliers,
            cost_projection,
        };

        debug!(
            examples = examples.len(),
            token_total = stats.token_count_total,
            quality_score = stats.quality.score,
            outliers = stats.outliers.count,
            "Analyzed dataset"
        );

        Ok(stats)
    }

    fn project_cost(&self, token_total: u64, epochs: u32) -> Option<CostProjection> {
        let tier = self.pricing_tier.as_ref()?;
        let pricing = tier.pricing.as_ref()?;
        if epochs == 0 {
            return None;
        }

        let projected_tokens = token_total as f64 * f64::from(epochs);
        let hours = projected_tokens / tier.throughput_class.approx_tokens_per_second() / 3600.0;
        Some(CostProjection {
            tier_id: tier.id.clone(),
            epochs,
            currency: "USD".to_string(),
            estimated_cost: hours * pricing.total_cost_per_hour,
            estimated_hours: Some(hours),
        })
    }
}

/// Whitespace-collapsed payload used for duplicate detection, so formatting
/// differences alone don't hide a copy-pasted example.
fn normalize_payload(payload: &str) -> String {
    payload.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn quality_score(
    total: usize,
    empty: usize,
    malformed: usize,
    alternation: usize,
    duplicates: usize,
) -> f64 {
    let n = total as f64;
    let score = 100.0
        - EMPTY_PENALTY * (empty as f64 / n)
        - MALFORMED_PENALTY * (malformed as f64 / n)
        - ALTERNATION_PENALTY * (alternation as f64 / n)
        - DUPLICATE_PENALTY * (duplicates as f64 / n);
    score.clamp(0.0, 100.0)
}
