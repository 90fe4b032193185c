//! Tier recommendation for a model size class and optional hourly budget.
//!
//! Total by design: the confirmation UI must always have a tier to show,
//! so when nothing satisfies the constraints the closest fit is returned
//! with a reason explaining the compromise.

use crate::benchmarks::{BenchmarkRegistry, HardwareTier};
use crate::config::{FineTuningMethod, ModelSizeClass};
use crate::estimator::estimated_footprint_gb;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Headroom over the raw adapter-training footprint; an exact-fit tier
/// leaves no room for fragmentation or longer sequences.
const MEMORY_SAFETY_MARGIN: f64 = 1.25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRecommendation {
    pub tier_id: String,
    /// Plain sentence for direct display in the confirmation dialog.
    pub reason: String,
}

/// Picks the cheapest priced tier whose memory safely holds the model
/// under adapter training. Unpriced tiers are never recommended since
/// they cannot be compared on cost.
///
/// When no fitting tier is within `max_cost_per_hour`, the cheapest
/// fitting tier is returned anyway with the overrun spelled out; when no
/// tier fits at all, the largest tier in the catalog is returned.
#[must_use]
pub fn recommend_tier(
    registry: &BenchmarkRegistry,
    model_size_class: ModelSizeClass,
    max_cost_per_hour: Option<f64>,
) -> TierRecommendation {
    let required_gb =
        estimated_footprint_gb(model_size_class, FineTuningMethod::ParameterEfficient, 1)
            * MEMORY_SAFETY_MARGIN;
    let model_name = model_size_class.display_name();

    let fitting: Vec<&HardwareTier> = registry
        .tiers()
        .iter()
        .filter(|tier| tier.pricing.is_some() && tier.memory_gb >= required_gb)
        .collect();

    let cheapest_of = |tiers: &[&HardwareTier]| -> Option<TierRecommendation> {
        tiers
            .iter()
            .min_by(|a, b| {
                let rate = |t: &HardwareTier| {
                    t.pricing.as_ref().map_or(f64::INFINITY, |p| p.total_cost_per_hour)
                };
                rate(a).total_cmp(&rate(b))
            })
            .map(|tier| TierRecommendation {
                tier_id: tier.id.clone(),
                reason: format!(
                    "cheapest tier with the {required_gb:.0} GB needed for a {model_name} model"
                ),
            })
    };

    let recommendation = match max_cost_per_hour {
        Some(max_cost) => {
            let within: Vec<&HardwareTier> = fitting
                .iter()
                .copied()
                .filter(|tier| {
                    tier.pricing
                        .as_ref()
                        .is_some_and(|p| p.total_cost_per_hour <= max_cost)
                })
                .collect();
            if within.is_empty() {
                cheapest_of(&fitting).map(|mut rec| {
                    rec.reason = format!(
                        "no tier with the {required_gb:.0} GB needed for a {model_name} model \
                         is within ${max_cost:.2}/hr; this is the cheapest that fits"
                    );
                    rec
                })
            } else {
                cheapest_of(&within)
            }
        }
        None => cheapest_of(&fitting),
    };

    let recommendation = recommendation.unwrap_or_else(|| {
        // Nothing in the catalog holds this model; point at the biggest tier.
        let largest = registry
            .tiers()
            .iter()
            .max_by(|a, b| a.memory_gb.total_cmp(&b.memory_gb));
        match largest {
            Some(tier) => TierRecommendation {
                tier_id: tier.id.clone(),
                reason: format!(
                    "a {model_name} model needs about {required_gb:.0} GB, more than any \
                     catalog tier; {} has the most memory available",
                    tier.display_name
                ),
            },
            None => TierRecommendation {
                tier_id: String::new(),
                reason: "the tier catalog is empty".to_string(),
            },
        }
    });

    debug!(
        tier = %recommendation.tier_id,
        required_gb,
        model = model_name,
        "Recommended hardware tier"
    );

    recommendation
}
