//! Hardware benchmark registry.
//!
//! A fixed, versioned catalog of compute tiers with memory capacity,
//! throughput class, and hourly pricing. The catalog is defined once at
//! construction and never mutated; updating it means shipping a new version.

use crate::error::{EstimationError, EstimationResult};
use serde::{Deserialize, Serialize};

/// Version string for the shipped tier table. Bumped whenever an entry is
/// added, removed, or re-priced.
pub const CATALOG_VERSION: &str = "2025-07";

/// Relative throughput bracket of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThroughputClass {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ThroughputClass {
    /// Rough aggregate token throughput for a parameter-efficient run,
    /// used for dataset-level cost projections where no full training
    /// configuration is available yet.
    #[must_use]
    pub fn approx_tokens_per_second(self) -> f64 {
        match self {
            Self::Low => 1_500.0,
            Self::Medium => 4_000.0,
            Self::High => 9_000.0,
            Self::VeryHigh => 16_000.0,
        }
    }
}

/// Hourly pricing for a tier. The total is always derived from its two
/// components at construction so the three fields cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    pub base_cost_per_hour: f64,
    pub platform_fee_per_hour: f64,
    pub total_cost_per_hour: f64,
}

impl TierPricing {
    #[must_use]
    pub fn new(base_cost_per_hour: f64, platform_fee_per_hour: f64) -> Self {
        Self {
            base_cost_per_hour,
            platform_fee_per_hour,
            total_cost_per_hour: base_cost_per_hour + platform_fee_per_hour,
        }
    }
}

/// A priced hardware configuration (GPU or managed-instance type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareTier {
    pub id: String,
    pub display_name: String,
    /// Cloud provider label; the catalog spans several providers.
    pub provider: String,
    pub memory_gb: f64,
    pub throughput_class: ThroughputClass,
    /// Absent for bring-your-own-hardware tiers with no metered rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<TierPricing>,
}

impl HardwareTier {
    fn new(
        id: &str,
        display_name: &str,
        provider: &str,
        memory_gb: f64,
        throughput_class: ThroughputClass,
        pricing: Option<TierPricing>,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            provider: provider.to_string(),
            memory_gb,
            throughput_class,
            pricing,
        }
    }
}

/// Immutable catalog of hardware tiers.
#[derive(Debug, Clone)]
pub struct BenchmarkRegistry {
    tiers: Vec<HardwareTier>,
}

impl BenchmarkRegistry {
    /// The tier table shipped with this build.
    #[must_use]
    pub fn builtin() -> Self {
        let priced = |base: f64, fee: f64| Some(TierPricing::new(base, fee));
        Self {
            tiers: vec![
                HardwareTier::new(
                    "nvidia-t4",
                    "NVIDIA T4 16GB",
                    "aws",
                    16.0,
                    ThroughputClass::Low,
                    priced(0.39, 0.10),
                ),
                HardwareTier::new(
                    "nvidia-l4",
                    "NVIDIA L4 24GB",
                    "gcp",
                    24.0,
                    ThroughputClass::Medium,
                    priced(0.58, 0.13),
                ),
                HardwareTier::new(
                    "nvidia-a10g",
                    "NVIDIA A10G 24GB",
                    "aws",
                    24.0,
                    ThroughputClass::Medium,
                    priced(0.85, 0.16),
                ),
                HardwareTier::new(
                    "nvidia-a100-40",
                    "NVIDIA A100 40GB",
                    "azure",
                    40.0,
                    ThroughputClass::High,
                    priced(2.21, 0.46),
                ),
                HardwareTier::new(
                    "nvidia-a100-80",
                    "NVIDIA A100 80GB",
                    "coreweave",
                    80.0,
                    ThroughputClass::High,
                    priced(2.84, 0.56),
                ),
                HardwareTier::new(
                    "nvidia-h100",
                    "NVIDIA H100 80GB",
                    "coreweave",
                    80.0,
                    ThroughputClass::VeryHigh,
                    priced(4.25, 0.93),
                ),
                HardwareTier::new(
                    "8x-nvidia-h100",
                    "8x NVIDIA H100 640GB",
                    "coreweave",
                    640.0,
                    ThroughputClass::VeryHigh,
                    priced(34.00, 7.40),
                ),
                HardwareTier::new(
                    "byo-gpu",
                    "Self-hosted GPU 24GB",
                    "self-hosted",
                    24.0,
                    ThroughputClass::Medium,
                    None,
                ),
            ],
        }
    }

    /// Catalog version shipped with this build.
    #[must_use]
    pub fn catalog_version(&self) -> &'static str {
        CATALOG_VERSION
    }

    /// All tiers, in catalog order (cheapest single-GPU tiers first).
    #[must_use]
    pub fn tiers(&self) -> &[HardwareTier] {
        &self.tiers
    }

    /// Looks up a tier by identifier.
    pub fn tier(&self, id: &str) -> EstimationResult<&HardwareTier> {
        self.tiers
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| EstimationError::UnknownTier(id.to_string()))
    }
}

impl Default for BenchmarkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost_is_sum_of_components_for_every_tier() {
        let registry = BenchmarkRegistry::builtin();
        for tier in registry.tiers() {
            if let Some(pricing) = &tier.pricing {
                assert_eq!(
                    pricing.total_cost_per_hour,
                    pricing.base_cost_per_hour + pricing.platform_fee_per_hour,
                    "pricing drift on tier {}",
                    tier.id
                );
            }
        }
    }

    #[test]
    fn test_t4_pricing_matches_published_rate() {
        let registry = BenchmarkRegistry::builtin();
        let t4 = registry.tier("nvidia-t4").unwrap();
        let pricing = t4.pricing.as_ref().unwrap();
        assert_eq!(pricing.base_cost_per_hour, 0.39);
        assert_eq!(pricing.platform_fee_per_hour, 0.10);
        assert_eq!(pricing.total_cost_per_hour, 0.49);
    }

    #[test]
    fn test_unknown_tier_fails_with_typed_error() {
        let registry = BenchmarkRegistry::builtin();
        let err = registry.tier("nvidia-v100").unwrap_err();
        assert!(matches!(err, EstimationError::UnknownTier(id) if id == "nvidia-v100"));
    }

    #[test]
    fn test_catalog_has_multiple_providers() {
        let registry = BenchmarkRegistry::builtin();
        let mut providers: Vec<&str> =
            registry.tiers().iter().map(|t| t.provider.as_str()).collect();
        providers.sort_unstable();
        providers.dedup();
        assert!(providers.len() >= 3, "expected a multi-provider catalog");
    }

    #[test]
    fn test_byo_tier_has_no_pricing() {
        let registry = BenchmarkRegistry::builtin();
        assert!(registry.tier("byo-gpu").unwrap().pricing.is_none());
    }

    #[test]
    fn test_throughput_classes_are_ordered() {
        assert!(ThroughputClass::Low < ThroughputClass::VeryHigh);
        assert!(
            ThroughputClass::Low.approx_tokens_per_second()
                < ThroughputClass::VeryHigh.approx_tokens_per_second()
        );
    }
}
