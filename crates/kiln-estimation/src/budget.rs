//! Budget policy evaluation over a finished estimation.
//!
//! Pure comparison against caller-supplied ceilings. With no limits set
//! the verdict is always clean; budget checking is strictly opt-in.

use crate::estimator::TimeEstimation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Warning threshold applied when the caller does not override it.
pub const DEFAULT_WARN_AT_PERCENT: f64 = 80.0;

/// Caller-supplied spending and duration ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<f64>,
    #[serde(default = "default_warn_at_percent")]
    pub warn_at_percent: f64,
    /// Consumed by the launch runtime, never read here.
    #[serde(default)]
    pub auto_stop: bool,
}

fn default_warn_at_percent() -> f64 {
    DEFAULT_WARN_AT_PERCENT
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            max_hours: None,
            max_cost: None,
            warn_at_percent: DEFAULT_WARN_AT_PERCENT,
            auto_stop: false,
        }
    }
}

/// Outcome of checking one estimation against one policy. Hour findings
/// come before cost findings in `warnings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetVerdict {
    pub exceeded: bool,
    pub warnings: Vec<String>,
}

/// Compares a projection against the policy ceilings.
///
/// A limit is only checked when it is set, and the cost limit is only
/// checked when the estimation carries a cost (an unpriced tier cannot
/// exceed a spending cap). Near-threshold warnings fire from
/// `warn_at_percent` of a limit upward, whether or not the limit itself
/// is crossed.
#[must_use]
pub fn evaluate_budget(estimation: &TimeEstimation, policy: &BudgetPolicy) -> BudgetVerdict {
    let mut exceeded = false;
    let mut warnings = Vec::new();

    let projected_hours =
        estimation.duration_hours as f64 + estimation.duration_minutes as f64 / 60.0;
    if let Some(max_hours) = policy.max_hours {
        if projected_hours > max_hours {
            exceeded = true;
            warnings.push(format!(
                "projected duration {projected_hours:.2} h exceeds the {max_hours:.2} h limit"
            ));
        } else if projected_hours >= max_hours * policy.warn_at_percent / 100.0 {
            warnings.push(format!(
                "projected duration {projected_hours:.2} h is above {:.0}% of the {max_hours:.2} h limit",
                policy.warn_at_percent
            ));
        }
    }

    if let (Some(max_cost), Some(cost)) = (policy.max_cost, estimation.estimated_cost) {
        if cost > max_cost {
            exceeded = true;
            warnings.push(format!(
                "projected cost ${cost:.2} exceeds the ${max_cost:.2} limit"
            ));
        } else if cost >= max_cost * policy.warn_at_percent / 100.0 {
            warnings.push(format!(
                "projected cost ${cost:.2} is above {:.0}% of the ${max_cost:.2} limit",
                policy.warn_at_percent
            ));
        }
    }

    debug!(exceeded, warning_count = warnings.len(), "Evaluated budget policy");

    BudgetVerdict { exceeded, warnings }
}
