//! Account risk configuration with clamping validation.
//!
//! Out-of-range caller input is clamped to the documented bounds and
//! reported as a warning, never a hard failure.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Documented bounds for [`RiskConfig::max_risk_pct`].
pub const MAX_RISK_PCT_BOUNDS: (f64, f64) = (0.005, 0.10);
/// Documented bounds for [`RiskConfig::min_reward_ratio`].
pub const MIN_REWARD_RATIO_BOUNDS: (f64, f64) = (1.0, 10.0);
/// Documented bounds for [`RiskConfig::min_prob_profit`].
pub const MIN_PROB_PROFIT_BOUNDS: (f64, f64) = (0.3, 0.95);
/// Documented bounds for [`RiskConfig::max_concentration`].
pub const MAX_CONCENTRATION_BOUNDS: (f64, f64) = (0.05, 0.50);

/// Warning emitted when a supplied value was clamped into range.
//
// `field` is a `&'static str`, which cannot implement `Deserialize`; this
// type is only ever serialized out as part of operation responses, so it
// derives `Serialize` only (matching the sibling `&'static str` structs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClampWarning {
    /// Field name that was clamped.
    pub field: &'static str,
    /// Value the caller supplied.
    pub supplied: f64,
    /// Boundary value actually used.
    pub clamped_to: f64,
}

impl std::fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} out of range, clamped to {}",
            self.field, self.supplied, self.clamped_to
        )
    }
}

/// Validated account/risk parameters.
///
/// Always within documented bounds after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Maximum fraction of account value risked per position.
    pub max_risk_pct: f64,
    /// Minimum acceptable reward/risk ratio.
    pub min_reward_ratio: f64,
    /// Minimum acceptable probability of profit.
    pub min_prob_profit: f64,
    /// Maximum fraction of account value in one position.
    pub max_concentration: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_pct: 0.02,
            min_reward_ratio: 1.5,
            min_prob_profit: 0.50,
            max_concentration: 0.20,
        }
    }
}

impl RiskConfig {
    /// Build a config from caller-supplied values, clamping each field into
    /// its documented range.
    ///
    /// Returns the validated config together with a warning per clamped
    /// field. Warnings are also logged.
    #[must_use]
    pub fn clamped(
        max_risk_pct: f64,
        min_reward_ratio: f64,
        min_prob_profit: f64,
        max_concentration: f64,
    ) -> (Self, Vec<ClampWarning>) {
        let mut warnings = Vec::new();

        let max_risk_pct = clamp_field(
            "max_risk_pct",
            max_risk_pct,
            MAX_RISK_PCT_BOUNDS,
            &mut warnings,
        );
        let min_reward_ratio = clamp_field(
            "min_reward_ratio",
            min_reward_ratio,
            MIN_REWARD_RATIO_BOUNDS,
            &mut warnings,
        );
        let min_prob_profit = clamp_field(
            "min_prob_profit",
            min_prob_profit,
            MIN_PROB_PROFIT_BOUNDS,
            &mut warnings,
        );
        let max_concentration = clamp_field(
            "max_concentration",
            max_concentration,
            MAX_CONCENTRATION_BOUNDS,
            &mut warnings,
        );

        (
            Self {
                max_risk_pct,
                min_reward_ratio,
                min_prob_profit,
                max_concentration,
            },
            warnings,
        )
    }

    /// Whether every field sits inside its documented bounds.
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        in_range(self.max_risk_pct, MAX_RISK_PCT_BOUNDS)
            && in_range(self.min_reward_ratio, MIN_REWARD_RATIO_BOUNDS)
            && in_range(self.min_prob_profit, MIN_PROB_PROFIT_BOUNDS)
            && in_range(self.max_concentration, MAX_CONCENTRATION_BOUNDS)
    }
}

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

fn clamp_field(
    field: &'static str,
    supplied: f64,
    (lo, hi): (f64, f64),
    warnings: &mut Vec<ClampWarning>,
) -> f64 {
    // NaN input degrades to the lower bound.
    let clamped = if supplied.is_nan() {
        lo
    } else {
        supplied.clamp(lo, hi)
    };
    if clamped != supplied || supplied.is_nan() {
        warn!(field, supplied, clamped_to = clamped, "risk config value clamped");
        warnings.push(ClampWarning {
            field,
            supplied,
            clamped_to: clamped,
        });
    }
    clamped
}
