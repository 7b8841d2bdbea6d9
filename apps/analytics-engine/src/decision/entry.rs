//! Priority-ordered entry rules.
//!
//! Rules are explicit tagged records evaluated top to bottom; the first
//! match decides.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Entry rule thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Reject when any monitored strike's probability of touch exceeds this.
    pub max_touch_probability: f64,
    /// Reject when the distance to the nearest strike is under this many
    /// ATR units.
    pub min_atr_distance: f64,
    /// Reject when implied volatility exceeds this.
    pub max_implied_vol: f64,
    /// Size factor applied on a moderate-confidence setup.
    pub moderate_size_factor: f64,
    /// Size factor applied on a low-confidence setup.
    pub low_size_factor: f64,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            max_touch_probability: 0.75,
            min_atr_distance: 1.5,
            max_implied_vol: 0.90,
            moderate_size_factor: 0.50,
            low_size_factor: 0.25,
        }
    }
}

/// Setup confidence from the probability analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClassification {
    /// Full-size setup.
    High,
    /// Half-size setup.
    Moderate,
    /// Quarter-size setup.
    Low,
}

/// Inputs to one entry evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryContext {
    /// Whether overall setup validation passed.
    pub setup_valid: bool,
    /// Why validation failed, when it did.
    pub validation_reason: Option<String>,
    /// Probability of touch per monitored strike.
    pub touch_probabilities: Vec<(Decimal, f64)>,
    /// Distance from spot to the nearest monitored strike, in ATR units.
    pub distance_atr: f64,
    /// Current implied volatility of the candidate position.
    pub implied_volatility: f64,
    /// Setup confidence classification.
    pub risk_class: RiskClassification,
}

/// Outcome of entry evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryDecision {
    /// Enter at the given fraction of full size.
    Approve {
        /// Size factor in (0, 1].
        size_factor: f64,
    },
    /// Do not enter.
    Reject {
        /// Human-readable reason.
        reason: String,
    },
}

/// One tagged entry rule.
pub struct EntryRule {
    /// Stable rule name.
    pub name: &'static str,
    /// Condition; returns the decision when it matches.
    pub evaluate: fn(&EntryContext, &EntryConfig) -> Option<EntryDecision>,
}

impl std::fmt::Debug for EntryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Entry evaluation result, with the rule that decided.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEvaluation {
    /// The decision.
    pub decision: EntryDecision,
    /// Name of the deciding rule.
    pub rule: &'static str,
}

/// The default ordered entry rule list.
#[must_use]
pub fn default_entry_rules() -> Vec<EntryRule> {
    vec![
        EntryRule {
            name: "setup_validation",
            evaluate: |ctx, _| {
                (!ctx.setup_valid).then(|| EntryDecision::Reject {
                    reason: ctx
                        .validation_reason
                        .clone()
                        .unwrap_or_else(|| "setup validation failed".to_string()),
                })
            },
        },
        EntryRule {
            name: "touch_probability",
            evaluate: |ctx, config| {
                ctx.touch_probabilities
                    .iter()
                    .find(|(_, p)| *p > config.max_touch_probability)
                    .map(|(strike, p)| EntryDecision::Reject {
                        reason: format!(
                            "probability of touching {strike} is {p:.2}, above {:.2}",
                            config.max_touch_probability
                        ),
                    })
            },
        },
        EntryRule {
            name: "atr_distance",
            evaluate: |ctx, config| {
                (ctx.distance_atr < config.min_atr_distance).then(|| EntryDecision::Reject {
                    reason: format!(
                        "nearest strike only {:.2} ATR away, below {:.2}",
                        ctx.distance_atr, config.min_atr_distance
                    ),
                })
            },
        },
        EntryRule {
            name: "extreme_iv",
            evaluate: |ctx, config| {
                (ctx.implied_volatility > config.max_implied_vol).then(|| {
                    EntryDecision::Reject {
                        reason: format!(
                            "implied volatility {:.0}% above {:.0}%",
                            ctx.implied_volatility * 100.0,
                            config.max_implied_vol * 100.0
                        ),
                    }
                })
            },
        },
        EntryRule {
            name: "reduced_size",
            evaluate: |ctx, config| match ctx.risk_class {
                RiskClassification::Moderate => Some(EntryDecision::Approve {
                    size_factor: config.moderate_size_factor,
                }),
                RiskClassification::Low => Some(EntryDecision::Approve {
                    size_factor: config.low_size_factor,
                }),
                RiskClassification::High => None,
            },
        },
        EntryRule {
            name: "full_size",
            evaluate: |_, _| Some(EntryDecision::Approve { size_factor: 1.0 }),
        },
    ]
}

/// Evaluate the ordered rule list; the first match wins.
///
/// The final `full_size` rule always matches, so a decision is guaranteed
/// with the default list.
#[must_use]
pub fn evaluate_entry(
    ctx: &EntryContext,
    config: &EntryConfig,
    rules: &[EntryRule],
) -> EntryEvaluation {
    for rule in rules {
        if let Some(decision) = (rule.evaluate)(ctx, config) {
            debug!(rule = rule.name, ?decision, "entry rule matched");
            return EntryEvaluation {
                decision,
                rule: rule.name,
            };
        }
    }
    EntryEvaluation {
        decision: EntryDecision::Reject {
            reason: "no entry rule matched".to_string(),
        },
        rule: "none",
    }
}
