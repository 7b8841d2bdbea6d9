//! Composite scoring and threshold filtering of generated strategies.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ChainSnapshot, MaxProfit, Strategy};

/// Weight of the reward/risk component.
const WEIGHT_REWARD: f64 = 0.40;
/// Weight of the probability component.
const WEIGHT_PROBABILITY: f64 = 0.30;
/// Weight of the expected-value component.
const WEIGHT_EXPECTED_VALUE: f64 = 0.20;
/// Weight of the liquidity component.
const WEIGHT_LIQUIDITY: f64 = 0.10;
/// Reward ratio treated as "full marks" in the reward component.
const REWARD_SCALE: f64 = 5.0;
/// Leg volume treated as fully liquid.
const LIQUIDITY_SCALE: f64 = 1_000.0;
/// Preference bonus weight.
const PREFERENCE_WEIGHT: f64 = 0.10;
/// Stand-in reward ratio for unbounded-profit structures.
const UNBOUNDED_REWARD_RATIO: f64 = 10.0;

/// Hard thresholds applied before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyFilter {
    /// Minimum reward/risk ratio.
    pub min_reward_ratio: f64,
    /// Minimum probability of profit.
    pub min_prob_profit: f64,
    /// Maximum per-share risk.
    pub max_risk: Decimal,
}

/// Profile preference adjusting the composite score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingPreference {
    /// No adjustment.
    #[default]
    Neutral,
    /// Bonus for high reward/risk.
    Aggressive,
    /// Bonus for high probability of profit.
    Conservative,
}

/// Score components, for transparency in results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 40% weight: reward ratio over 5.
    pub reward: f64,
    /// 30% weight: probability of profit.
    pub probability: f64,
    /// 20% weight: expected value over max risk.
    pub expected_value: f64,
    /// 10% weight: average leg volume over 1,000, capped at 1.
    pub liquidity: f64,
    /// Optional preference bonus.
    pub preference_bonus: f64,
}

impl ScoreBreakdown {
    /// Total composite score.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.reward + self.probability + self.expected_value + self.liquidity
            + self.preference_bonus
    }
}

/// A strategy that survived filtering, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStrategy {
    /// The underlying strategy.
    pub strategy: Strategy,
    /// Composite score.
    pub score: f64,
    /// Score components.
    pub breakdown: ScoreBreakdown,
}

/// Filter and rank strategies, best score first.
///
/// The snapshot is consulted for per-leg volume in the liquidity component.
#[must_use]
pub fn rank_strategies(
    strategies: Vec<Strategy>,
    chain: &ChainSnapshot,
    filter: &StrategyFilter,
    preference: RankingPreference,
) -> Vec<RankedStrategy> {
    let candidates = strategies.len();
    let mut ranked: Vec<RankedStrategy> = strategies
        .into_iter()
        .filter(|s| passes_filter(s, filter))
        .map(|s| score_strategy(s, chain, preference))
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    debug!(
        candidates,
        survivors = ranked.len(),
        "strategy ranking complete"
    );
    ranked
}

fn passes_filter(strategy: &Strategy, filter: &StrategyFilter) -> bool {
    if strategy.probability_profit < filter.min_prob_profit {
        return false;
    }
    if strategy.max_risk > filter.max_risk {
        return false;
    }
    match strategy.risk_reward() {
        Some(rr) => rr.to_f64().unwrap_or(0.0) >= filter.min_reward_ratio,
        // Unbounded upside (or nothing at risk) trivially clears the bar.
        None => true,
    }
}

fn score_strategy(
    strategy: Strategy,
    chain: &ChainSnapshot,
    preference: RankingPreference,
) -> RankedStrategy {
    let reward_ratio = match strategy.max_profit {
        MaxProfit::Unbounded => UNBOUNDED_REWARD_RATIO,
        MaxProfit::Limited(_) => strategy
            .risk_reward()
            .and_then(|rr| rr.to_f64())
            .unwrap_or(0.0),
    };

    let ev_over_risk = strategy
        .expected_value()
        .map_or(0.0, |ev| {
            let risk = strategy.max_risk.to_f64().unwrap_or(0.0);
            if risk > 0.0 { ev / risk } else { 0.0 }
        });

    let liquidity = (average_leg_volume(&strategy, chain) / LIQUIDITY_SCALE).min(1.0);

    let preference_bonus = match preference {
        RankingPreference::Neutral => 0.0,
        RankingPreference::Aggressive => PREFERENCE_WEIGHT * (reward_ratio / REWARD_SCALE),
        RankingPreference::Conservative => PREFERENCE_WEIGHT * strategy.probability_profit,
    };

    let breakdown = ScoreBreakdown {
        reward: WEIGHT_REWARD * (reward_ratio / REWARD_SCALE),
        probability: WEIGHT_PROBABILITY * strategy.probability_profit,
        expected_value: WEIGHT_EXPECTED_VALUE * ev_over_risk,
        liquidity: WEIGHT_LIQUIDITY * liquidity,
        preference_bonus,
    };

    RankedStrategy {
        score: breakdown.total(),
        breakdown,
        strategy,
    }
}

fn average_leg_volume(strategy: &Strategy, chain: &ChainSnapshot) -> f64 {
    if strategy.legs.is_empty() {
        return 0.0;
    }
    let total: i64 = strategy
        .legs
        .iter()
        .map(|leg| {
            chain
                .slice(leg.expiration)
                .and_then(|slice| {
                    slice
                        .all()
                        .find(|c| {
                            c.strike == leg.strike && c.option_type == leg.option_type
                        })
                        .map(|c| c.quote.volume)
                })
                .unwrap_or(0)
        })
        .sum();
    total as f64 / strategy.legs.len() as f64
}
