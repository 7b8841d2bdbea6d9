//! Cost-adjusted position sizing.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::costs::{CostBreakdown, CostConfig, transaction_costs};
use super::kelly::KellyPolicy;
use crate::models::{ChainSnapshot, MaxProfit, NetPremium, RiskConfig, Strategy};

/// Contract multiplier in dollars.
const MULTIPLIER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Win/loss ratio stand-in for unlimited-upside structures.
const UNBOUNDED_WIN_LOSS: f64 = 10.0;

/// Sizing recommendation for one strategy.
///
/// A failed recommendation is a value, not an error: check `rejection`
/// before acting on the contract count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    /// Contracts to trade (zero when rejected).
    pub recommended_contracts: u32,
    /// Total entry outlay in dollars, including friction.
    pub total_cost: Decimal,
    /// Total cost-adjusted risk in dollars.
    pub total_risk: Decimal,
    /// Total cost-adjusted profit potential in dollars.
    pub potential_profit: Decimal,
    /// Scaled Kelly fraction in [0, 1].
    pub kelly_fraction: f64,
    /// Per-contract friction breakdown.
    pub costs: CostBreakdown,
    /// Reason the strategy failed sizing criteria, if it did.
    pub rejection: Option<String>,
}

impl PositionSizing {
    fn rejected(reason: String, costs: CostBreakdown) -> Self {
        Self {
            recommended_contracts: 0,
            total_cost: Decimal::ZERO,
            total_risk: Decimal::ZERO,
            potential_profit: Decimal::ZERO,
            kelly_fraction: 0.0,
            costs,
            rejection: Some(reason),
        }
    }
}

/// Position sizer combining risk budgets, transaction costs and the Kelly
/// policy.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    /// Validated account risk parameters.
    pub risk: RiskConfig,
    /// Transaction-cost model.
    pub costs: CostConfig,
    /// Kelly scaling policy.
    pub kelly: KellyPolicy,
}

impl PositionSizer {
    /// Create a sizer from its parts.
    #[must_use]
    pub const fn new(risk: RiskConfig, costs: CostConfig, kelly: KellyPolicy) -> Self {
        Self {
            risk,
            costs,
            kelly,
        }
    }

    /// Size a strategy against the account value.
    ///
    /// Contract count is the lesser of the risk budget
    /// (`account * max_risk_pct`) over cost-adjusted risk per contract and
    /// the concentration budget (`account * max_concentration`) over entry
    /// cost per contract, floored to at least one contract when the
    /// strategy is not rejected.
    #[must_use]
    pub fn size(
        &self,
        strategy: &Strategy,
        chain: &ChainSnapshot,
        account_value: Decimal,
    ) -> PositionSizing {
        // First pass without market impact; large counts re-price below.
        let mut costs = transaction_costs(strategy, chain, 1, &self.costs);
        let mut contracts = match self.contracts_for(strategy, account_value, &costs) {
            Ok(contracts) => contracts,
            Err(rejection) => return PositionSizing::rejected(rejection, costs),
        };

        if contracts >= self.costs.impact_threshold_contracts {
            costs = transaction_costs(strategy, chain, contracts, &self.costs);
            contracts = match self.contracts_for(strategy, account_value, &costs) {
                Ok(contracts) => contracts,
                Err(rejection) => return PositionSizing::rejected(rejection, costs),
            };
        }

        let friction = costs.total();
        let adj_risk = strategy.max_risk * MULTIPLIER + friction;
        let adj_reward = self.adjusted_reward(strategy, friction);
        let win_loss_ratio = ratio(adj_reward, adj_risk);
        let kelly_fraction = self
            .kelly
            .fraction(strategy.probability_profit, win_loss_ratio);

        let count = Decimal::from(contracts);
        let sizing = PositionSizing {
            recommended_contracts: contracts,
            total_cost: self.entry_cost(strategy, friction) * count,
            total_risk: adj_risk * count,
            potential_profit: adj_reward * count,
            kelly_fraction,
            costs,
            rejection: None,
        };
        debug!(
            symbol = %strategy.underlying,
            kind = %strategy.kind,
            contracts,
            kelly = kelly_fraction,
            "position sized"
        );
        sizing
    }

    /// Contract count from the two budgets, or the rejection reason.
    fn contracts_for(
        &self,
        strategy: &Strategy,
        account_value: Decimal,
        costs: &CostBreakdown,
    ) -> Result<u32, String> {
        let friction = costs.total();
        let adj_risk = strategy.max_risk * MULTIPLIER + friction;
        let adj_reward = self.adjusted_reward(strategy, friction);
        let reward_ratio = ratio(adj_reward, adj_risk);

        if reward_ratio < self.risk.min_reward_ratio {
            return Err(format!(
                "reward ratio {reward_ratio:.2} below minimum {:.2} after transaction costs",
                self.risk.min_reward_ratio
            ));
        }
        if strategy.probability_profit < self.risk.min_prob_profit {
            return Err(format!(
                "probability of profit {:.2} below minimum {:.2}",
                strategy.probability_profit, self.risk.min_prob_profit
            ));
        }

        let risk_budget = account_value * decimal_from(self.risk.max_risk_pct);
        let position_budget = account_value * decimal_from(self.risk.max_concentration);
        let entry_cost = self.entry_cost(strategy, friction);

        let by_risk = floor_div(risk_budget, adj_risk);
        let by_concentration = floor_div(position_budget, entry_cost);
        Ok(by_risk.min(by_concentration).max(1))
    }

    /// Cost-adjusted profit potential per contract.
    fn adjusted_reward(&self, strategy: &Strategy, friction: Decimal) -> Decimal {
        match strategy.max_profit {
            MaxProfit::Limited(profit) => (profit * MULTIPLIER - friction).max(Decimal::ZERO),
            // Stand-in for unlimited upside; keeps ratios finite.
            MaxProfit::Unbounded => {
                strategy.max_risk * MULTIPLIER * Decimal::from(UNBOUNDED_WIN_LOSS as i64)
            }
        }
    }

    /// Entry outlay per contract: the debit paid, or the margin held
    /// against a credit, plus friction.
    fn entry_cost(&self, strategy: &Strategy, friction: Decimal) -> Decimal {
        let base = match strategy.net_premium {
            NetPremium::Debit(debit) => debit * MULTIPLIER,
            NetPremium::Credit(_) => strategy.max_risk * MULTIPLIER,
        };
        base + friction
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator <= Decimal::ZERO {
        return 0.0;
    }
    (numerator / denominator).to_f64().unwrap_or(0.0)
}

fn floor_div(budget: Decimal, per_contract: Decimal) -> u32 {
    if per_contract <= Decimal::ZERO {
        return 0;
    }
    (budget / per_contract).floor().to_u32().unwrap_or(0)
}

fn decimal_from(value: f64) -> Decimal {
    use rust_decimal::prelude::FromPrimitive;
    Decimal::from_f64(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContractGreeks, ExpirationSlice, LegAction, OptionContract, OptionType, Quote,
        SpreadDirection, StrategyKind, StrategyLeg,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn chain() -> ChainSnapshot {
        let contract = |strike: Decimal| OptionContract {
            underlying: "SPY".to_string(),
            strike,
            expiration: expiry(),
            option_type: OptionType::Call,
            quote: Quote {
                bid: dec!(2.00),
                ask: dec!(2.02), // tight $0.02 spread
                last: dec!(2.01),
                volume: 100,
                open_interest: 1_000,
            },
            greeks: ContractGreeks::default(),
            implied_volatility: 0.20,
        };
        ChainSnapshot {
            underlying: "SPY".to_string(),
            underlying_price: dec!(575),
            expirations: [(
                expiry(),
                ExpirationSlice {
                    calls: vec![contract(dec!(570)), contract(dec!(580))],
                    puts: vec![],
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    fn spread(probability: f64, max_profit: Decimal, max_risk: Decimal) -> Strategy {
        Strategy {
            kind: StrategyKind::VerticalSpread(SpreadDirection::Bullish),
            underlying: "SPY".to_string(),
            legs: vec![
                StrategyLeg {
                    action: LegAction::Buy,
                    option_type: OptionType::Call,
                    strike: dec!(570),
                    expiration: expiry(),
                    price: dec!(8.50),
                },
                StrategyLeg {
                    action: LegAction::Sell,
                    option_type: OptionType::Call,
                    strike: dec!(580),
                    expiration: expiry(),
                    price: dec!(3.50),
                },
            ],
            net_premium: NetPremium::Debit(max_risk),
            max_profit: MaxProfit::Limited(max_profit),
            max_risk,
            breakevens: vec![dec!(575)],
            probability_profit: probability,
        }
    }

    fn sizer() -> PositionSizer {
        let (risk, _) = RiskConfig::clamped(0.02, 1.5, 0.40, 0.20);
        PositionSizer::new(risk, CostConfig::default(), KellyPolicy::default())
    }

    #[test]
    fn healthy_spread_is_sized() {
        // 10.00 profit vs 5.00 risk clears 1.5x even after friction.
        let sizing = sizer().size(&spread(0.55, dec!(10.00), dec!(5.00)), &chain(), dec!(100_000));
        assert!(sizing.rejection.is_none());
        // Risk budget 2,000 over ~503.34 per contract -> 3 contracts.
        assert_eq!(sizing.recommended_contracts, 3);
        assert!(sizing.kelly_fraction > 0.0);
        assert!(sizing.total_risk <= dec!(2000));
    }

    #[test]
    fn thin_reward_rejected_after_costs() {
        // 7.55 vs 5.00 is 1.51x raw, but friction drags it below 1.5x.
        let sizing = sizer().size(&spread(0.55, dec!(7.55), dec!(5.00)), &chain(), dec!(100_000));
        let reason = sizing.rejection.unwrap();
        assert!(reason.contains("reward ratio"));
        assert_eq!(sizing.recommended_contracts, 0);
        assert!((sizing.kelly_fraction - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn low_probability_rejected_with_reason() {
        let sizing = sizer().size(&spread(0.20, dec!(10.00), dec!(5.00)), &chain(), dec!(100_000));
        assert!(sizing.rejection.unwrap().contains("probability of profit"));
    }

    #[test]
    fn tiny_account_floors_to_one_contract() {
        let sizing = sizer().size(&spread(0.55, dec!(10.00), dec!(5.00)), &chain(), dec!(1_000));
        assert!(sizing.rejection.is_none());
        assert_eq!(sizing.recommended_contracts, 1);
    }

    #[test]
    fn concentration_budget_can_bind_first() {
        let (risk, _) = RiskConfig::clamped(0.10, 1.5, 0.40, 0.05);
        let sizer = PositionSizer::new(risk, CostConfig::default(), KellyPolicy::default());
        let sizing = sizer.size(&spread(0.55, dec!(10.00), dec!(5.00)), &chain(), dec!(100_000));
        // Risk budget 10,000 allows ~19; concentration 5,000 over ~503
        // entry cost allows 9.
        assert!(sizing.rejection.is_none());
        assert_eq!(sizing.recommended_contracts, 9);
    }

    #[test]
    fn large_orders_reprice_with_impact() {
        let (risk, _) = RiskConfig::clamped(0.10, 1.5, 0.40, 0.50);
        let sizer = PositionSizer::new(risk, CostConfig::default(), KellyPolicy::default());
        let sizing = sizer.size(
            &spread(0.55, dec!(10.00), dec!(5.00)),
            &chain(),
            dec!(1_000_000),
        );
        assert!(sizing.rejection.is_none());
        assert!(sizing.recommended_contracts >= 10);
        assert!(sizing.costs.slippage > Decimal::ZERO);
    }

    #[test]
    fn kelly_uses_cost_adjusted_ratio() {
        let sizing = sizer().size(&spread(0.55, dec!(10.00), dec!(5.00)), &chain(), dec!(100_000));
        // friction = 1.30 + 0.04 + 2.00 = 3.34 per contract;
        // b = (1000 - 3.34) / (500 + 3.34) ~ 1.98
        let b: f64 = (1000.0 - 3.34) / 503.34;
        let expected = (((b * 0.55) - 0.45) / b * 0.25).clamp(0.0, 1.0);
        assert!((sizing.kelly_fraction - expected).abs() < 1e-9);
    }
}
