//! Transaction-cost model for multi-leg strategies.
//!
//! Costs per spread unit (one contract of every leg): commission and
//! regulatory fee per contract, half-spread capture on each leg, and a
//! market-impact charge once an order is large enough to move the book.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{ChainSnapshot, Strategy};

/// Transaction-cost configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Broker commission per contract.
    pub commission_per_contract: Decimal,
    /// Regulatory fees (ORF and friends) per contract.
    pub regulatory_fee_per_contract: Decimal,
    /// Fraction of the bid/ask spread paid on each leg.
    pub spread_capture_rate: f64,
    /// Contract count at which market impact starts to apply.
    pub impact_threshold_contracts: u32,
    /// Market impact in basis points of per-contract notional.
    pub impact_bps: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            commission_per_contract: Decimal::new(65, 2), // $0.65
            regulatory_fee_per_contract: Decimal::new(2, 2), // $0.02
            spread_capture_rate: 0.5,
            impact_threshold_contracts: 10,
            impact_bps: 5.0,
        }
    }
}

/// Dollar cost breakdown per spread unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Commission across all legs.
    pub commission: Decimal,
    /// Regulatory fees across all legs.
    pub regulatory_fees: Decimal,
    /// Spread cost across all legs.
    pub spread_cost: Decimal,
    /// Market-impact slippage (zero below the threshold).
    pub slippage: Decimal,
}

impl CostBreakdown {
    /// Total friction per spread unit.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.commission + self.regulatory_fees + self.spread_cost + self.slippage
    }
}

/// Compute the per-unit transaction costs of a strategy.
///
/// Leg bid/ask spreads are looked up from the snapshot; legs missing from
/// the snapshot contribute no spread cost. `contracts` determines whether
/// the market-impact charge applies.
#[must_use]
pub fn transaction_costs(
    strategy: &Strategy,
    chain: &ChainSnapshot,
    contracts: u32,
    config: &CostConfig,
) -> CostBreakdown {
    let legs = Decimal::from(strategy.legs.len());
    let commission = config.commission_per_contract * legs;
    let regulatory_fees = config.regulatory_fee_per_contract * legs;

    let capture = Decimal::from_f64(config.spread_capture_rate).unwrap_or_default();
    let spread_cost: Decimal = strategy
        .legs
        .iter()
        .filter_map(|leg| {
            chain.slice(leg.expiration).and_then(|slice| {
                slice
                    .all()
                    .find(|c| c.strike == leg.strike && c.option_type == leg.option_type)
                    .map(|c| c.quote.spread() * capture * Decimal::from(100))
            })
        })
        .sum();

    let slippage = if contracts >= config.impact_threshold_contracts {
        let notional = strategy.net_premium.amount() * Decimal::from(100);
        notional * Decimal::from_f64(config.impact_bps / 10_000.0).unwrap_or_default()
    } else {
        Decimal::ZERO
    };

    CostBreakdown {
        commission,
        regulatory_fees,
        spread_cost,
        slippage,
    }
}
