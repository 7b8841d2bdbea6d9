//! Calendar-spread construction across the two nearest expirations.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::models::{
    ChainSnapshot, LegAction, MaxProfit, NetPremium, OptionContract, OptionType, Strategy,
    StrategyKind, StrategyLeg,
};

/// Max-profit policy for calendar spreads.
///
/// The reference model approximates calendar max profit as a flat fraction
/// of the net debit (default 30%) instead of pricing the residual time
/// value of the long leg. The coarse heuristic is deliberate; substitute a
/// different fraction to override it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarProfitPolicy {
    /// Fraction of the net debit reported as max profit.
    pub profit_fraction: f64,
    /// Strikes must sit within this fraction of spot.
    pub strike_window_pct: f64,
}

impl Default for CalendarProfitPolicy {
    fn default() -> Self {
        Self {
            profit_fraction: 0.30,
            strike_window_pct: 0.05,
        }
    }
}

impl CalendarProfitPolicy {
    /// Estimated max profit for a given net debit.
    #[must_use]
    pub fn max_profit(&self, net_debit: Decimal) -> Decimal {
        net_debit * Decimal::from_f64(self.profit_fraction).unwrap_or_default()
    }
}

/// Generate calendar spreads: sell the near expiration, buy the far one at
/// the same ATM-ish strike.
///
/// Requires at least two expirations; strikes outside the spot window or
/// with a non-positive net debit are rejected.
#[must_use]
pub fn generate_calendars(chain: &ChainSnapshot, policy: &CalendarProfitPolicy) -> Vec<Strategy> {
    let expirations = chain.nearest_expirations(2);
    let [near, far] = expirations.as_slice() else {
        return Vec::new();
    };
    let (near, far) = (*near, *far);

    let spot = chain.underlying_price.to_f64().unwrap_or(0.0);
    if spot <= 0.0 {
        return Vec::new();
    }

    let mut calendars = Vec::new();
    for option_type in [OptionType::Call, OptionType::Put] {
        let near_side = side(chain, near, option_type);
        let far_side = side(chain, far, option_type);

        for near_contract in near_side {
            let strike = near_contract.strike.to_f64().unwrap_or(0.0);
            if (strike - spot).abs() / spot > policy.strike_window_pct {
                continue;
            }
            let Some(far_contract) = far_side
                .iter()
                .find(|c| c.strike == near_contract.strike && c.is_tradeable())
            else {
                continue;
            };
            if let Some(calendar) = build_calendar(chain, near_contract, far_contract, policy) {
                calendars.push(calendar);
            }
        }
    }
    calendars
}

fn side(
    chain: &ChainSnapshot,
    expiration: chrono::NaiveDate,
    option_type: OptionType,
) -> Vec<&OptionContract> {
    chain.slice(expiration).map_or_else(Vec::new, |slice| {
        let contracts = match option_type {
            OptionType::Call => &slice.calls,
            OptionType::Put => &slice.puts,
        };
        contracts.iter().filter(|c| c.is_tradeable()).collect()
    })
}

fn build_calendar(
    chain: &ChainSnapshot,
    near: &OptionContract,
    far: &OptionContract,
    policy: &CalendarProfitPolicy,
) -> Option<Strategy> {
    let net_debit = far.premium() - near.premium();
    if net_debit <= Decimal::ZERO {
        return None;
    }

    // ATM proximity proxy: the closer the short leg's delta to 0.50, the
    // likelier price stays near the strike through near-term expiry.
    let probability_profit = (1.0 - (2.0 * near.greeks.delta.abs() - 1.0).abs()).clamp(0.0, 1.0);

    Some(Strategy {
        kind: StrategyKind::CalendarSpread,
        underlying: chain.underlying.clone(),
        legs: vec![
            StrategyLeg {
                action: LegAction::Sell,
                option_type: near.option_type,
                strike: near.strike,
                expiration: near.expiration,
                price: near.premium(),
            },
            StrategyLeg {
                action: LegAction::Buy,
                option_type: far.option_type,
                strike: far.strike,
                expiration: far.expiration,
                price: far.premium(),
            },
        ],
        net_premium: NetPremium::Debit(net_debit),
        max_profit: MaxProfit::Limited(policy.max_profit(net_debit)),
        max_risk: net_debit,
        breakevens: vec![near.strike],
        probability_profit,
    })
}
