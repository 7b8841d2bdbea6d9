//! Vertical (debit) spread construction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    ChainSnapshot, LegAction, MaxProfit, NetPremium, OptionContract, OptionType, SpreadDirection,
    Strategy, StrategyKind, StrategyLeg,
};
use chrono::NaiveDate;

/// Bounds for the auto-scan pairing of long and short legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalScanConfig {
    /// Minimum short-leg distance as a fraction of the long strike.
    pub min_width_pct: f64,
    /// Maximum short-leg distance as a fraction of the long strike.
    pub max_width_pct: f64,
}

impl Default for VerticalScanConfig {
    fn default() -> Self {
        Self {
            min_width_pct: 0.05,
            max_width_pct: 0.25,
        }
    }
}

/// Auto-scan vertical spreads at one expiration.
///
/// Bullish spreads pair calls ascending from the at-the-money strike;
/// bearish spreads pair puts descending. Short legs sit 5%-25% of the long
/// strike away by default. Non-positive net debits are rejected.
#[must_use]
pub fn generate_verticals(
    chain: &ChainSnapshot,
    expiration: NaiveDate,
    direction: SpreadDirection,
    config: &VerticalScanConfig,
) -> Vec<Strategy> {
    let Some(slice) = chain.slice(expiration) else {
        return Vec::new();
    };

    let side = match direction {
        SpreadDirection::Bullish => &slice.calls,
        SpreadDirection::Bearish => &slice.puts,
    };

    let mut contracts: Vec<&OptionContract> =
        side.iter().filter(|c| c.is_tradeable()).collect();
    contracts.sort_by_key(|c| c.strike);
    if contracts.len() < 2 {
        return Vec::new();
    }

    let atm_idx = contracts
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| (c.strike - chain.underlying_price).abs())
        .map_or(0, |(i, _)| i);

    let mut spreads = Vec::new();
    match direction {
        SpreadDirection::Bullish => {
            // Long a call near the money, short further out, ascending.
            for (i, long) in contracts.iter().enumerate().skip(atm_idx.saturating_sub(1)) {
                for short in contracts.iter().skip(i + 1) {
                    if !width_in_bounds(long.strike, short.strike, config) {
                        continue;
                    }
                    if let Some(spread) = build_vertical(chain, long, short, direction) {
                        spreads.push(spread);
                    }
                }
            }
        }
        SpreadDirection::Bearish => {
            // Long a put near the money, short further down, descending.
            let upper = (atm_idx + 1).min(contracts.len() - 1);
            for i in (0..=upper).rev() {
                let long = contracts[i];
                for j in (0..i).rev() {
                    let short = contracts[j];
                    if !width_in_bounds(long.strike, short.strike, config) {
                        continue;
                    }
                    if let Some(spread) = build_vertical(chain, long, short, direction) {
                        spreads.push(spread);
                    }
                }
            }
        }
    }

    spreads
}

/// Construct verticals from caller-supplied (long, short) strike pairs.
///
/// Pairs that don't resolve to tradeable contracts are skipped.
#[must_use]
pub fn verticals_from_targets(
    chain: &ChainSnapshot,
    expiration: NaiveDate,
    direction: SpreadDirection,
    targets: &[(Decimal, Decimal)],
) -> Vec<Strategy> {
    let Some(slice) = chain.slice(expiration) else {
        return Vec::new();
    };
    let side = match direction {
        SpreadDirection::Bullish => &slice.calls,
        SpreadDirection::Bearish => &slice.puts,
    };

    targets
        .iter()
        .filter_map(|&(long_strike, short_strike)| {
            let long = find_contract(side, long_strike)?;
            let short = find_contract(side, short_strike)?;
            build_vertical(chain, long, short, direction)
        })
        .collect()
}

fn find_contract(side: &[OptionContract], strike: Decimal) -> Option<&OptionContract> {
    side.iter().find(|c| c.strike == strike && c.is_tradeable())
}

fn width_in_bounds(long_strike: Decimal, short_strike: Decimal, config: &VerticalScanConfig) -> bool {
    use rust_decimal::prelude::ToPrimitive;
    let long = long_strike.to_f64().unwrap_or(0.0);
    let width = (short_strike - long_strike).abs().to_f64().unwrap_or(0.0);
    if long <= 0.0 {
        return false;
    }
    let pct = width / long;
    pct >= config.min_width_pct && pct <= config.max_width_pct
}

/// Build a debit vertical from a long and a short contract of the same type.
///
/// Returns `None` when the spread is not economically valid: non-positive
/// net debit, or a debit exceeding the strike width.
fn build_vertical(
    chain: &ChainSnapshot,
    long: &OptionContract,
    short: &OptionContract,
    direction: SpreadDirection,
) -> Option<Strategy> {
    let net_debit = long.premium() - short.premium();
    if net_debit <= Decimal::ZERO {
        return None;
    }

    let width = (short.strike - long.strike).abs();
    let max_profit = width - net_debit;
    if max_profit <= Decimal::ZERO {
        return None;
    }

    let breakeven = match long.option_type {
        OptionType::Call => long.strike + net_debit,
        OptionType::Put => long.strike - net_debit,
    };

    Some(Strategy {
        kind: StrategyKind::VerticalSpread(direction),
        underlying: chain.underlying.clone(),
        legs: vec![
            StrategyLeg {
                action: LegAction::Buy,
                option_type: long.option_type,
                strike: long.strike,
                expiration: long.expiration,
                price: long.premium(),
            },
            StrategyLeg {
                action: LegAction::Sell,
                option_type: short.option_type,
                strike: short.strike,
                expiration: short.expiration,
                price: short.premium(),
            },
        ],
        net_premium: NetPremium::Debit(net_debit),
        max_profit: MaxProfit::Limited(max_profit),
        max_risk: net_debit,
        breakevens: vec![breakeven],
        probability_profit: short.greeks.delta.abs().clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractGreeks, ExpirationSlice, Quote};
    use rust_decimal_macros::dec;

    fn contract(
        strike: Decimal,
        option_type: OptionType,
        last: Decimal,
        delta: f64,
    ) -> OptionContract {
        OptionContract {
            underlying: "SPY".to_string(),
            strike,
            expiration: expiry(),
            option_type,
            quote: Quote {
                bid: last - dec!(0.05),
                ask: last + dec!(0.05),
                last,
                volume: 500,
                open_interest: 2_000,
            },
            greeks: ContractGreeks {
                delta,
                gamma: 0.01,
                theta: -0.04,
                vega: 0.12,
                rho: 0.02,
            },
            implied_volatility: 0.20,
        }
    }

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn spread_chain() -> ChainSnapshot {
        let calls = vec![
            contract(dec!(570), OptionType::Call, dec!(8.50), 0.55),
            contract(dec!(580), OptionType::Call, dec!(3.50), 0.35),
            contract(dec!(600), OptionType::Call, dec!(1.20), 0.15),
        ];
        let puts = vec![
            contract(dec!(580), OptionType::Put, dec!(8.00), -0.55),
            contract(dec!(550), OptionType::Put, dec!(2.50), -0.25),
            contract(dec!(520), OptionType::Put, dec!(1.00), -0.10),
        ];
        ChainSnapshot {
            underlying: "SPY".to_string(),
            underlying_price: dec!(575.23),
            expirations: [(expiry(), ExpirationSlice { calls, puts })]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn bull_call_spread_economics() {
        let spreads = verticals_from_targets(
            &spread_chain(),
            expiry(),
            SpreadDirection::Bullish,
            &[(dec!(570), dec!(580))],
        );
        assert_eq!(spreads.len(), 1);
        let s = &spreads[0];
        assert_eq!(s.net_premium, NetPremium::Debit(dec!(5.00)));
        assert_eq!(s.max_profit, MaxProfit::Limited(dec!(5.00)));
        assert_eq!(s.max_risk, dec!(5.00));
        assert_eq!(s.risk_reward(), Some(dec!(1.00)));
        assert_eq!(s.breakevens, vec![dec!(575.00)]);
        assert!((s.probability_profit - 0.35).abs() < 1e-12);
        assert!(s.premium_reconciles());
    }

    #[test]
    fn bear_put_breakeven_subtracts_debit() {
        let spreads = verticals_from_targets(
            &spread_chain(),
            expiry(),
            SpreadDirection::Bearish,
            &[(dec!(580), dec!(550))],
        );
        assert_eq!(spreads.len(), 1);
        let s = &spreads[0];
        // Debit 8.00 - 2.50 = 5.50, breakeven 580 - 5.50.
        assert_eq!(s.breakevens, vec![dec!(574.50)]);
        assert_eq!(s.max_risk, dec!(5.50));
    }

    #[test]
    fn auto_scan_respects_width_bounds() {
        let config = VerticalScanConfig::default();
        let spreads =
            generate_verticals(&spread_chain(), expiry(), SpreadDirection::Bullish, &config);
        // 570/580 is only 1.75% wide - excluded. 570/600 is 5.3% - included.
        assert!(
            spreads
                .iter()
                .all(|s| s.legs[1].strike - s.legs[0].strike >= dec!(28))
        );
        assert!(!spreads.is_empty());
    }

    #[test]
    fn non_positive_debit_rejected() {
        // Long leg cheaper than short leg: a credit, not a debit spread.
        let spreads = verticals_from_targets(
            &spread_chain(),
            expiry(),
            SpreadDirection::Bullish,
            &[(dec!(580), dec!(570))],
        );
        assert!(spreads.is_empty());
    }

    #[test]
    fn missing_expiration_yields_nothing() {
        let other = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let spreads = generate_verticals(
            &spread_chain(),
            other,
            SpreadDirection::Bullish,
            &VerticalScanConfig::default(),
        );
        assert!(spreads.is_empty());
    }
}
