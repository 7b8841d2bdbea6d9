//! Iron-condor construction.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{
    ChainSnapshot, LegAction, MaxProfit, NetPremium, OptionContract, OptionType, Strategy,
    StrategyKind, StrategyLeg,
};
use chrono::NaiveDate;

/// Iron-condor construction bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondorConfig {
    /// Short-strike candidates considered on each side of spot.
    pub short_candidates: usize,
    /// Maximum relative mismatch between call-wing and put-wing widths.
    pub max_wing_mismatch: f64,
    /// Maximum candidates returned, best credit first.
    pub max_results: usize,
}

impl Default for CondorConfig {
    fn default() -> Self {
        Self {
            short_candidates: 5,
            max_wing_mismatch: 0.30,
            max_results: 10,
        }
    }
}

/// Generate iron condors at one expiration.
///
/// Short calls come from the first strikes above spot, short puts from the
/// first strikes below; wings whose widths differ by more than the
/// configured mismatch are rejected, as are non-positive net credits.
/// Results are sorted by net credit, best first, and capped.
#[must_use]
pub fn generate_condors(
    chain: &ChainSnapshot,
    expiration: NaiveDate,
    config: &CondorConfig,
) -> Vec<Strategy> {
    let Some(slice) = chain.slice(expiration) else {
        return Vec::new();
    };
    let spot = chain.underlying_price;

    let mut calls: Vec<&OptionContract> =
        slice.calls.iter().filter(|c| c.is_tradeable()).collect();
    calls.sort_by_key(|c| c.strike);
    let mut puts: Vec<&OptionContract> = slice.puts.iter().filter(|c| c.is_tradeable()).collect();
    puts.sort_by_key(|c| c.strike);

    // Call wings: short from the first strikes above spot, long further up.
    let call_wings = call_wings(&calls, spot, config.short_candidates);
    // Put wings: short from the first strikes below spot, long further down.
    let put_wings = put_wings(&puts, spot, config.short_candidates);

    let mut condors = Vec::new();
    for &(short_call, long_call) in &call_wings {
        let call_width = long_call.strike - short_call.strike;
        for &(short_put, long_put) in &put_wings {
            let put_width = short_put.strike - long_put.strike;
            if !wings_match(call_width, put_width, config.max_wing_mismatch) {
                continue;
            }
            if let Some(condor) =
                build_condor(chain, short_call, long_call, short_put, long_put)
            {
                condors.push(condor);
            }
        }
    }

    condors.sort_by(|a, b| b.net_premium.amount().cmp(&a.net_premium.amount()));
    condors.truncate(config.max_results);
    condors
}

fn call_wings<'a>(
    calls: &[&'a OptionContract],
    spot: Decimal,
    short_candidates: usize,
) -> Vec<(&'a OptionContract, &'a OptionContract)> {
    let above: Vec<&OptionContract> = calls
        .iter()
        .copied()
        .filter(|c| c.strike > spot)
        .collect();

    let mut wings = Vec::new();
    for (i, &short) in above.iter().take(short_candidates).enumerate() {
        for &long in above.iter().skip(i + 1) {
            wings.push((short, long));
        }
    }
    wings
}

fn put_wings<'a>(
    puts: &[&'a OptionContract],
    spot: Decimal,
    short_candidates: usize,
) -> Vec<(&'a OptionContract, &'a OptionContract)> {
    let below: Vec<&OptionContract> = puts
        .iter()
        .rev()
        .copied()
        .filter(|c| c.strike < spot)
        .collect();

    let mut wings = Vec::new();
    for (i, &short) in below.iter().take(short_candidates).enumerate() {
        for &long in below.iter().skip(i + 1) {
            wings.push((short, long));
        }
    }
    wings
}

fn wings_match(call_width: Decimal, put_width: Decimal, max_mismatch: f64) -> bool {
    let call = call_width.to_f64().unwrap_or(0.0);
    let put = put_width.to_f64().unwrap_or(0.0);
    let wider = call.max(put);
    if wider <= 0.0 {
        return false;
    }
    (call - put).abs() / wider <= max_mismatch
}

fn build_condor(
    chain: &ChainSnapshot,
    short_call: &OptionContract,
    long_call: &OptionContract,
    short_put: &OptionContract,
    long_put: &OptionContract,
) -> Option<Strategy> {
    let net_credit = short_call.premium() + short_put.premium()
        - long_call.premium()
        - long_put.premium();
    if net_credit <= Decimal::ZERO {
        return None;
    }

    let call_width = long_call.strike - short_call.strike;
    let put_width = short_put.strike - long_put.strike;
    let max_risk = call_width.max(put_width) - net_credit;
    if max_risk <= Decimal::ZERO {
        return None;
    }

    let probability_profit = (1.0
        - (short_call.greeks.delta.abs() + short_put.greeks.delta.abs()))
    .clamp(0.0, 1.0);

    Some(Strategy {
        kind: StrategyKind::IronCondor,
        underlying: chain.underlying.clone(),
        legs: vec![
            StrategyLeg {
                action: LegAction::Sell,
                option_type: OptionType::Put,
                strike: short_put.strike,
                expiration: short_put.expiration,
                price: short_put.premium(),
            },
            StrategyLeg {
                action: LegAction::Buy,
                option_type: OptionType::Put,
                strike: long_put.strike,
                expiration: long_put.expiration,
                price: long_put.premium(),
            },
            StrategyLeg {
                action: LegAction::Sell,
                option_type: OptionType::Call,
                strike: short_call.strike,
                expiration: short_call.expiration,
                price: short_call.premium(),
            },
            StrategyLeg {
                action: LegAction::Buy,
                option_type: OptionType::Call,
                strike: long_call.strike,
                expiration: long_call.expiration,
                price: long_call.premium(),
            },
        ],
        net_premium: NetPremium::Credit(net_credit),
        max_profit: MaxProfit::Limited(net_credit),
        max_risk,
        breakevens: vec![short_put.strike - net_credit, short_call.strike + net_credit],
        probability_profit,
    })
}
