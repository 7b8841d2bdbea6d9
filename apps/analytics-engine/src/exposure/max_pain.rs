//! Max-pain strike calculation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{ChainSnapshot, OptionType};

/// Find the strike minimizing aggregate option-holder payout at expiration.
///
/// For each candidate strike `test` in the chain, holders of calls struck
/// below `test` are paid `(test - strike) * OI * 100` and holders of puts
/// struck above are paid `(strike - test) * OI * 100`. The minimizing
/// candidate is max pain. Ties keep the lowest strike. Returns `None` for a
/// chain without strikes.
#[must_use]
pub fn max_pain(chain: &ChainSnapshot) -> Option<Decimal> {
    let strikes = chain.strikes();
    if strikes.is_empty() {
        return None;
    }

    // (strike, OI) pairs aggregated across expirations, per side.
    let mut call_oi: Vec<(f64, f64)> = Vec::new();
    let mut put_oi: Vec<(f64, f64)> = Vec::new();
    for contract in chain.all_contracts() {
        let strike = contract.strike.to_f64().unwrap_or(0.0);
        let oi = contract.quote.open_interest as f64;
        match contract.option_type {
            OptionType::Call => call_oi.push((strike, oi)),
            OptionType::Put => put_oi.push((strike, oi)),
        }
    }

    let mut best: Option<(Decimal, f64)> = None;
    for &candidate in &strikes {
        let test = candidate.to_f64().unwrap_or(0.0);

        let call_payout: f64 = call_oi
            .iter()
            .map(|&(strike, oi)| (test - strike).max(0.0) * oi * 100.0)
            .sum();
        let put_payout: f64 = put_oi
            .iter()
            .map(|&(strike, oi)| (strike - test).max(0.0) * oi * 100.0)
            .sum();
        let payout = call_payout + put_payout;

        match best {
            Some((_, best_payout)) if payout >= best_payout => {}
            _ => best = Some((candidate, payout)),
        }
    }

    best.map(|(strike, _)| strike)
}
