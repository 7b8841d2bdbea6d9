//! Volatility smile and skew classification at a single expiration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ExpirationSlice, OptionType};

/// Wing averages must clear ATM IV by this many vol points to count as
/// elevated.
const WING_TOLERANCE: f64 = 0.005;

/// Delta bucket used for the skew measurement.
const SKEW_DELTA: f64 = 0.25;

/// Shape of the volatility smile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmilePattern {
    /// Both wings above ATM IV.
    Smile,
    /// Put wing elevated (typical equity-index skew).
    Smirk,
    /// Call wing elevated.
    ReverseSmirk,
    /// No meaningful wing elevation.
    Flat,
}

/// Smile analysis for one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmileReport {
    /// Strike closest to spot.
    pub atm_strike: Decimal,
    /// IV at the ATM strike.
    pub atm_iv: f64,
    /// Average IV of strikes below ATM.
    pub put_wing_iv: Option<f64>,
    /// Average IV of strikes above ATM.
    pub call_wing_iv: Option<f64>,
    /// Classified pattern.
    pub pattern: SmilePattern,
    /// IV(~25-delta put) - IV(~25-delta call).
    pub skew_25_delta: Option<f64>,
}

/// Classify the volatility smile of one expiration slice.
///
/// Returns `None` when the slice holds no contracts with a positive IV.
#[must_use]
pub fn analyze_smile(slice: &ExpirationSlice, spot: Decimal) -> Option<SmileReport> {
    let pairs: Vec<(Decimal, f64)> = slice
        .all()
        .filter(|c| c.implied_volatility > 0.0)
        .map(|c| (c.strike, c.implied_volatility))
        .collect();
    if pairs.is_empty() {
        return None;
    }

    // ATM = strike nearest spot; average IV when both sides quote it.
    let atm_strike = pairs
        .iter()
        .map(|&(strike, _)| strike)
        .min_by_key(|strike| (*strike - spot).abs())?;
    let atm_ivs: Vec<f64> = pairs
        .iter()
        .filter(|(strike, _)| *strike == atm_strike)
        .map(|&(_, iv)| iv)
        .collect();
    let atm_iv = atm_ivs.iter().sum::<f64>() / atm_ivs.len() as f64;

    let put_wing_iv = wing_average(&pairs, |strike| strike < atm_strike);
    let call_wing_iv = wing_average(&pairs, |strike| strike > atm_strike);

    let pattern = classify(atm_iv, put_wing_iv, call_wing_iv);
    let skew_25_delta = skew_at_delta(slice, SKEW_DELTA);

    Some(SmileReport {
        atm_strike,
        atm_iv,
        put_wing_iv,
        call_wing_iv,
        pattern,
        skew_25_delta,
    })
}

fn wing_average(pairs: &[(Decimal, f64)], side: impl Fn(Decimal) -> bool) -> Option<f64> {
    let ivs: Vec<f64> = pairs
        .iter()
        .filter(|&&(strike, _)| side(strike))
        .map(|&(_, iv)| iv)
        .collect();
    if ivs.is_empty() {
        None
    } else {
        Some(ivs.iter().sum::<f64>() / ivs.len() as f64)
    }
}

fn classify(atm_iv: f64, put_wing: Option<f64>, call_wing: Option<f64>) -> SmilePattern {
    let put_elevated = put_wing.is_some_and(|iv| iv > atm_iv + WING_TOLERANCE);
    let call_elevated = call_wing.is_some_and(|iv| iv > atm_iv + WING_TOLERANCE);

    match (put_elevated, call_elevated) {
        (true, true) => {
            // Both wings up: a true smile unless one side clearly dominates.
            match (put_wing, call_wing) {
                (Some(put), Some(call)) if put > call + WING_TOLERANCE => SmilePattern::Smirk,
                (Some(put), Some(call)) if call > put + WING_TOLERANCE => {
                    SmilePattern::ReverseSmirk
                }
                _ => SmilePattern::Smile,
            }
        }
        (true, false) => SmilePattern::Smirk,
        (false, true) => SmilePattern::ReverseSmirk,
        (false, false) => SmilePattern::Flat,
    }
}

/// Skew at an approximate delta bucket: IV of the put nearest `-delta`
/// minus IV of the call nearest `+delta`.
#[must_use]
pub fn skew_at_delta(slice: &ExpirationSlice, delta: f64) -> Option<f64> {
    let put_iv = nearest_delta_iv(slice, OptionType::Put, delta)?;
    let call_iv = nearest_delta_iv(slice, OptionType::Call, delta)?;
    Some(put_iv - call_iv)
}

fn nearest_delta_iv(slice: &ExpirationSlice, kind: OptionType, target: f64) -> Option<f64> {
    let contracts = match kind {
        OptionType::Call => &slice.calls,
        OptionType::Put => &slice.puts,
    };
    contracts
        .iter()
        .filter(|c| c.implied_volatility > 0.0 && c.greeks.delta != 0.0)
        .min_by(|a, b| {
            let da = (a.greeks.delta.abs() - target).abs();
            let db = (b.greeks.delta.abs() - target).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.implied_volatility)
}
