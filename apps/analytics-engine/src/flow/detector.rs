//! Flow detection over a chain snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FlowConfig, FlowDirection, UnusualActivity};
use crate::models::{ChainSnapshot, OptionContract, OptionType};

/// Flow report for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    /// Flagged contracts, descending by conviction.
    pub unusual: Vec<UnusualActivity>,
    /// Premium spent on flagged calls.
    pub bullish_premium: f64,
    /// Premium spent on flagged puts.
    pub bearish_premium: f64,
    /// (bullish - bearish) / (bullish + bearish); 0.0 when nothing flagged.
    pub imbalance: f64,
    /// Distinct strikes carrying unusual flow, ascending.
    pub unusual_strikes: Vec<Decimal>,
}

/// Detect unusual flow using open interest as the average-volume proxy.
#[must_use]
pub fn detect(chain: &ChainSnapshot, config: &FlowConfig) -> FlowReport {
    detect_with_averages(chain, config, |_| None)
}

/// Detect unusual flow with a caller-supplied average-volume lookup.
///
/// Contracts without a lookup entry fall back to open interest as a
/// liquidity proxy for the volume-ratio test.
pub fn detect_with_averages(
    chain: &ChainSnapshot,
    config: &FlowConfig,
    avg_volume: impl Fn(&OptionContract) -> Option<f64>,
) -> FlowReport {
    let mut unusual = Vec::new();

    for contract in chain.all_contracts() {
        let volume = contract.quote.volume;
        let oi = contract.quote.open_interest;

        let avg = avg_volume(contract).unwrap_or_else(|| oi.max(1) as f64);
        let volume_ratio = volume as f64 / avg.max(1.0);
        let vol_oi_ratio = volume as f64 / oi.max(1) as f64;
        let premium_spent = contract.premium_spent();

        let volume_flag = volume >= config.min_volume && volume_ratio >= config.volume_multiplier;
        let premium_flag = premium_spent >= config.min_premium;
        let oi_flag = vol_oi_ratio >= config.oi_ratio_threshold;

        if !(volume_flag || premium_flag || oi_flag) {
            continue;
        }

        let is_sweep = volume > config.sweep_volume && vol_oi_ratio > config.sweep_oi_ratio;
        let conviction = conviction_score(premium_spent, volume_ratio, is_sweep);
        let direction = match contract.option_type {
            OptionType::Call => FlowDirection::Bullish,
            OptionType::Put => FlowDirection::Bearish,
        };

        unusual.push(UnusualActivity {
            strike: contract.strike,
            expiration: contract.expiration,
            option_type: contract.option_type,
            volume,
            open_interest: oi,
            volume_ratio,
            premium_spent,
            is_sweep,
            conviction,
            direction,
        });
    }

    unusual.sort_by(|a, b| b.conviction.cmp(&a.conviction));

    let bullish_premium: f64 = premium_for(&unusual, FlowDirection::Bullish);
    let bearish_premium: f64 = premium_for(&unusual, FlowDirection::Bearish);
    let total = bullish_premium + bearish_premium;
    let imbalance = if total > 0.0 {
        (bullish_premium - bearish_premium) / total
    } else {
        0.0
    };

    let mut unusual_strikes: Vec<Decimal> = unusual.iter().map(|u| u.strike).collect();
    unusual_strikes.sort_unstable();
    unusual_strikes.dedup();

    debug!(
        symbol = %chain.underlying,
        flagged = unusual.len(),
        imbalance,
        "flow detection complete"
    );

    FlowReport {
        unusual,
        bullish_premium,
        bearish_premium,
        imbalance,
        unusual_strikes,
    }
}

fn premium_for(unusual: &[UnusualActivity], direction: FlowDirection) -> f64 {
    unusual
        .iter()
        .filter(|u| u.direction == direction)
        .map(|u| u.premium_spent)
        .sum()
}

/// Conviction score: premium tier (max 40) + volume-ratio tier (max 30) +
/// sweep bonus (30).
fn conviction_score(premium_spent: f64, volume_ratio: f64, is_sweep: bool) -> u8 {
    let premium_tier = if premium_spent >= 1_000_000.0 {
        40
    } else if premium_spent >= 500_000.0 {
        30
    } else if premium_spent >= 100_000.0 {
        20
    } else if premium_spent >= 50_000.0 {
        10
    } else {
        0
    };

    let ratio_tier = if volume_ratio >= 10.0 {
        30
    } else if volume_ratio >= 5.0 {
        20
    } else if volume_ratio >= 3.0 {
        10
    } else {
        0
    };

    let sweep_bonus = if is_sweep { 30 } else { 0 };

    premium_tier + ratio_tier + sweep_bonus
}
