//! Dealer-exposure analytics: GEX/VEX, max pain, put/call ratios and
//! open-interest walls.

mod dealer;
mod max_pain;
mod walls;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{ChainSnapshot, OptionType};

pub use dealer::{
    DealerExposure, ExpirationExposure, GammaRegime, StrikeExposure, dealer_exposure,
};
pub use max_pain::max_pain;
pub use walls::{OiWall, OpenInterestWalls, detect_walls};

/// Exposure analysis errors.
#[derive(Debug, Error)]
pub enum ExposureError {
    /// No contracts in the snapshot.
    #[error("chain snapshot for {symbol} holds no contracts")]
    EmptyChain {
        /// The underlying symbol.
        symbol: String,
    },

    /// Underlying price missing or non-positive.
    #[error("invalid underlying price for {symbol}: {price}")]
    InvalidUnderlyingPrice {
        /// The underlying symbol.
        symbol: String,
        /// The offending price.
        price: Decimal,
    },
}

/// Exposure analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Number of open-interest walls reported per side.
    pub wall_count: usize,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self { wall_count: 5 }
    }
}

/// Put/call ratios. A zero denominator reports a 0.0 sentinel rather than
/// propagating a NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PutCallRatio {
    /// Put volume / call volume.
    pub by_volume: f64,
    /// Put open interest / call open interest.
    pub by_open_interest: f64,
}

/// Full exposure report for one chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    /// Underlying symbol.
    pub underlying: String,
    /// Dealer GEX/VEX matrix.
    pub dealer: DealerExposure,
    /// Max-pain strike.
    pub max_pain: Option<Decimal>,
    /// Open-interest walls.
    pub walls: OpenInterestWalls,
    /// Put/call ratios.
    pub put_call_ratio: PutCallRatio,
}

/// Run the full exposure analysis over one snapshot.
///
/// # Errors
///
/// Fails when the snapshot has no contracts or a non-positive underlying
/// price; both are fatal for the whole request per the engine's error
/// taxonomy.
pub fn analyze(chain: &ChainSnapshot, config: &ExposureConfig) -> Result<ExposureReport, ExposureError> {
    if chain.underlying_price <= Decimal::ZERO {
        return Err(ExposureError::InvalidUnderlyingPrice {
            symbol: chain.underlying.clone(),
            price: chain.underlying_price,
        });
    }
    if chain.is_empty() {
        return Err(ExposureError::EmptyChain {
            symbol: chain.underlying.clone(),
        });
    }

    let dealer = dealer_exposure(chain);
    debug!(
        symbol = %chain.underlying,
        total_gex = dealer.total_gex,
        regime = %dealer.regime,
        "dealer exposure computed"
    );

    Ok(ExposureReport {
        underlying: chain.underlying.clone(),
        max_pain: max_pain(chain),
        walls: detect_walls(chain, config.wall_count),
        put_call_ratio: put_call_ratio(chain),
        dealer,
    })
}

/// Compute put/call ratios by volume and open interest.
#[must_use]
pub fn put_call_ratio(chain: &ChainSnapshot) -> PutCallRatio {
    let mut call_volume = 0i64;
    let mut put_volume = 0i64;
    let mut call_oi = 0i64;
    let mut put_oi = 0i64;

    for contract in chain.all_contracts() {
        match contract.option_type {
            OptionType::Call => {
                call_volume += contract.quote.volume;
                call_oi += contract.quote.open_interest;
            }
            OptionType::Put => {
                put_volume += contract.quote.volume;
                put_oi += contract.quote.open_interest;
            }
        }
    }

    PutCallRatio {
        by_volume: ratio(put_volume, call_volume),
        by_open_interest: ratio(put_oi, call_oi),
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractGreeks, ExpirationSlice, OptionContract, Quote};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn contract(option_type: OptionType, volume: i64, open_interest: i64) -> OptionContract {
        OptionContract {
            underlying: "SPY".to_string(),
            strike: dec!(500),
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            option_type,
            quote: Quote {
                bid: dec!(1.00),
                ask: dec!(1.10),
                last: dec!(1.05),
                volume,
                open_interest,
            },
            greeks: ContractGreeks {
                delta: 0.4,
                gamma: 0.01,
                theta: -0.04,
                vega: 0.10,
                rho: 0.02,
            },
            implied_volatility: 0.20,
        }
    }

    fn chain_with(calls: Vec<OptionContract>, puts: Vec<OptionContract>) -> ChainSnapshot {
        let expiration = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        ChainSnapshot {
            underlying: "SPY".to_string(),
            underlying_price: dec!(500),
            expirations: [(expiration, ExpirationSlice { calls, puts })]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn empty_chain_is_fatal() {
        let chain = ChainSnapshot {
            underlying: "SPY".to_string(),
            underlying_price: dec!(500),
            expirations: BTreeMap::new(),
        };
        let result = analyze(&chain, &ExposureConfig::default());
        assert!(matches!(result, Err(ExposureError::EmptyChain { .. })));
    }

    #[test]
    fn non_positive_price_is_fatal() {
        let mut chain = chain_with(vec![contract(OptionType::Call, 10, 10)], vec![]);
        chain.underlying_price = Decimal::ZERO;
        let result = analyze(&chain, &ExposureConfig::default());
        assert!(matches!(
            result,
            Err(ExposureError::InvalidUnderlyingPrice { .. })
        ));
    }

    #[test]
    fn put_call_ratios_computed() {
        let chain = chain_with(
            vec![contract(OptionType::Call, 1_000, 4_000)],
            vec![contract(OptionType::Put, 2_000, 2_000)],
        );
        let ratio = put_call_ratio(&chain);
        assert!((ratio.by_volume - 2.0).abs() < f64::EPSILON);
        assert!((ratio.by_open_interest - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_call_side_reports_sentinel() {
        let chain = chain_with(vec![], vec![contract(OptionType::Put, 2_000, 2_000)]);
        let ratio = put_call_ratio(&chain);
        assert!((ratio.by_volume - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn analyze_assembles_full_report() {
        let chain = chain_with(
            vec![contract(OptionType::Call, 1_000, 4_000)],
            vec![contract(OptionType::Put, 2_000, 2_000)],
        );
        let report = analyze(&chain, &ExposureConfig::default()).unwrap();
        assert_eq!(report.underlying, "SPY");
        assert_eq!(report.max_pain, Some(dec!(500)));
        assert_eq!(report.dealer.by_strike.len(), 1);
    }
}
