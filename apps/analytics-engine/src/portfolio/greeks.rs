//! Net Greek aggregation across open positions.

use serde::{Deserialize, Serialize};

use crate::models::{ContractGreeks, LegAction};

/// Contract multiplier.
const MULTIPLIER: f64 = 100.0;

/// Net delta beyond which the book is directional.
const DELTA_BIAS_THRESHOLD: f64 = 50.0;
/// Net vega beyond which the book is a volatility bet.
const VEGA_BIAS_THRESHOLD: f64 = 100.0;
/// Net theta beyond which carry dominates.
const THETA_BIAS_THRESHOLD: f64 = 10.0;

/// One live leg of an open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionLeg {
    /// Long or short.
    pub action: LegAction,
    /// Contracts held.
    pub contracts: u32,
    /// Current per-contract Greeks.
    pub greeks: ContractGreeks,
}

/// An open position contributing to portfolio Greeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Underlying symbol.
    pub symbol: String,
    /// Position legs.
    pub legs: Vec<PositionLeg>,
}

/// Multiplier-scaled net Greeks across all legs of all positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioGreeks {
    /// Net delta in share-equivalents.
    pub delta: f64,
    /// Net gamma.
    pub gamma: f64,
    /// Net theta in dollars per day.
    pub theta: f64,
    /// Net vega in dollars per vol point.
    pub vega: f64,
    /// Net rho.
    pub rho: f64,
}

/// Directional lean of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionalBias {
    /// Net long delta.
    Bullish,
    /// Net short delta.
    Bearish,
    /// Inside the threshold band.
    Neutral,
}

/// Volatility lean of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityBias {
    /// Net long vega.
    LongVolatility,
    /// Net short vega.
    ShortVolatility,
    /// Inside the threshold band.
    Neutral,
}

/// Carry profile of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThetaBias {
    /// Collecting time decay.
    Collecting,
    /// Paying time decay.
    Paying,
    /// Inside the threshold band.
    Neutral,
}

/// Bias classifications derived from fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreekBias {
    /// Delta-based lean.
    pub directional: DirectionalBias,
    /// Vega-based lean.
    pub volatility: VolatilityBias,
    /// Theta-based lean.
    pub theta: ThetaBias,
}

impl PortfolioGreeks {
    /// Classify the book's biases.
    #[must_use]
    pub fn bias(&self) -> GreekBias {
        let directional = if self.delta > DELTA_BIAS_THRESHOLD {
            DirectionalBias::Bullish
        } else if self.delta < -DELTA_BIAS_THRESHOLD {
            DirectionalBias::Bearish
        } else {
            DirectionalBias::Neutral
        };

        let volatility = if self.vega > VEGA_BIAS_THRESHOLD {
            VolatilityBias::LongVolatility
        } else if self.vega < -VEGA_BIAS_THRESHOLD {
            VolatilityBias::ShortVolatility
        } else {
            VolatilityBias::Neutral
        };

        let theta = if self.theta > THETA_BIAS_THRESHOLD {
            ThetaBias::Collecting
        } else if self.theta < -THETA_BIAS_THRESHOLD {
            ThetaBias::Paying
        } else {
            ThetaBias::Neutral
        };

        GreekBias {
            directional,
            volatility,
            theta,
        }
    }
}

/// Sum Greeks across every leg of every position, signed by action and
/// scaled by contracts and the 100-share multiplier.
#[must_use]
pub fn aggregate_portfolio(positions: &[OpenPosition]) -> PortfolioGreeks {
    let mut net = PortfolioGreeks::default();
    for position in positions {
        for leg in &position.legs {
            let scale = f64::from(leg.action.sign()) * f64::from(leg.contracts) * MULTIPLIER;
            net.delta += leg.greeks.delta * scale;
            net.gamma += leg.greeks.gamma * scale;
            net.theta += leg.greeks.theta * scale;
            net.vega += leg.greeks.vega * scale;
            net.rho += leg.greeks.rho * scale;
        }
    }
    net
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(action: LegAction, contracts: u32, delta: f64, theta: f64, vega: f64) -> PositionLeg {
        PositionLeg {
            action,
            contracts,
            greeks: ContractGreeks {
                delta,
                gamma: 0.02,
                theta,
                vega,
                rho: 0.01,
            },
        }
    }

    #[test]
    fn long_and_short_legs_net_out() {
        let positions = vec![OpenPosition {
            symbol: "SPY".to_string(),
            legs: vec![
                leg(LegAction::Buy, 1, 0.60, -0.08, 0.15),
                leg(LegAction::Sell, 1, 0.40, -0.06, 0.12),
            ],
        }];
        let net = aggregate_portfolio(&positions);
        // (0.60 - 0.40) * 100
        assert!((net.delta - 20.0).abs() < 1e-9);
        // (-0.08 + 0.06) * 100
        assert!((net.theta + 2.0).abs() < 1e-9);
        // (0.15 - 0.12) * 100
        assert!((net.vega - 3.0).abs() < 1e-9);
    }

    #[test]
    fn contracts_scale_the_sum() {
        let positions = vec![OpenPosition {
            symbol: "SPY".to_string(),
            legs: vec![leg(LegAction::Buy, 5, 0.50, -0.05, 0.10)],
        }];
        let net = aggregate_portfolio(&positions);
        assert!((net.delta - 250.0).abs() < 1e-9);
        assert!((net.gamma - 10.0).abs() < 1e-9);
    }

    #[test]
    fn bias_classification_thresholds() {
        let bullish = PortfolioGreeks {
            delta: 120.0,
            vega: -150.0,
            theta: 25.0,
            ..PortfolioGreeks::default()
        };
        let bias = bullish.bias();
        assert_eq!(bias.directional, DirectionalBias::Bullish);
        assert_eq!(bias.volatility, VolatilityBias::ShortVolatility);
        assert_eq!(bias.theta, ThetaBias::Collecting);

        let neutral = PortfolioGreeks::default().bias();
        assert_eq!(neutral.directional, DirectionalBias::Neutral);
        assert_eq!(neutral.volatility, VolatilityBias::Neutral);
        assert_eq!(neutral.theta, ThetaBias::Neutral);
    }

    #[test]
    fn empty_book_is_flat() {
        let net = aggregate_portfolio(&[]);
        assert!((net.delta - 0.0).abs() < f64::EPSILON);
        assert!((net.vega - 0.0).abs() < f64::EPSILON);
    }
}
