//! Deterministic price-grid P&L projection.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{OptionType, Strategy};

/// Contract multiplier.
const MULTIPLIER: f64 = 100.0;

/// Grid projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of evenly spaced evaluation prices.
    pub steps: usize,
    /// Range around the current price, as a fraction (0.10 = +/-10%).
    pub range_pct: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            steps: 21,
            range_pct: 0.10,
        }
    }
}

/// P&L at one grid price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Underlying price evaluated.
    pub price: f64,
    /// Strategy P&L at expiration, in dollars.
    pub pnl: f64,
}

/// Full grid projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridProjection {
    /// Evaluated points, ascending by price.
    pub points: Vec<GridPoint>,
    /// Best P&L in the range.
    pub max_gain: f64,
    /// Worst P&L in the range.
    pub max_loss: f64,
}

/// Evaluate intrinsic-value P&L across evenly spaced prices around spot.
///
/// Each leg contributes `(intrinsic - entry) * 100 * sign * contracts`.
#[must_use]
pub fn project_grid(
    strategy: &Strategy,
    contracts: u32,
    underlying_price: f64,
    config: &GridConfig,
) -> GridProjection {
    let steps = config.steps.max(2);
    let low = underlying_price * (1.0 - config.range_pct);
    let high = underlying_price * (1.0 + config.range_pct);
    let step = (high - low) / (steps - 1) as f64;

    let points: Vec<GridPoint> = (0..steps)
        .map(|i| {
            let price = low + step * i as f64;
            GridPoint {
                price,
                pnl: pnl_at(strategy, contracts, price),
            }
        })
        .collect();

    let max_gain = points.iter().map(|p| p.pnl).fold(f64::NEG_INFINITY, f64::max);
    let max_loss = points.iter().map(|p| p.pnl).fold(f64::INFINITY, f64::min);

    GridProjection {
        points,
        max_gain,
        max_loss,
    }
}

/// Strategy P&L at one underlying price, using intrinsic leg values.
#[must_use]
pub fn pnl_at(strategy: &Strategy, contracts: u32, price: f64) -> f64 {
    strategy
        .legs
        .iter()
        .map(|leg| {
            let strike = leg.strike.to_f64().unwrap_or(0.0);
            let intrinsic = match leg.option_type {
                OptionType::Call => (price - strike).max(0.0),
                OptionType::Put => (strike - price).max(0.0),
            };
            let entry = leg.price.to_f64().unwrap_or(0.0);
            (intrinsic - entry) * MULTIPLIER * f64::from(leg.action.sign()) * f64::from(contracts)
        })
        .sum()
}
