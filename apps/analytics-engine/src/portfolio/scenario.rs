//! Greek-based scenario P&L approximation.

use serde::{Deserialize, Serialize};

use super::greeks::PortfolioGreeks;

/// A deterministic market scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Underlying move as a signed fraction (e.g. -0.05 = down 5%).
    pub price_move_pct: f64,
    /// IV change in vol points (e.g. +10.0).
    pub iv_change_pts: f64,
    /// Days of time decay applied.
    pub days_forward: f64,
}

/// P&L breakdown of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario inputs.
    pub scenario: Scenario,
    /// First-order price P&L.
    pub delta_pnl: f64,
    /// Second-order price P&L.
    pub gamma_pnl: f64,
    /// Time-decay P&L.
    pub theta_pnl: f64,
    /// Volatility P&L.
    pub vega_pnl: f64,
    /// Sum of the components.
    pub total: f64,
}

/// Evaluate the linear/quadratic Greek approximation at a scenario.
///
/// Non-finite intermediate values are reported as a 0.0 sentinel rather
/// than propagating.
#[must_use]
pub fn scenario_pnl(
    greeks: &PortfolioGreeks,
    underlying_price: f64,
    scenario: &Scenario,
) -> ScenarioResult {
    let price_move = scenario.price_move_pct * underlying_price;

    let delta_pnl = sanitize(greeks.delta * price_move);
    let gamma_pnl = sanitize(0.5 * greeks.gamma * price_move * price_move);
    let theta_pnl = sanitize(greeks.theta * scenario.days_forward);
    let vega_pnl = sanitize(greeks.vega * (scenario.iv_change_pts / 100.0));

    ScenarioResult {
        scenario: *scenario,
        delta_pnl,
        gamma_pnl,
        theta_pnl,
        vega_pnl,
        total: delta_pnl + gamma_pnl + theta_pnl + vega_pnl,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
