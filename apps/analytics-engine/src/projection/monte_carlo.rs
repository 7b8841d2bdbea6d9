//! Monte-Carlo P&L simulation.
//!
//! Each simulation accumulates a daily random price-return and IV-change
//! walk over the horizon, then evaluates the Greek-based scenario
//! approximation at the accumulated totals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::portfolio::{PortfolioGreeks, Scenario, scenario_pnl};

/// P&L within this band counts as breakeven.
const BREAKEVEN_BAND: f64 = 0.01;

/// Monte-Carlo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of independent simulations.
    pub simulations: u32,
    /// Horizon in trading days.
    pub horizon_days: u32,
    /// Mean daily return.
    pub daily_drift: f64,
    /// Standard deviation of daily returns.
    pub daily_volatility: f64,
    /// Standard deviation of daily IV changes, in vol points.
    pub daily_iv_volatility: f64,
    /// Seed for reproducibility (None = random).
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            horizon_days: 5,
            daily_drift: 0.0,
            daily_volatility: 0.01,
            daily_iv_volatility: 0.5,
            seed: None,
        }
    }
}

/// Monte-Carlo outcome distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Simulations run.
    pub simulations: u32,
    /// Mean P&L.
    pub mean: f64,
    /// Median P&L.
    pub median: f64,
    /// 5th-percentile P&L (95% VaR).
    pub var95: f64,
    /// 1st-percentile P&L (99% VaR).
    pub var99: f64,
    /// Expected P&L conditional on falling below the 95% VaR.
    pub cvar95: f64,
    /// Simulations ending profitable.
    pub profitable: u32,
    /// Simulations ending within the breakeven band.
    pub breakeven: u32,
    /// Simulations ending at a loss.
    pub losing: u32,
}

/// Run the Monte-Carlo simulation for one book of net Greeks.
#[must_use]
pub fn simulate(
    greeks: &PortfolioGreeks,
    underlying_price: f64,
    config: &MonteCarloConfig,
) -> MonteCarloResult {
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    info!(
        simulations = config.simulations,
        horizon_days = config.horizon_days,
        seed,
        "running Monte-Carlo simulation"
    );

    let simulations = config.simulations.max(1);
    let mut outcomes = Vec::with_capacity(simulations as usize);

    for i in 1..=simulations {
        let mut total_return = 0.0;
        let mut total_iv_change = 0.0;
        for _ in 0..config.horizon_days {
            total_return += config.daily_drift + config.daily_volatility * normal(&mut rng);
            total_iv_change += config.daily_iv_volatility * normal(&mut rng);
        }

        let scenario = Scenario {
            price_move_pct: total_return,
            iv_change_pts: total_iv_change,
            days_forward: f64::from(config.horizon_days),
        };
        outcomes.push(scenario_pnl(greeks, underlying_price, &scenario).total);

        if i % 5_000 == 0 {
            debug!(simulation = i, "Monte-Carlo progress");
        }
    }

    outcomes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    summarize(&outcomes, simulations)
}

fn summarize(sorted: &[f64], simulations: u32) -> MonteCarloResult {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = percentile(sorted, 0.50);
    let var95 = percentile(sorted, 0.05);
    let var99 = percentile(sorted, 0.01);

    let tail: Vec<f64> = sorted.iter().copied().filter(|&x| x <= var95).collect();
    let cvar95 = if tail.is_empty() {
        var95
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    };

    let mut profitable = 0u32;
    let mut breakeven = 0u32;
    let mut losing = 0u32;
    for &outcome in sorted {
        if outcome > BREAKEVEN_BAND {
            profitable += 1;
        } else if outcome < -BREAKEVEN_BAND {
            losing += 1;
        } else {
            breakeven += 1;
        }
    }

    MonteCarloResult {
        simulations,
        mean,
        median,
        var95,
        var99,
        cvar95,
        profitable,
        breakeven,
        losing,
    }
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * q).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Standard normal draw via Box-Muller.
fn normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>(); // (0, 1]
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
