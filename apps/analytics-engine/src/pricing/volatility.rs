//! Realized volatility and ATR from historical bars.

use rust_decimal::prelude::ToPrimitive;

use crate::models::OhlcBar;

/// Trading days per year used to annualize realized volatility.
const TRADING_DAYS: f64 = 252.0;

/// Average True Range over the trailing `period` bars.
///
/// True range per bar is `max(high - low, |high - prev_close|,
/// |low - prev_close|)`. Returns `None` when fewer than `period + 1` bars
/// are supplied.
#[must_use]
pub fn average_true_range(bars: &[OhlcBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let start = bars.len() - period;
    let mut sum = 0.0;
    for i in start..bars.len() {
        let high = bars[i].high.to_f64()?;
        let low = bars[i].low.to_f64()?;
        let prev_close = bars[i - 1].close.to_f64()?;
        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        sum += tr;
    }
    Some(sum / period as f64)
}

/// Annualized close-to-close realized volatility over the supplied bars.
///
/// Returns `None` with fewer than three bars (no meaningful variance).
#[must_use]
pub fn realized_volatility(bars: &[OhlcBar]) -> Option<f64> {
    if bars.len() < 3 {
        return None;
    }

    let mut returns = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let prev = pair[0].close.to_f64()?;
        let next = pair[1].close.to_f64()?;
        if prev <= 0.0 || next <= 0.0 {
            return None;
        }
        returns.push((next / prev).ln());
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() * TRADING_DAYS.sqrt())
}
