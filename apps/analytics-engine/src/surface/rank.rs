//! IV rank and percentile against a historical window.

use serde::{Deserialize, Serialize};

/// Where current IV sits within its history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvRank {
    /// (current - min) / (max - min), scaled to 0-100.
    pub rank: f64,
    /// Share of history readings below current, scaled to 0-100.
    pub percentile: f64,
}

/// Compute IV rank and percentile of `current` against `history`.
///
/// Returns `None` for an empty history. A degenerate history (max == min)
/// reports rank 0.
#[must_use]
pub fn iv_rank(current: f64, history: &[f64]) -> Option<IvRank> {
    if history.is_empty() {
        return None;
    }

    let min = history.iter().copied().fold(f64::INFINITY, f64::min);
    let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let rank = if max > min {
        ((current - min) / (max - min) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let below = history.iter().filter(|&&iv| iv < current).count();
    let percentile = below as f64 / history.len() as f64 * 100.0;

    Some(IvRank { rank, percentile })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_interpolates_between_extremes() {
        let history = [0.10, 0.20, 0.30, 0.40];
        let r = iv_rank(0.25, &history).unwrap();
        assert!((r.rank - 50.0).abs() < 1e-9);
        assert!((r.percentile - 50.0).abs() < 1e-9);
    }

    #[test]
    fn current_above_history_clamps_to_hundred() {
        let history = [0.10, 0.20];
        let r = iv_rank(0.50, &history).unwrap();
        assert!((r.rank - 100.0).abs() < 1e-9);
        assert!((r.percentile - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_history_ranks_zero() {
        let history = [0.20, 0.20, 0.20];
        let r = iv_rank(0.20, &history).unwrap();
        assert!((r.rank - 0.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_yields_none() {
        assert!(iv_rank(0.20, &[]).is_none());
    }
}
