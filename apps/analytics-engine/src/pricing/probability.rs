//! Probability-of-touch policy.

use serde::{Deserialize, Serialize};

use super::black_scholes::probability_itm;
use crate::models::OptionType;

/// Probability that the underlying touches a strike before expiration.
///
/// Approximated as `min(multiplier * P(ITM), 1.0)` from the Black-Scholes
/// d2 term. The doubling is a coarse reflection-principle heuristic; it is
/// a named policy so callers can substitute their own multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchProbability {
    /// Multiplier applied to the ITM probability (default 2.0).
    pub multiplier: f64,
}

impl Default for TouchProbability {
    fn default() -> Self {
        Self { multiplier: 2.0 }
    }
}

impl TouchProbability {
    /// Probability of touching `strike` before `t` years elapse.
    ///
    /// The relevant side is inferred from the strike's position relative to
    /// spot: strikes above spot use call ITM probability, strikes below use
    /// put ITM probability. Always clipped to [0, 1].
    #[must_use]
    pub fn probability(&self, spot: f64, strike: f64, t: f64, r: f64, sigma: f64) -> f64 {
        let kind = if strike >= spot {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let itm = probability_itm(spot, strike, t, r, sigma, kind);
        (self.multiplier * itm).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn touch_probability_is_clipped_at_one() {
        let policy = TouchProbability::default();
        // Strike essentially at spot: ITM prob near 0.5, doubled would be ~1.
        let p = policy.probability(100.0, 100.01, 0.5, 0.0, 0.30);
        assert!(p <= 1.0);
        assert!(p > 0.9);
    }

    #[test]
    fn far_strike_has_low_touch_probability() {
        let policy = TouchProbability::default();
        let p = policy.probability(100.0, 150.0, 0.05, 0.0, 0.20);
        assert!(p < 0.05);
    }

    #[test]
    fn strike_below_spot_uses_put_side() {
        let policy = TouchProbability::default();
        let below = policy.probability(100.0, 80.0, 0.1, 0.0, 0.25);
        let above = policy.probability(100.0, 120.0, 0.1, 0.0, 0.25);
        assert!(below > 0.0 && above > 0.0);
        assert!(below < 1.0 && above < 1.0);
    }

    #[test]
    fn custom_multiplier_is_honored() {
        let policy = TouchProbability { multiplier: 1.0 };
        let doubled = TouchProbability::default();
        let p1 = policy.probability(100.0, 110.0, 0.25, 0.0, 0.25);
        let p2 = doubled.probability(100.0, 110.0, 0.25, 0.0, 0.25);
        assert!((p2 - (2.0 * p1)).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn probability_always_in_unit_interval(
            spot in 1.0f64..1000.0,
            strike in 1.0f64..1000.0,
            t in 0.0f64..3.0,
            sigma in 0.0f64..3.0,
        ) {
            let policy = TouchProbability::default();
            let p = policy.probability(spot, strike, t, 0.04, sigma);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
