//! Kelly-criterion bet sizing.

use serde::{Deserialize, Serialize};

/// Fixed quarter-Kelly multiplier used by policy.
pub const QUARTER_KELLY: f64 = 0.25;

/// Kelly sizing policy: the raw fraction is scaled down and clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyPolicy {
    /// Multiplier applied to the raw Kelly fraction.
    pub multiplier: f64,
}

impl Default for KellyPolicy {
    fn default() -> Self {
        Self {
            multiplier: QUARTER_KELLY,
        }
    }
}

impl KellyPolicy {
    /// Scaled Kelly fraction, always in [0, 1].
    #[must_use]
    pub fn fraction(&self, win_prob: f64, win_loss_ratio: f64) -> f64 {
        (raw_kelly(win_prob, win_loss_ratio) * self.multiplier).clamp(0.0, 1.0)
    }
}

/// Raw Kelly fraction `(b*p - q) / b`, clamped to [0, 1].
///
/// Degenerate inputs (`win_prob <= 0`, `win_prob >= 1`, or a non-positive
/// ratio) return 0 rather than extrapolating.
#[must_use]
pub fn raw_kelly(win_prob: f64, win_loss_ratio: f64) -> f64 {
    if !(win_prob > 0.0 && win_prob < 1.0)
        || !win_loss_ratio.is_finite()
        || win_loss_ratio <= 0.0
    {
        return 0.0;
    }
    let b = win_loss_ratio;
    let p = win_prob;
    let q = 1.0 - p;
    ((b * p - q) / b).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn positive_edge_gives_positive_fraction() {
        // p=0.6, b=2: raw = (2*0.6 - 0.4) / 2 = 0.4
        let raw = raw_kelly(0.6, 2.0);
        assert!((raw - 0.4).abs() < 1e-12);
        let quarter = KellyPolicy::default().fraction(0.6, 2.0);
        assert!((quarter - 0.1).abs() < 1e-12);
    }

    #[test]
    fn negative_edge_clamps_to_zero() {
        // p=0.3, b=1: raw formula gives (0.3 - 0.7) / 1 < 0
        assert!((raw_kelly(0.3, 1.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test_case(0.0, 2.0; "zero probability")]
    #[test_case(-0.5, 2.0; "negative probability")]
    #[test_case(1.0, 2.0; "certain win")]
    #[test_case(1.5, 2.0; "impossible probability")]
    #[test_case(0.6, 0.0; "zero ratio")]
    #[test_case(0.6, -1.0; "negative ratio")]
    fn degenerate_inputs_return_zero(p: f64, b: f64) {
        assert!((raw_kelly(p, b) - 0.0).abs() < f64::EPSILON);
        assert!((KellyPolicy::default().fraction(p, b) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_inputs_return_zero() {
        assert!((raw_kelly(f64::NAN, 2.0) - 0.0).abs() < f64::EPSILON);
        assert!((raw_kelly(0.6, f64::NAN) - 0.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn fraction_always_in_unit_interval(
            p in -1.0f64..2.0,
            b in -5.0f64..50.0,
        ) {
            let f = KellyPolicy::default().fraction(p, b);
            prop_assert!((0.0..=1.0).contains(&f));
            let raw = raw_kelly(p, b);
            prop_assert!((0.0..=1.0).contains(&raw));
        }
    }
}
