//! Closed-form European option math.
//!
//! The engine deliberately stays with Black-Scholes approximations:
//! probabilities and Greek-based P&L estimates, not exercise-style pricing.

// Black-Scholes uses standard mathematical notation (s, k, t, r, sigma)
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use std::f64::consts::PI;

use crate::models::OptionType;

/// Standard normal CDF (cumulative distribution function).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

/// Standard normal PDF (probability density function).
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter.
#[must_use]
pub fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Black-Scholes d2 parameter.
#[must_use]
pub fn d2(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    d1(s, k, t, r, sigma) - sigma * t.sqrt()
}

/// Black-Scholes European call price.
#[must_use]
pub fn call_price(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    let d1_val = d1(s, k, t, r, sigma);
    let d2_val = d2(s, k, t, r, sigma);
    s * norm_cdf(d1_val) - k * (-r * t).exp() * norm_cdf(d2_val)
}

/// Black-Scholes European put price.
#[must_use]
pub fn put_price(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    let d1_val = d1(s, k, t, r, sigma);
    let d2_val = d2(s, k, t, r, sigma);
    k * (-r * t).exp() * norm_cdf(-d2_val) - s * norm_cdf(-d1_val)
}

/// Risk-neutral probability of finishing in the money, from the d2 term.
///
/// Degenerate inputs (non-positive spot, strike, time, or volatility)
/// collapse to the intrinsic answer: 1.0 when already in the money,
/// else 0.0.
#[must_use]
pub fn probability_itm(s: f64, k: f64, t: f64, r: f64, sigma: f64, kind: OptionType) -> f64 {
    if s <= 0.0 || k <= 0.0 || t <= 0.0 || sigma <= 0.0 {
        let itm = match kind {
            OptionType::Call => s > k,
            OptionType::Put => s < k,
        };
        return if itm { 1.0 } else { 0.0 };
    }

    let d2_val = d2(s, k, t, r, sigma);
    match kind {
        OptionType::Call => norm_cdf(d2_val),
        OptionType::Put => norm_cdf(-d2_val),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_norm_cdf() {
        assert!(approx_eq(norm_cdf(0.0), 0.5, 1e-6));
        assert!(approx_eq(norm_cdf(1.96), 0.975, 0.001));
        assert!(approx_eq(norm_cdf(-1.96), 0.025, 0.001));
    }

    #[test]
    fn test_norm_pdf_peak() {
        assert!(approx_eq(norm_pdf(0.0), 0.3989, 0.001));
    }

    #[test]
    fn test_call_price_atm() {
        // ATM call: S=100, K=100, T=1, r=0.05, sigma=0.20
        let price = call_price(100.0, 100.0, 1.0, 0.05, 0.20);
        // Expected ~ 10.45 (from Black-Scholes tables)
        assert!(approx_eq(price, 10.45, 0.1));
    }

    #[test]
    fn test_put_price_atm() {
        let price = put_price(100.0, 100.0, 1.0, 0.05, 0.20);
        // Expected ~ 5.57 (from put-call parity)
        assert!(approx_eq(price, 5.57, 0.1));
    }

    #[test]
    fn test_put_call_parity() {
        let (s, k, t, r, sigma) = (105.0, 100.0, 0.5, 0.03, 0.25);
        let call = call_price(s, k, t, r, sigma);
        let put = put_price(s, k, t, r, sigma);
        // C - P = S - K * e^(-rT)
        assert!(approx_eq(call - put, s - k * (-r * t).exp(), 1e-9));
    }

    #[test]
    fn test_probability_itm_atm_near_half() {
        let p = probability_itm(100.0, 100.0, 0.25, 0.0, 0.20, OptionType::Call);
        assert!(p > 0.4 && p < 0.55);
    }

    #[test]
    fn test_probability_itm_complements() {
        let (s, k, t, r, sigma) = (575.0, 580.0, 0.1, 0.04, 0.18);
        let call = probability_itm(s, k, t, r, sigma, OptionType::Call);
        let put = probability_itm(s, k, t, r, sigma, OptionType::Put);
        assert!(approx_eq(call + put, 1.0, 1e-9));
    }

    #[test]
    fn test_probability_itm_degenerate_inputs() {
        // Zero volatility: intrinsic answer
        assert!(approx_eq(
            probability_itm(110.0, 100.0, 0.5, 0.0, 0.0, OptionType::Call),
            1.0,
            f64::EPSILON
        ));
        assert!(approx_eq(
            probability_itm(90.0, 100.0, 0.5, 0.0, 0.0, OptionType::Call),
            0.0,
            f64::EPSILON
        ));
        // Expired
        assert!(approx_eq(
            probability_itm(90.0, 100.0, 0.0, 0.0, 0.2, OptionType::Put),
            1.0,
            f64::EPSILON
        ));
    }
}
