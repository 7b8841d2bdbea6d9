//! Term-structure shape from ATM IV across expirations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ChainSnapshot;

/// DTE cutoff for the short bucket.
const SHORT_MAX_DTE: i64 = 30;
/// DTE cutoff for the medium bucket.
const MEDIUM_MAX_DTE: i64 = 90;
/// Slope beyond which the structure is no longer flat.
const SLOPE_THRESHOLD: f64 = 0.05;

/// Shape of the IV term structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermShape {
    /// Longer-dated IV above shorter-dated (slope > +5%).
    Contango,
    /// Shorter-dated IV above longer-dated (slope < -5%).
    Backwardation,
    /// Within the flat band, or not enough buckets to tell.
    Flat,
}

/// Term-structure analysis across the snapshot's expirations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
    /// Average ATM IV of expirations with DTE <= 30.
    pub short_iv: Option<f64>,
    /// Average ATM IV of expirations with 31 <= DTE <= 90.
    pub medium_iv: Option<f64>,
    /// Average ATM IV of expirations with DTE > 90.
    pub long_iv: Option<f64>,
    /// (long - short) / short, when both buckets populated.
    pub slope: Option<f64>,
    /// Classified shape.
    pub shape: TermShape,
}

/// Bucket ATM IV by days-to-expiration and classify the slope.
#[must_use]
pub fn analyze_term(chain: &ChainSnapshot, today: NaiveDate) -> TermStructure {
    let mut short = Vec::new();
    let mut medium = Vec::new();
    let mut long = Vec::new();

    for (&expiration, slice) in &chain.expirations {
        let Some(atm_iv) = atm_iv(slice, chain.underlying_price) else {
            continue;
        };
        let dte = (expiration - today).num_days();
        if dte < 0 {
            continue;
        }
        if dte <= SHORT_MAX_DTE {
            short.push(atm_iv);
        } else if dte <= MEDIUM_MAX_DTE {
            medium.push(atm_iv);
        } else {
            long.push(atm_iv);
        }
    }

    let short_iv = average(&short);
    let medium_iv = average(&medium);
    let long_iv = average(&long);

    let slope = match (short_iv, long_iv) {
        (Some(s), Some(l)) if s > 0.0 => Some((l - s) / s),
        _ => None,
    };

    let shape = match slope {
        Some(slope) if slope > SLOPE_THRESHOLD => TermShape::Contango,
        Some(slope) if slope < -SLOPE_THRESHOLD => TermShape::Backwardation,
        _ => TermShape::Flat,
    };

    TermStructure {
        short_iv,
        medium_iv,
        long_iv,
        slope,
        shape,
    }
}

fn atm_iv(slice: &crate::models::ExpirationSlice, spot: Decimal) -> Option<f64> {
    let atm = slice
        .all()
        .filter(|c| c.implied_volatility > 0.0)
        .min_by_key(|c| (c.strike - spot).abs())?;
    let matching: Vec<f64> = slice
        .all()
        .filter(|c| c.strike == atm.strike && c.implied_volatility > 0.0)
        .map(|c| c.implied_volatility)
        .collect();
    average(&matching)
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
