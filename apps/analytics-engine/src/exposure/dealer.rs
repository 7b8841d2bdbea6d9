//! Dealer gamma/vega exposure (GEX/VEX).
//!
//! Assumes dealers are net short the options sold to customers. Short calls
//! leave dealers short gamma (negative GEX); short puts leave them
//! effectively long gamma (positive GEX). Dealers short either type are
//! short vega.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{ChainSnapshot, OptionType};

/// Contract multiplier.
const MULTIPLIER: f64 = 100.0;

/// GEX is quoted per 1% move in the underlying.
const PCT_MOVE: f64 = 0.01;

/// Gamma regime implied by total dealer exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GammaRegime {
    /// Dealer hedging dampens moves.
    Positive,
    /// Dealer hedging amplifies moves.
    Negative,
}

impl std::fmt::Display for GammaRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive Gamma"),
            Self::Negative => write!(f, "Negative Gamma"),
        }
    }
}

/// Aggregated exposure at one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeExposure {
    /// Strike price.
    pub strike: Decimal,
    /// Dealer gamma exposure in dollars per 1% move.
    pub gex: f64,
    /// Dealer vega exposure in dollars per vol point.
    pub vex: f64,
    /// Call open interest at this strike.
    pub call_oi: i64,
    /// Put open interest at this strike.
    pub put_oi: i64,
}

/// Aggregated exposure at one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationExposure {
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Dealer gamma exposure in dollars per 1% move.
    pub gex: f64,
    /// Dealer vega exposure in dollars per vol point.
    pub vex: f64,
}

/// Dealer exposure matrix for one chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerExposure {
    /// Total dealer gamma exposure.
    pub total_gex: f64,
    /// Total dealer vega exposure.
    pub total_vex: f64,
    /// Regime implied by the sign of total GEX.
    pub regime: GammaRegime,
    /// Per-strike aggregation, ascending by strike.
    pub by_strike: Vec<StrikeExposure>,
    /// Per-expiration aggregation, ascending by date.
    pub by_expiration: Vec<ExpirationExposure>,
}

/// Compute the dealer exposure matrix.
#[must_use]
pub fn dealer_exposure(chain: &ChainSnapshot) -> DealerExposure {
    let spot = chain.underlying_price.to_f64().unwrap_or(0.0);

    let mut by_strike: BTreeMap<Decimal, StrikeExposure> = BTreeMap::new();
    let mut by_expiration: BTreeMap<NaiveDate, ExpirationExposure> = BTreeMap::new();
    let mut total_gex = 0.0;
    let mut total_vex = 0.0;

    for contract in chain.all_contracts() {
        let oi = contract.quote.open_interest as f64;
        let gamma_notional = contract.greeks.gamma * oi * MULTIPLIER * spot * spot * PCT_MOVE;
        let gex = match contract.option_type {
            OptionType::Call => -gamma_notional,
            OptionType::Put => gamma_notional,
        };
        let vex = -contract.greeks.vega * oi * MULTIPLIER;

        total_gex += gex;
        total_vex += vex;

        let strike_entry = by_strike
            .entry(contract.strike)
            .or_insert_with(|| StrikeExposure {
                strike: contract.strike,
                gex: 0.0,
                vex: 0.0,
                call_oi: 0,
                put_oi: 0,
            });
        strike_entry.gex += gex;
        strike_entry.vex += vex;
        match contract.option_type {
            OptionType::Call => strike_entry.call_oi += contract.quote.open_interest,
            OptionType::Put => strike_entry.put_oi += contract.quote.open_interest,
        }

        let exp_entry = by_expiration
            .entry(contract.expiration)
            .or_insert_with(|| ExpirationExposure {
                expiration: contract.expiration,
                gex: 0.0,
                vex: 0.0,
            });
        exp_entry.gex += gex;
        exp_entry.vex += vex;
    }

    let regime = if total_gex > 0.0 {
        GammaRegime::Positive
    } else {
        GammaRegime::Negative
    };

    DealerExposure {
        total_gex,
        total_vex,
        regime,
        by_strike: by_strike.into_values().collect(),
        by_expiration: by_expiration.into_values().collect(),
    }
}
