//! Open-interest wall detection.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ChainSnapshot, OptionType};

/// A strike carrying concentrated open interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OiWall {
    /// Strike price.
    pub strike: Decimal,
    /// Aggregated open interest across expirations.
    pub open_interest: i64,
}

/// Open-interest walls for one chain snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterestWalls {
    /// Top strikes by call open interest, descending.
    pub top_calls: Vec<OiWall>,
    /// Top strikes by put open interest, descending.
    pub top_puts: Vec<OiWall>,
    /// Nearest call wall above spot.
    pub resistance: Option<OiWall>,
    /// Nearest put wall below spot.
    pub support: Option<OiWall>,
}

/// Detect the top-N open-interest walls per side and the nearest
/// resistance/support walls around spot.
#[must_use]
pub fn detect_walls(chain: &ChainSnapshot, top_n: usize) -> OpenInterestWalls {
    let mut call_oi: BTreeMap<Decimal, i64> = BTreeMap::new();
    let mut put_oi: BTreeMap<Decimal, i64> = BTreeMap::new();

    for contract in chain.all_contracts() {
        let side = match contract.option_type {
            OptionType::Call => &mut call_oi,
            OptionType::Put => &mut put_oi,
        };
        *side.entry(contract.strike).or_insert(0) += contract.quote.open_interest;
    }

    let top_calls = top_walls(&call_oi, top_n);
    let top_puts = top_walls(&put_oi, top_n);

    let spot = chain.underlying_price;
    let resistance = top_calls
        .iter()
        .filter(|w| w.strike > spot)
        .min_by_key(|w| w.strike)
        .cloned();
    let support = top_puts
        .iter()
        .filter(|w| w.strike < spot)
        .max_by_key(|w| w.strike)
        .cloned();

    OpenInterestWalls {
        top_calls,
        top_puts,
        resistance,
        support,
    }
}

fn top_walls(oi_by_strike: &BTreeMap<Decimal, i64>, top_n: usize) -> Vec<OiWall> {
    let mut walls: Vec<OiWall> = oi_by_strike
        .iter()
        .map(|(&strike, &open_interest)| OiWall {
            strike,
            open_interest,
        })
        .collect();
    walls.sort_by(|a, b| b.open_interest.cmp(&a.open_interest));
    walls.truncate(top_n);
    walls
}
