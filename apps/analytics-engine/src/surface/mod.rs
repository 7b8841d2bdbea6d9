//! Volatility-surface analytics: smile/skew, term structure and IV rank.

mod rank;
mod smile;
mod term;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ChainSnapshot;

pub use rank::{IvRank, iv_rank};
pub use smile::{SmilePattern, SmileReport, analyze_smile, skew_at_delta};
pub use term::{TermShape, TermStructure, analyze_term};

/// Surface analysis errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No contracts in the snapshot.
    #[error("chain snapshot for {symbol} holds no contracts")]
    EmptyChain {
        /// The underlying symbol.
        symbol: String,
    },
}

/// Combined surface report for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceReport {
    /// Underlying symbol.
    pub underlying: String,
    /// Smile analysis at the nearest expiration, when available.
    pub smile: Option<SmileReport>,
    /// Term structure across expirations.
    pub term: TermStructure,
    /// IV rank of the nearest-expiration ATM IV, when history is supplied.
    pub iv_rank: Option<IvRank>,
}

/// Run the full surface analysis over one snapshot.
///
/// `iv_history` is an optional caller-supplied window of historical ATM IV
/// readings used for rank/percentile.
///
/// # Errors
///
/// Fails when the snapshot holds no contracts.
pub fn analyze(
    chain: &ChainSnapshot,
    today: NaiveDate,
    iv_history: Option<&[f64]>,
) -> Result<SurfaceReport, SurfaceError> {
    if chain.is_empty() {
        return Err(SurfaceError::EmptyChain {
            symbol: chain.underlying.clone(),
        });
    }

    let smile = chain
        .nearest_expirations(1)
        .first()
        .and_then(|&exp| chain.slice(exp))
        .and_then(|slice| analyze_smile(slice, chain.underlying_price));

    let iv_rank = match (&smile, iv_history) {
        (Some(report), Some(history)) => iv_rank(report.atm_iv, history),
        _ => None,
    };

    Ok(SurfaceReport {
        underlying: chain.underlying.clone(),
        smile,
        term: analyze_term(chain, today),
        iv_rank,
    })
}
