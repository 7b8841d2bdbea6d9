//! Option contract snapshot types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Market quote for a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
    /// Last trade price.
    pub last: Decimal,
    /// Session volume (contracts).
    pub volume: i64,
    /// Open interest (contracts).
    pub open_interest: i64,
}

impl Quote {
    /// Get the mid price.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }

    /// Get the bid/ask spread.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// Greeks reported with a contract snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractGreeks {
    /// Delta - price sensitivity to the underlying.
    pub delta: f64,
    /// Gamma - delta sensitivity to the underlying.
    pub gamma: f64,
    /// Theta - price sensitivity to time (per day).
    pub theta: f64,
    /// Vega - price sensitivity to IV (per 1% change).
    pub vega: f64,
    /// Rho - price sensitivity to rates (per 1% change).
    pub rho: f64,
}

/// Immutable snapshot of a single option contract.
///
/// Contracts are re-fetched, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying symbol (e.g., "SPY").
    pub underlying: String,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Option type.
    pub option_type: OptionType,
    /// Quote data.
    pub quote: Quote,
    /// Greeks at snapshot time.
    pub greeks: ContractGreeks,
    /// Implied volatility (annualized, e.g. 0.25 = 25%).
    pub implied_volatility: f64,
}

impl OptionContract {
    /// Premium used for strategy construction: last trade price when
    /// available, otherwise the quote mid.
    #[must_use]
    pub fn premium(&self) -> Decimal {
        if self.quote.last > Decimal::ZERO {
            self.quote.last
        } else {
            self.quote.mid()
        }
    }

    /// Whether the contract is usable for strategy construction
    /// (positive traded price and a known delta).
    #[must_use]
    pub fn is_tradeable(&self) -> bool {
        self.premium() > Decimal::ZERO && self.greeks.delta != 0.0
    }

    /// Premium spent this session in dollars (volume x price x multiplier).
    #[must_use]
    pub fn premium_spent(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.quote.volume as f64 * self.premium().to_f64().unwrap_or(0.0) * 100.0
    }
}
