//! Market Data Port (driven port).
//!
//! Interface for the external market-data provider. Live retrieval over
//! the network is an external collaborator concern; this engine only
//! defines the port and ships a deterministic mock for tests.

mod mock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChainSnapshot, OhlcBar};

pub use mock::MockMarketData;

/// Freshness tier of a returned price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceFreshness {
    /// Live quote.
    RealTime,
    /// Previous session close, served when real-time data is unavailable.
    PreviousClose,
}

/// Underlying price with its freshness tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingPrice {
    /// The price.
    pub price: Decimal,
    /// How fresh it is.
    pub freshness: PriceFreshness,
}

/// Market data errors.
#[derive(Debug, Clone, Error)]
pub enum MarketDataError {
    /// Symbol not found.
    #[error("symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// Data unavailable.
    #[error("market data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },

    /// Provider-side error.
    #[error("market data provider error: {message}")]
    ProviderError {
        /// Error details.
        message: String,
    },
}

/// Port for fetching market data from external providers.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Full option chain snapshot for a symbol.
    async fn chain_snapshot(&self, symbol: &str) -> Result<ChainSnapshot, MarketDataError>;

    /// Underlying price with the two-tier freshness policy: real-time,
    /// falling back to previous close.
    async fn underlying_price(&self, symbol: &str) -> Result<UnderlyingPrice, MarketDataError>;

    /// Trailing daily OHLC bars, oldest first.
    async fn ohlc_history(&self, symbol: &str, days: u32) -> Result<Vec<OhlcBar>, MarketDataError>;
}
