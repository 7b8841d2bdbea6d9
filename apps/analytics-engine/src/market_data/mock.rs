//! Deterministic mock market-data provider for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{MarketDataError, MarketDataPort, PriceFreshness, UnderlyingPrice};
use crate::models::{ChainSnapshot, OhlcBar};

/// Mock market-data provider.
///
/// Prices can be queued so successive polls observe a scripted path;
/// when the queue drains, the last price repeats.
#[derive(Debug, Default)]
pub struct MockMarketData {
    chains: RwLock<HashMap<String, ChainSnapshot>>,
    prices: RwLock<HashMap<String, VecDeque<UnderlyingPrice>>>,
    bars: RwLock<HashMap<String, Vec<OhlcBar>>>,
}

impl MockMarketData {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a chain snapshot for a symbol.
    pub fn set_chain(&self, snapshot: ChainSnapshot) {
        let mut chains = self
            .chains
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        chains.insert(snapshot.underlying.clone(), snapshot);
    }

    /// Queue a real-time price observation for a symbol.
    pub fn push_price(&self, symbol: &str, price: Decimal) {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        prices
            .entry(symbol.to_string())
            .or_default()
            .push_back(UnderlyingPrice {
                price,
                freshness: PriceFreshness::RealTime,
            });
    }

    /// Queue a previous-close fallback observation for a symbol.
    pub fn push_previous_close(&self, symbol: &str, price: Decimal) {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        prices
            .entry(symbol.to_string())
            .or_default()
            .push_back(UnderlyingPrice {
                price,
                freshness: PriceFreshness::PreviousClose,
            });
    }

    /// Install OHLC history for a symbol.
    pub fn set_bars(&self, symbol: &str, bars: Vec<OhlcBar>) {
        let mut map = self
            .bars
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(symbol.to_string(), bars);
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn chain_snapshot(&self, symbol: &str) -> Result<ChainSnapshot, MarketDataError> {
        let chains = self
            .chains
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        chains
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn underlying_price(&self, symbol: &str) -> Result<UnderlyingPrice, MarketDataError> {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let queue = prices
            .get_mut(symbol)
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or(UnderlyingPrice {
                price: Decimal::ZERO,
                freshness: PriceFreshness::PreviousClose,
            }))
        } else {
            queue
                .front()
                .copied()
                .ok_or_else(|| MarketDataError::DataUnavailable {
                    message: format!("no prices queued for {symbol}"),
                })
        }
    }

    async fn ohlc_history(&self, symbol: &str, days: u32) -> Result<Vec<OhlcBar>, MarketDataError> {
        let map = self
            .bars
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let bars = map
            .get(symbol)
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        let take = days as usize;
        let start = bars.len().saturating_sub(take);
        Ok(bars[start..].to_vec())
    }
}
