//! Option chain snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::contract::OptionContract;

/// Calls and puts quoted at one expiration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpirationSlice {
    /// Call contracts, unordered as received.
    pub calls: Vec<OptionContract>,
    /// Put contracts, unordered as received.
    pub puts: Vec<OptionContract>,
}

impl ExpirationSlice {
    /// Iterate over calls and puts together.
    pub fn all(&self) -> impl Iterator<Item = &OptionContract> {
        self.calls.iter().chain(self.puts.iter())
    }
}

/// Snapshot of a full option chain for one underlying.
///
/// Owned by the caller for the duration of one analysis pass; the engine
/// never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying symbol.
    pub underlying: String,
    /// Underlying price at snapshot time.
    pub underlying_price: Decimal,
    /// Contracts keyed by expiration, ascending.
    pub expirations: BTreeMap<NaiveDate, ExpirationSlice>,
}

impl ChainSnapshot {
    /// Iterate over every contract in the snapshot.
    pub fn all_contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.expirations.values().flat_map(ExpirationSlice::all)
    }

    /// The `n` nearest expirations, ascending.
    #[must_use]
    pub fn nearest_expirations(&self, n: usize) -> Vec<NaiveDate> {
        self.expirations.keys().copied().take(n).collect()
    }

    /// Contracts at one expiration, if present.
    #[must_use]
    pub fn slice(&self, expiration: NaiveDate) -> Option<&ExpirationSlice> {
        self.expirations.get(&expiration)
    }

    /// All distinct strikes in the snapshot, ascending.
    #[must_use]
    pub fn strikes(&self) -> Vec<Decimal> {
        let mut strikes: Vec<Decimal> = self.all_contracts().map(|c| c.strike).collect();
        strikes.sort_unstable();
        strikes.dedup();
        strikes
    }

    /// Whether the snapshot holds no contracts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expirations.values().all(|s| s.calls.is_empty() && s.puts.is_empty())
    }
}
