//! Tracked position records persisted to the position store.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tracked position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    /// Position is open.
    Open,
    /// Position has been closed.
    Closed,
}

/// One tracked position in the position store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    /// Unique id (uuid v4).
    pub id: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Strategy label (e.g., "Iron Condor").
    pub strategy: String,
    /// Entry price per share.
    pub entry_price: Decimal,
    /// Exit price per share, once closed.
    pub exit_price: Option<Decimal>,
    /// Number of contracts.
    pub contracts: u32,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Primary (short) strike.
    pub strike: Decimal,
    /// Open or closed.
    pub status: PositionStatus,
    /// When the position was opened.
    pub opened_at: DateTime<Utc>,
    /// When the position was closed, if it was.
    pub closed_at: Option<DateTime<Utc>>,
}

impl TrackedPosition {
    /// Create a new open position with a fresh id.
    #[must_use]
    pub fn open(
        symbol: impl Into<String>,
        strategy: impl Into<String>,
        entry_price: Decimal,
        contracts: u32,
        expiration: NaiveDate,
        strike: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            strategy: strategy.into(),
            entry_price,
            exit_price: None,
            contracts,
            expiration,
            strike,
            status: PositionStatus::Open,
            opened_at,
            closed_at: None,
        }
    }

    /// Mark the position closed at the given price and time.
    pub fn close(&mut self, exit_price: Decimal, closed_at: DateTime<Utc>) {
        self.exit_price = Some(exit_price);
        self.status = PositionStatus::Closed;
        self.closed_at = Some(closed_at);
    }

    /// Realized P&L in dollars, once closed.
    #[must_use]
    pub fn realized_pnl(&self) -> Option<Decimal> {
        self.exit_price
            .map(|exit| (exit - self.entry_price) * Decimal::from(self.contracts) * Decimal::from(100))
    }
}
