//! Historical OHLC bars.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily OHLC bar for an underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhlcBar {
    /// Session date.
    pub date: NaiveDate,
    /// Open price.
    pub open: Decimal,
    /// Session high.
    pub high: Decimal,
    /// Session low.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Session volume.
    pub volume: i64,
}
