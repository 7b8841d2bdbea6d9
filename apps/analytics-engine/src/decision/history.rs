//! Bounded price history for one underlying.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observed price.
    pub price: Decimal,
    /// Observation time.
    pub timestamp: DateTime<Utc>,
}

/// Short-window trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Price rising across the window.
    Rising,
    /// Price falling across the window.
    Falling,
    /// No meaningful move.
    Flat,
}

/// Fixed-capacity, time-ordered price ring buffer.
///
/// The oldest entry is evicted on overflow. Owned by one decision-engine
/// instance per symbol/session; a single writer is assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    capacity: usize,
    points: VecDeque<PricePoint>,
}

impl PriceHistory {
    /// Create a history with the given capacity (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Record an observation, evicting the oldest on overflow.
    pub fn push(&mut self, price: Decimal, timestamp: DateTime<Utc>) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(PricePoint { price, timestamp });
    }

    /// Number of stored observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Latest observation.
    #[must_use]
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Count of observations within `tolerance_pct` of `level`.
    #[must_use]
    pub fn touches(&self, level: Decimal, tolerance_pct: f64) -> usize {
        self.points
            .iter()
            .filter(|p| within(p.price, level, tolerance_pct))
            .count()
    }

    /// Whether the level has been touched exactly once so far.
    #[must_use]
    pub fn is_first_touch(&self, level: Decimal, tolerance_pct: f64) -> bool {
        self.touches(level, tolerance_pct) == 1
    }

    /// Whether the level was touched and price has since moved at least
    /// `bounce_pct` away from it.
    #[must_use]
    pub fn has_bounced(&self, level: Decimal, tolerance_pct: f64, bounce_pct: f64) -> bool {
        if self.touches(level, tolerance_pct) == 0 {
            return false;
        }
        self.latest()
            .is_some_and(|p| distance_pct(p.price, level) >= bounce_pct)
    }

    /// How long the latest consecutive run of observations has stayed
    /// beyond `level` (`above` picks the side). Zero when the latest
    /// observation is not beyond the level.
    #[must_use]
    pub fn dwell_beyond(&self, level: Decimal, above: bool) -> Duration {
        let beyond = |price: Decimal| if above { price > level } else { price < level };

        let mut run_start: Option<DateTime<Utc>> = None;
        for point in self.points.iter().rev() {
            if beyond(point.price) {
                run_start = Some(point.timestamp);
            } else {
                break;
            }
        }

        match (run_start, self.latest()) {
            (Some(start), Some(latest)) if beyond(latest.price) => latest.timestamp - start,
            _ => Duration::zero(),
        }
    }

    /// Classify the trend over the trailing `window`.
    ///
    /// Compares the earliest observation inside the window with the
    /// latest; moves under `threshold_pct` are flat.
    #[must_use]
    pub fn trend(&self, window: Duration, threshold_pct: f64) -> Trend {
        let Some(latest) = self.latest() else {
            return Trend::Flat;
        };
        let cutoff = latest.timestamp - window;
        let Some(earliest) = self.points.iter().find(|p| p.timestamp >= cutoff) else {
            return Trend::Flat;
        };
        if earliest.price <= Decimal::ZERO {
            return Trend::Flat;
        }

        let change = ((latest.price - earliest.price) / earliest.price)
            .to_f64()
            .unwrap_or(0.0);
        if change > threshold_pct {
            Trend::Rising
        } else if change < -threshold_pct {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }
}

fn within(price: Decimal, level: Decimal, tolerance_pct: f64) -> bool {
    distance_pct(price, level) <= tolerance_pct
}

fn distance_pct(price: Decimal, level: Decimal) -> f64 {
    if level <= Decimal::ZERO {
        return f64::INFINITY;
    }
    ((price - level).abs() / level).to_f64().unwrap_or(f64::INFINITY)
}
