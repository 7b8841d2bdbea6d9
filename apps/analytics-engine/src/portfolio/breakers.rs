//! Trading circuit breakers.
//!
//! Breakers are an explicit ordered list of tagged rule records evaluated
//! against the day's P&L and risk figures. Tripped state persists across
//! calls within the trading day via the breaker store and resets when the
//! stored date differs from the clock's date.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::stores::{BreakerStore, Clock, StoreError};

/// Circuit-breaker thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Absolute daily loss that halts all trading.
    pub max_daily_loss: Decimal,
    /// Daily loss as a fraction of account value that halts all trading.
    pub max_daily_loss_pct: f64,
    /// Portfolio risk as a fraction of account value that halts new trades.
    pub max_portfolio_risk_pct: f64,
    /// Volatility-index level that halts new trades.
    pub vol_spike_threshold: f64,
    /// Single-position loss fraction that flags the position.
    pub max_position_loss_pct: f64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_daily_loss: Decimal::from(5_000),
            max_daily_loss_pct: 0.03,
            max_portfolio_risk_pct: 0.25,
            vol_spike_threshold: 35.0,
            max_position_loss_pct: 0.50,
        }
    }
}

/// What a tripped breaker does to trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerAction {
    /// Stop opening and closing.
    HaltAll,
    /// Stop opening new positions only.
    HaltNew,
    /// Flag the offending position without halting.
    FlagPosition,
}

/// Loss figure for one open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionLoss {
    /// Position id.
    pub position_id: String,
    /// Loss as a fraction of the position's entry cost.
    pub loss_pct: f64,
}

/// Inputs to one breaker evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerInput {
    /// Realized + unrealized P&L for the day.
    pub daily_pnl: Decimal,
    /// Current account value.
    pub account_value: Decimal,
    /// Total portfolio risk in dollars.
    pub portfolio_risk: Decimal,
    /// Current volatility-index level.
    pub vol_index: f64,
    /// Per-position loss figures.
    pub position_losses: Vec<PositionLoss>,
}

/// One tagged breaker rule.
pub struct BreakerRule {
    /// Stable rule name, also used for dedupe in the day's document.
    pub name: &'static str,
    /// Action taken when the rule trips.
    pub action: BreakerAction,
    /// Condition; returns the trip reason when breached.
    pub check: fn(&BreakerInput, &BreakerConfig) -> Option<String>,
}

impl std::fmt::Debug for BreakerRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerRule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// The default breaker rule list, evaluated in order.
#[must_use]
pub fn default_breaker_rules() -> Vec<BreakerRule> {
    vec![
        BreakerRule {
            name: "daily_loss_absolute",
            action: BreakerAction::HaltAll,
            check: |input, config| {
                (input.daily_pnl <= -config.max_daily_loss).then(|| {
                    format!(
                        "daily loss {} breaches absolute limit {}",
                        input.daily_pnl, config.max_daily_loss
                    )
                })
            },
        },
        BreakerRule {
            name: "daily_loss_percent",
            action: BreakerAction::HaltAll,
            check: |input, config| {
                let limit = input.account_value
                    * Decimal::from_f64(config.max_daily_loss_pct).unwrap_or_default();
                (input.daily_pnl <= -limit).then(|| {
                    format!(
                        "daily loss {} breaches {:.1}% of account",
                        input.daily_pnl,
                        config.max_daily_loss_pct * 100.0
                    )
                })
            },
        },
        BreakerRule {
            name: "portfolio_risk",
            action: BreakerAction::HaltNew,
            check: |input, config| {
                let limit = input.account_value
                    * Decimal::from_f64(config.max_portfolio_risk_pct).unwrap_or_default();
                (input.portfolio_risk > limit).then(|| {
                    format!(
                        "portfolio risk {} exceeds {:.1}% of account",
                        input.portfolio_risk,
                        config.max_portfolio_risk_pct * 100.0
                    )
                })
            },
        },
        BreakerRule {
            name: "volatility_spike",
            action: BreakerAction::HaltNew,
            check: |input, config| {
                (input.vol_index > config.vol_spike_threshold).then(|| {
                    format!(
                        "volatility index {:.1} above spike threshold {:.1}",
                        input.vol_index, config.vol_spike_threshold
                    )
                })
            },
        },
        BreakerRule {
            name: "position_loss",
            action: BreakerAction::FlagPosition,
            check: |input, config| {
                let flagged: Vec<&str> = input
                    .position_losses
                    .iter()
                    .filter(|p| p.loss_pct > config.max_position_loss_pct)
                    .map(|p| p.position_id.as_str())
                    .collect();
                (!flagged.is_empty()).then(|| {
                    format!(
                        "positions beyond {:.0}% loss: {}",
                        config.max_position_loss_pct * 100.0,
                        flagged.join(", ")
                    )
                })
            },
        },
    ]
}

/// A breaker that tripped today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrippedBreaker {
    /// Rule name.
    pub name: String,
    /// Action taken.
    pub action: BreakerAction,
    /// Human-readable trip reason.
    pub reason: String,
    /// When the rule tripped.
    pub tripped_at: DateTime<Utc>,
}

/// Durable breaker state for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerDocument {
    /// The trading day this document covers.
    pub date: NaiveDate,
    /// Latest daily P&L written.
    pub daily_pnl: Decimal,
    /// Trades recorded today.
    pub trades_today: u32,
    /// Breakers tripped today.
    pub tripped: Vec<TrippedBreaker>,
}

impl BreakerDocument {
    /// Fresh document for a new trading day.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            daily_pnl: Decimal::ZERO,
            trades_today: 0,
            tripped: Vec::new(),
        }
    }
}

/// Trading posture after an evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerStatus {
    /// All trading halted.
    pub halt_all: bool,
    /// New positions halted.
    pub halt_new: bool,
    /// Position ids flagged for attention.
    pub flagged: Vec<String>,
    /// Every breaker tripped today.
    pub tripped: Vec<TrippedBreaker>,
}

impl BreakerStatus {
    fn from_document(doc: &BreakerDocument, input: &BreakerInput, config: &BreakerConfig) -> Self {
        let halt_all = doc
            .tripped
            .iter()
            .any(|t| t.action == BreakerAction::HaltAll);
        let halt_new = halt_all
            || doc
                .tripped
                .iter()
                .any(|t| t.action == BreakerAction::HaltNew);
        let flagged = input
            .position_losses
            .iter()
            .filter(|p| p.loss_pct > config.max_position_loss_pct)
            .map(|p| p.position_id.clone())
            .collect();
        Self {
            halt_all,
            halt_new,
            flagged,
            tripped: doc.tripped.clone(),
        }
    }
}

/// Breaker engine: evaluates the rule list and persists tripped state
/// through the injected store and clock.
///
/// Assumes at most one writer process; concurrent writers would race on
/// the read-modify-write cycle.
#[derive(Debug)]
pub struct BreakerEngine<S: BreakerStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: BreakerConfig,
    rules: Vec<BreakerRule>,
}

impl<S: BreakerStore> BreakerEngine<S> {
    /// Create an engine with the default rule list.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: BreakerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            rules: default_breaker_rules(),
        }
    }

    /// Replace the rule list (for tests or custom policies).
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<BreakerRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Evaluate breakers against the day's figures.
    ///
    /// Loads the stored document, resets it when the stored date differs
    /// from today, merges fresh trips, saves, and reports the resulting
    /// posture.
    ///
    /// # Errors
    ///
    /// Propagates store read/write failures.
    pub async fn evaluate(&self, input: &BreakerInput) -> Result<BreakerStatus, StoreError> {
        let today = self.clock.today();
        let mut doc = match self.store.load().await? {
            Some(doc) if doc.date == today => doc,
            _ => BreakerDocument::new(today),
        };
        doc.daily_pnl = input.daily_pnl;

        let now = self.clock.now();
        for rule in &self.rules {
            if let Some(reason) = (rule.check)(input, &self.config) {
                if doc.tripped.iter().any(|t| t.name == rule.name) {
                    continue;
                }
                warn!(rule = rule.name, %reason, "circuit breaker tripped");
                doc.tripped.push(TrippedBreaker {
                    name: rule.name.to_string(),
                    action: rule.action,
                    reason,
                    tripped_at: now,
                });
            }
        }

        self.store.save(&doc).await?;
        Ok(BreakerStatus::from_document(&doc, input, &self.config))
    }

    /// Record one executed trade against today's counter.
    ///
    /// # Errors
    ///
    /// Propagates store read/write failures.
    pub async fn record_trade(&self) -> Result<u32, StoreError> {
        let today = self.clock.today();
        let mut doc = match self.store.load().await? {
            Some(doc) if doc.date == today => doc,
            _ => BreakerDocument::new(today),
        };
        doc.trades_today += 1;
        let count = doc.trades_today;
        self.store.save(&doc).await?;
        Ok(count)
    }
}
