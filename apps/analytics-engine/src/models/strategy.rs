//! Multi-leg strategy model.
//!
//! `Strategy` is a closed tagged union over the supported strategy kinds.
//! Each instance carries a fixed, ordered leg list plus derived economics
//! (net premium, max profit/risk, breakevens, probability of profit).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::contract::OptionType;

/// Leg action (buy to open / sell to open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegAction {
    /// Long leg.
    Buy,
    /// Short leg.
    Sell,
}

impl LegAction {
    /// Sign convention: +1 for long, -1 for short.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

/// One leg of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyLeg {
    /// Buy or sell.
    pub action: LegAction,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Per-share premium at construction time.
    pub price: Decimal,
}

impl StrategyLeg {
    /// Premium signed by action: positive for buys (paid), negative for
    /// sells (received).
    #[must_use]
    pub fn signed_price(&self) -> Decimal {
        match self.action {
            LegAction::Buy => self.price,
            LegAction::Sell => -self.price,
        }
    }
}

/// Direction of a vertical spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadDirection {
    /// Bullish (profits when the underlying rises).
    Bullish,
    /// Bearish (profits when the underlying falls).
    Bearish,
}

/// Strategy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Two-leg vertical spread.
    VerticalSpread(SpreadDirection),
    /// Four-leg iron condor.
    IronCondor,
    /// Two-leg calendar spread across expirations.
    CalendarSpread,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VerticalSpread(SpreadDirection::Bullish) => write!(f, "Bull Vertical Spread"),
            Self::VerticalSpread(SpreadDirection::Bearish) => write!(f, "Bear Vertical Spread"),
            Self::IronCondor => write!(f, "Iron Condor"),
            Self::CalendarSpread => write!(f, "Calendar Spread"),
        }
    }
}

/// Net premium: a strategy is entered either for a debit or a credit,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NetPremium {
    /// Net amount paid per share.
    Debit(Decimal),
    /// Net amount received per share.
    Credit(Decimal),
}

impl NetPremium {
    /// Absolute per-share premium amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        match self {
            Self::Debit(d) | Self::Credit(d) => d,
        }
    }
}

/// Maximum profit, with a sentinel for unlimited-upside structures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxProfit {
    /// Capped maximum profit per share.
    Limited(Decimal),
    /// Unlimited upside.
    Unbounded,
}

/// A fully constructed candidate strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Underlying symbol.
    pub underlying: String,
    /// Ordered legs.
    pub legs: Vec<StrategyLeg>,
    /// Net debit or credit per share.
    pub net_premium: NetPremium,
    /// Maximum profit per share.
    pub max_profit: MaxProfit,
    /// Maximum risk per share (non-negative).
    pub max_risk: Decimal,
    /// One or two breakeven prices.
    pub breakevens: Vec<Decimal>,
    /// Probability of profit, in [0, 1].
    pub probability_profit: f64,
}

impl Strategy {
    /// Risk/reward ratio (`max_profit / max_risk`).
    ///
    /// `None` when max risk is zero or max profit is unbounded.
    #[must_use]
    pub fn risk_reward(&self) -> Option<Decimal> {
        match self.max_profit {
            MaxProfit::Limited(profit) if self.max_risk > Decimal::ZERO => {
                Some(profit / self.max_risk)
            }
            _ => None,
        }
    }

    /// Expected value per share: `p * max_profit - (1 - p) * max_risk`.
    ///
    /// `None` when max profit is unbounded.
    #[must_use]
    pub fn expected_value(&self) -> Option<f64> {
        let MaxProfit::Limited(profit) = self.max_profit else {
            return None;
        };
        let profit = profit.to_f64().unwrap_or(0.0);
        let risk = self.max_risk.to_f64().unwrap_or(0.0);
        let p = self.probability_profit;
        Some(p * profit - (1.0 - p) * risk)
    }

    /// Sum of signed leg prices: positive means a net debit,
    /// negative a net credit.
    #[must_use]
    pub fn signed_leg_total(&self) -> Decimal {
        self.legs.iter().map(StrategyLeg::signed_price).sum()
    }

    /// Check that signed leg prices reconcile to the stated net premium.
    #[must_use]
    pub fn premium_reconciles(&self) -> bool {
        let total = self.signed_leg_total();
        match self.net_premium {
            NetPremium::Debit(d) => total == d,
            NetPremium::Credit(c) => total == -c,
        }
    }
}
