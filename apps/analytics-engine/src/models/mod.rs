//! Shared data model for the analytics engine.
//!
//! All types here are immutable snapshot values: the engine derives
//! analytics from them but never mutates caller-owned data in place.

mod bar;
mod chain;
mod contract;
mod position;
mod risk_config;
mod strategy;

pub use bar::OhlcBar;
pub use chain::{ChainSnapshot, ExpirationSlice};
pub use contract::{ContractGreeks, OptionContract, OptionType, Quote};
pub use position::{PositionStatus, TrackedPosition};
pub use risk_config::{
    ClampWarning, MAX_CONCENTRATION_BOUNDS, MAX_RISK_PCT_BOUNDS, MIN_PROB_PROFIT_BOUNDS,
    MIN_REWARD_RATIO_BOUNDS, RiskConfig,
};
pub use strategy::{
    LegAction, MaxProfit, NetPremium, SpreadDirection, Strategy, StrategyKind, StrategyLeg,
};
