//! Typed requests and responses for the operation surface.
//!
//! A front-end dispatcher (out of scope here) maps named operations onto
//! these types; every operation returns either a typed result or a typed
//! rejection with a human-readable reason.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::decision::{EntryContext, ExitContext, PriceHistory};
use crate::exposure::ExposureReport;
use crate::flow::FlowReport;
use crate::models::{ClampWarning, SpreadDirection, Strategy};
use crate::portfolio::{GreekBias, OpenPosition, PortfolioGreeks, StressReport};
use crate::projection::{GridProjection, MonteCarloResult};
use crate::sizing::PositionSizing;
use crate::strategies::{RankedStrategy, RankingPreference};
use crate::surface::SurfaceReport;

/// Caller-supplied risk overrides; each field falls back to the engine
/// config when absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskOverrides {
    /// Maximum fraction of account value risked per position.
    pub max_risk_pct: Option<f64>,
    /// Minimum acceptable reward/risk ratio.
    pub min_reward_ratio: Option<f64>,
    /// Minimum acceptable probability of profit.
    pub min_prob_profit: Option<f64>,
    /// Maximum fraction of account value in one position.
    pub max_concentration: Option<f64>,
}

/// Caller-supplied vertical target strikes, bypassing the auto-scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalTargets {
    /// Spread direction.
    pub direction: SpreadDirection,
    /// Expiration to build at.
    pub expiration: NaiveDate,
    /// (long strike, short strike) pairs.
    pub pairs: Vec<(Decimal, Decimal)>,
}

/// Request: generate, filter and rank candidate strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateStrategiesRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Account value used for the risk cap.
    pub account_value: Decimal,
    /// Ranking preference.
    #[serde(default)]
    pub preference: RankingPreference,
    /// Risk overrides.
    #[serde(default)]
    pub risk: RiskOverrides,
    /// When set, verticals come from these pairs instead of the auto-scan.
    #[serde(default)]
    pub vertical_targets: Option<VerticalTargets>,
}

/// Response: ranked strategies plus the analytics that biased them.
// Carries `Vec<ClampWarning>`, whose `&'static str` field cannot implement
// `Deserialize`; responses are only serialized out, so this derives
// `Serialize` only.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateStrategiesResponse {
    /// Surviving strategies, best first.
    pub strategies: Vec<RankedStrategy>,
    /// Exposure analytics for the snapshot.
    pub exposure: ExposureReport,
    /// Flow analytics for the snapshot.
    pub flow: FlowReport,
    /// Surface analytics for the snapshot.
    pub surface: SurfaceReport,
    /// Clamping warnings from risk validation.
    pub warnings: Vec<ClampWarning>,
}

/// Request: size one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizePositionRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// The strategy to size.
    pub strategy: Strategy,
    /// Account value.
    pub account_value: Decimal,
    /// Risk overrides.
    #[serde(default)]
    pub risk: RiskOverrides,
}

/// Response: the sizing recommendation.
// Carries `Vec<ClampWarning>`, whose `&'static str` field cannot implement
// `Deserialize`; responses are only serialized out, so this derives
// `Serialize` only.
#[derive(Debug, Clone, Serialize)]
pub struct SizePositionResponse {
    /// Sizing result; check `sizing.rejection`.
    pub sizing: PositionSizing,
    /// Clamping warnings from risk validation.
    pub warnings: Vec<ClampWarning>,
}

/// Request: project P&L for a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPnlRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// The strategy to project.
    pub strategy: Strategy,
    /// Contracts held.
    pub contracts: u32,
}

/// Response: deterministic grid and Monte-Carlo distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPnlResponse {
    /// Price-grid projection at expiration.
    pub grid: GridProjection,
    /// Monte-Carlo outcome distribution over the configured horizon.
    pub monte_carlo: MonteCarloResult,
}

/// Request: aggregate portfolio Greeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioGreeksRequest {
    /// Open positions with live per-leg Greeks.
    pub positions: Vec<OpenPosition>,
}

/// Response: net Greeks and bias classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioGreeksResponse {
    /// Multiplier-scaled net Greeks.
    pub greeks: PortfolioGreeks,
    /// Derived bias classifications.
    pub bias: GreekBias,
}

/// Request: run the stress suite over a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestRequest {
    /// Underlying symbol (for the spot price).
    pub symbol: String,
    /// Open positions with live per-leg Greeks.
    pub positions: Vec<OpenPosition>,
}

/// Response: stress results plus the aggregated Greeks they used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestResponse {
    /// Scenario results, worst case called out.
    pub report: StressReport,
    /// The aggregated Greeks stressed.
    pub greeks: PortfolioGreeks,
}

/// Request: evaluate entry rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateEntryRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Entry context from the probability analytics.
    pub context: EntryContext,
}

/// Request: evaluate exit rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateExitRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Exit context for the tracked position.
    pub context: ExitContext,
    /// The symbol's price history (owned by the monitoring session).
    pub history: PriceHistory,
}
