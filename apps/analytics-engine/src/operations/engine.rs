//! The analytics engine facade wiring all components.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use chrono::NaiveDate;

use super::OperationError;
use super::requests::{
    EvaluateEntryRequest, EvaluateExitRequest, GenerateStrategiesRequest,
    GenerateStrategiesResponse, PortfolioGreeksRequest, PortfolioGreeksResponse,
    ProjectPnlRequest, ProjectPnlResponse, RiskOverrides, SizePositionRequest,
    SizePositionResponse, StressTestRequest, StressTestResponse,
};
use crate::config::EngineConfig;
use crate::decision::{
    EntryContext, EntryEvaluation, ExitDecision, RiskClassification, default_entry_rules,
    default_exit_rules, evaluate_entry, evaluate_exit,
};
use crate::market_data::MarketDataPort;
use crate::models::{ChainSnapshot, ClampWarning, RiskConfig, Strategy, TrackedPosition};
use crate::portfolio::{
    BreakerEngine, BreakerInput, BreakerStatus, OpenPosition, PositionLeg, aggregate_portfolio,
    default_stress_suite, run_stress,
};
use crate::pricing::{average_true_range, realized_volatility};
use crate::projection::{project_grid, simulate};
use crate::sizing::PositionSizer;
use crate::stores::{BreakerStore, Clock, PositionDocument, PositionStore};
use crate::strategies::{
    StrategyFilter, StrikeBias, generate_all, rank_strategies, verticals_from_targets,
};
use crate::{exposure, flow, surface};

/// The options-strategy analytics engine.
///
/// Holds the injected collaborators (market data, stores, clock) and the
/// engine configuration; every named operation of the surface is a method.
#[derive(Debug)]
pub struct AnalyticsEngine<M, P, B>
where
    M: MarketDataPort,
    P: PositionStore,
    B: BreakerStore,
{
    market_data: Arc<M>,
    positions: Arc<P>,
    breakers: BreakerEngine<B>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<M, P, B> AnalyticsEngine<M, P, B>
where
    M: MarketDataPort,
    P: PositionStore,
    B: BreakerStore,
{
    /// Wire an engine from its collaborators.
    #[must_use]
    pub fn new(
        market_data: Arc<M>,
        positions: Arc<P>,
        breakers: BreakerEngine<B>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            market_data,
            positions,
            breakers,
            clock,
            config,
        }
    }

    /// Engine configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate, filter and rank candidate strategies for a symbol.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol, unavailable market data, or an
    /// empty/priceless snapshot (fatal per the error taxonomy).
    pub async fn generate_strategies(
        &self,
        request: GenerateStrategiesRequest,
    ) -> Result<GenerateStrategiesResponse, OperationError> {
        require_symbol(&request.symbol)?;
        let chain = self.market_data.chain_snapshot(&request.symbol).await?;

        let exposure = exposure::analyze(&chain, &self.config.exposure)?;
        let flow = flow::detect(&chain, &self.config.flow);
        let surface = surface::analyze(&chain, self.clock.today(), None)?;

        let bias = StrikeBias::from_signals(&exposure, &flow);
        let candidates = match &request.vertical_targets {
            Some(targets) => verticals_from_targets(
                &chain,
                targets.expiration,
                targets.direction,
                &targets.pairs,
            ),
            None => generate_all(&chain, &self.config.generator, &bias),
        };

        let (risk, warnings) = self.risk_config(&request.risk);
        let filter = StrategyFilter {
            min_reward_ratio: risk.min_reward_ratio,
            min_prob_profit: risk.min_prob_profit,
            max_risk: per_share_risk_cap(request.account_value, risk.max_risk_pct),
        };
        let strategies = rank_strategies(candidates, &chain, &filter, request.preference);

        info!(
            symbol = %request.symbol,
            survivors = strategies.len(),
            "strategy generation operation complete"
        );
        Ok(GenerateStrategiesResponse {
            strategies,
            exposure,
            flow,
            surface,
            warnings,
        })
    }

    /// Size one strategy against the account.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol or unavailable market data; a strategy
    /// failing sizing criteria is a rejection value, not an error.
    pub async fn size_position(
        &self,
        request: SizePositionRequest,
    ) -> Result<SizePositionResponse, OperationError> {
        require_symbol(&request.symbol)?;
        let chain = self.market_data.chain_snapshot(&request.symbol).await?;

        let (risk, warnings) = self.risk_config(&request.risk);
        let sizer = PositionSizer::new(risk, self.config.costs.clone(), self.config.kelly);
        let sizing = sizer.size(&request.strategy, &chain, request.account_value);

        Ok(SizePositionResponse { sizing, warnings })
    }

    /// Project P&L for a strategy on the deterministic grid and by
    /// Monte-Carlo simulation.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol or unavailable market data.
    pub async fn project_pnl(
        &self,
        request: ProjectPnlRequest,
    ) -> Result<ProjectPnlResponse, OperationError> {
        require_symbol(&request.symbol)?;
        let chain = self.market_data.chain_snapshot(&request.symbol).await?;
        let spot = chain.underlying_price.to_f64().unwrap_or(0.0);

        let grid = project_grid(&request.strategy, request.contracts, spot, &self.config.grid);

        let position = position_from_strategy(&request.strategy, request.contracts, &chain);
        let greeks = aggregate_portfolio(&[position]);
        let monte_carlo = simulate(&greeks, spot, &self.config.monte_carlo);

        Ok(ProjectPnlResponse { grid, monte_carlo })
    }

    /// Aggregate net Greeks across open positions.
    #[must_use]
    pub fn portfolio_greeks(&self, request: &PortfolioGreeksRequest) -> PortfolioGreeksResponse {
        let greeks = aggregate_portfolio(&request.positions);
        PortfolioGreeksResponse {
            bias: greeks.bias(),
            greeks,
        }
    }

    /// Run the stress suite over a book of positions.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol or unavailable market data.
    pub async fn run_stress_test(
        &self,
        request: StressTestRequest,
    ) -> Result<StressTestResponse, OperationError> {
        require_symbol(&request.symbol)?;
        let spot = self
            .market_data
            .underlying_price(&request.symbol)
            .await?
            .price
            .to_f64()
            .unwrap_or(0.0);

        let greeks = aggregate_portfolio(&request.positions);
        let report = run_stress(&greeks, spot, &default_stress_suite());
        Ok(StressTestResponse { report, greeks })
    }

    /// Build an entry context from live market data: ATR from trailing
    /// bars, probability of touch per monitored strike, and a confidence
    /// classification from the worst touch probability.
    ///
    /// A degenerate ATR (too little history, flat bars) falls back to 1%
    /// of spot so the distance test stays meaningful.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol, an empty strike list, or unavailable
    /// market data.
    pub async fn build_entry_context(
        &self,
        symbol: &str,
        strikes: &[Decimal],
        expiration: NaiveDate,
    ) -> Result<EntryContext, OperationError> {
        require_symbol(symbol)?;
        if strikes.is_empty() {
            return Err(OperationError::MissingField { field: "strikes" });
        }

        let chain = self.market_data.chain_snapshot(symbol).await?;
        let spot = chain.underlying_price.to_f64().unwrap_or(0.0);
        let bars = self.market_data.ohlc_history(symbol, ATR_HISTORY_DAYS).await?;

        let atr = average_true_range(&bars, ATR_PERIOD)
            .filter(|&a| a > 0.0)
            .unwrap_or(spot * 0.01);
        let sigma = atm_implied_vol(&chain)
            .or_else(|| realized_volatility(&bars))
            .unwrap_or(0.0);
        let t = years_until(self.clock.today(), expiration);

        let touch_probabilities: Vec<(Decimal, f64)> = strikes
            .iter()
            .map(|&strike| {
                let k = strike.to_f64().unwrap_or(0.0);
                let p = self
                    .config
                    .touch
                    .probability(spot, k, t, RISK_FREE_RATE, sigma);
                (strike, p)
            })
            .collect();

        let distance_atr = strikes
            .iter()
            .map(|&strike| (strike.to_f64().unwrap_or(0.0) - spot).abs() / atr)
            .fold(f64::INFINITY, f64::min);

        let worst_touch = touch_probabilities
            .iter()
            .map(|&(_, p)| p)
            .fold(0.0, f64::max);
        let risk_class = if worst_touch < 0.40 {
            RiskClassification::High
        } else if worst_touch < 0.60 {
            RiskClassification::Moderate
        } else {
            RiskClassification::Low
        };

        Ok(EntryContext {
            setup_valid: true,
            validation_reason: None,
            touch_probabilities,
            distance_atr,
            implied_volatility: sigma,
            risk_class,
        })
    }

    /// Evaluate the ordered entry rules.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol.
    pub fn evaluate_entry(
        &self,
        request: &EvaluateEntryRequest,
    ) -> Result<EntryEvaluation, OperationError> {
        require_symbol(&request.symbol)?;
        Ok(evaluate_entry(
            &request.context,
            &self.config.entry,
            &default_entry_rules(),
        ))
    }

    /// Evaluate the ordered exit rules.
    ///
    /// # Errors
    ///
    /// Fails on a missing symbol or an empty short-strike list.
    pub fn evaluate_exit(
        &self,
        request: &EvaluateExitRequest,
    ) -> Result<ExitDecision, OperationError> {
        require_symbol(&request.symbol)?;
        if request.context.short_strikes.is_empty() {
            return Err(OperationError::MissingField {
                field: "short_strikes",
            });
        }
        Ok(evaluate_exit(
            &request.context,
            &request.history,
            &self.config.exit,
            &default_exit_rules(),
        ))
    }

    /// Evaluate circuit breakers against the day's figures.
    ///
    /// # Errors
    ///
    /// Propagates breaker-store failures.
    pub async fn evaluate_circuit_breakers(
        &self,
        input: &BreakerInput,
    ) -> Result<BreakerStatus, OperationError> {
        Ok(self.breakers.evaluate(input).await?)
    }

    /// Persist a newly opened position.
    ///
    /// # Errors
    ///
    /// Propagates position-store failures.
    pub async fn record_position(
        &self,
        position: TrackedPosition,
    ) -> Result<(), OperationError> {
        let mut doc = self.positions.load().await?;
        doc.positions.push(position);
        self.positions.save(&doc).await?;
        Ok(())
    }

    /// Close a tracked position by id at the given price.
    ///
    /// # Errors
    ///
    /// Fails when the id is unknown; propagates store failures.
    pub async fn close_position(
        &self,
        position_id: &str,
        exit_price: Decimal,
    ) -> Result<TrackedPosition, OperationError> {
        let mut doc = self.positions.load().await?;
        let Some(position) = doc.positions.iter_mut().find(|p| p.id == position_id) else {
            return Err(OperationError::UnknownPosition {
                position_id: position_id.to_string(),
            });
        };
        position.close(exit_price, self.clock.now());
        let closed = position.clone();
        self.positions.save(&doc).await?;
        Ok(closed)
    }

    /// The current position document.
    ///
    /// # Errors
    ///
    /// Propagates position-store failures.
    pub async fn positions(&self) -> Result<PositionDocument, OperationError> {
        Ok(self.positions.load().await?)
    }

    fn risk_config(&self, overrides: &RiskOverrides) -> (RiskConfig, Vec<ClampWarning>) {
        let base = self.config.risk;
        RiskConfig::clamped(
            overrides.max_risk_pct.unwrap_or(base.max_risk_pct),
            overrides.min_reward_ratio.unwrap_or(base.min_reward_ratio),
            overrides.min_prob_profit.unwrap_or(base.min_prob_profit),
            overrides.max_concentration.unwrap_or(base.max_concentration),
        )
    }
}

/// Flat risk-free rate used by the probability approximations.
const RISK_FREE_RATE: f64 = 0.04;

/// ATR lookback period in bars.
const ATR_PERIOD: usize = 14;

/// Trailing bars fetched for ATR/realized-vol computation.
const ATR_HISTORY_DAYS: u32 = 30;

fn years_until(today: NaiveDate, expiration: NaiveDate) -> f64 {
    (expiration - today).num_days().max(0) as f64 / 365.0
}

fn atm_implied_vol(chain: &ChainSnapshot) -> Option<f64> {
    chain
        .all_contracts()
        .filter(|c| c.implied_volatility > 0.0)
        .min_by_key(|c| (c.strike - chain.underlying_price).abs())
        .map(|c| c.implied_volatility)
}

fn require_symbol(symbol: &str) -> Result<(), OperationError> {
    if symbol.trim().is_empty() {
        return Err(OperationError::MissingField { field: "symbol" });
    }
    Ok(())
}

/// Per-share risk cap derived from the account risk budget: one contract
/// controls 100 shares.
fn per_share_risk_cap(account_value: Decimal, max_risk_pct: f64) -> Decimal {
    use rust_decimal::prelude::FromPrimitive;
    account_value * Decimal::from_f64(max_risk_pct).unwrap_or_default() / Decimal::from(100)
}

/// Build a portfolio position from a strategy by looking leg Greeks up in
/// the snapshot. Legs missing from the snapshot contribute zero Greeks.
fn position_from_strategy(
    strategy: &Strategy,
    contracts: u32,
    chain: &ChainSnapshot,
) -> OpenPosition {
    let legs = strategy
        .legs
        .iter()
        .map(|leg| {
            let greeks = chain
                .slice(leg.expiration)
                .and_then(|slice| {
                    slice
                        .all()
                        .find(|c| c.strike == leg.strike && c.option_type == leg.option_type)
                        .map(|c| c.greeks)
                })
                .unwrap_or_else(|| {
                    warn!(
                        strike = %leg.strike,
                        "leg not found in snapshot; zero Greeks assumed"
                    );
                    crate::models::ContractGreeks::default()
                });
            PositionLeg {
                action: leg.action,
                contracts,
                greeks,
            }
        })
        .collect();
    OpenPosition {
        symbol: strategy.underlying.clone(),
        legs,
    }
}
