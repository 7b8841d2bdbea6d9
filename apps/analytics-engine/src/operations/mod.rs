//! Operation surface: typed requests, typed results, typed rejections.

mod engine;
mod requests;

use thiserror::Error;

use crate::exposure::ExposureError;
use crate::market_data::MarketDataError;
use crate::stores::StoreError;
use crate::surface::SurfaceError;

pub use engine::AnalyticsEngine;
pub use requests::{
    EvaluateEntryRequest, EvaluateExitRequest, GenerateStrategiesRequest,
    GenerateStrategiesResponse, PortfolioGreeksRequest, PortfolioGreeksResponse,
    ProjectPnlRequest, ProjectPnlResponse, RiskOverrides, SizePositionRequest,
    SizePositionResponse, StressTestRequest, StressTestResponse, VerticalTargets,
};

/// Operation-level errors.
///
/// These are the fatal failures of the taxonomy: missing identifying
/// fields and unavailable required market inputs. Data-driven outcomes
/// (strategy rejected, breaker tripped) are values on the result types.
#[derive(Debug, Error)]
pub enum OperationError {
    /// A required identifying field was missing.
    #[error("missing required field: {field}")]
    MissingField {
        /// The missing field.
        field: &'static str,
    },

    /// Unknown tracked position.
    #[error("unknown position: {position_id}")]
    UnknownPosition {
        /// The id that failed to resolve.
        position_id: String,
    },

    /// Market data could not be fetched.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Exposure analysis failed (empty chain, bad underlying price).
    #[error(transparent)]
    Exposure(#[from] ExposureError),

    /// Surface analysis failed (empty chain).
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Store read/write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::decision::{EntryContext, ExitContext, PriceHistory, RiskClassification};
    use crate::market_data::MockMarketData;
    use crate::models::{
        ChainSnapshot, ContractGreeks, ExpirationSlice, OptionContract, OptionType, Quote,
    };
    use crate::portfolio::{BreakerConfig, BreakerEngine};
    use crate::stores::{InMemoryBreakerStore, InMemoryPositionStore, ManualClock};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn contract(
        strike: Decimal,
        option_type: OptionType,
        last: Decimal,
        delta: f64,
    ) -> OptionContract {
        OptionContract {
            underlying: "SPY".to_string(),
            strike,
            expiration: expiry(),
            option_type,
            quote: Quote {
                bid: last - dec!(0.05),
                ask: last + dec!(0.05),
                last,
                volume: 800,
                open_interest: 4_000,
            },
            greeks: ContractGreeks {
                delta,
                gamma: 0.01,
                theta: -0.05,
                vega: 0.12,
                rho: 0.02,
            },
            implied_volatility: 0.22,
        }
    }

    fn test_chain() -> ChainSnapshot {
        let calls = vec![
            contract(dec!(570), OptionType::Call, dec!(8.50), 0.55),
            contract(dec!(580), OptionType::Call, dec!(3.50), 0.35),
            contract(dec!(600), OptionType::Call, dec!(3.30), 0.32),
            contract(dec!(620), OptionType::Call, dec!(0.40), 0.07),
        ];
        let puts = vec![
            contract(dec!(580), OptionType::Put, dec!(8.00), -0.55),
            contract(dec!(550), OptionType::Put, dec!(3.00), -0.30),
            contract(dec!(520), OptionType::Put, dec!(1.00), -0.10),
            contract(dec!(500), OptionType::Put, dec!(0.50), -0.05),
        ];
        ChainSnapshot {
            underlying: "SPY".to_string(),
            underlying_price: dec!(575.23),
            expirations: [(expiry(), ExpirationSlice { calls, puts })]
                .into_iter()
                .collect(),
        }
    }

    fn engine() -> AnalyticsEngine<MockMarketData, InMemoryPositionStore, InMemoryBreakerStore> {
        let market_data = Arc::new(MockMarketData::new());
        market_data.set_chain(test_chain());
        market_data.push_price("SPY", dec!(575.23));

        let clock: Arc<ManualClock> = Arc::new(ManualClock::at_ymd(2025, 6, 2));
        let breakers = BreakerEngine::new(
            Arc::new(InMemoryBreakerStore::default()),
            clock.clone(),
            BreakerConfig::default(),
        );
        AnalyticsEngine::new(
            market_data,
            Arc::new(InMemoryPositionStore::default()),
            breakers,
            clock,
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected_immediately() {
        let result = engine()
            .generate_strategies(GenerateStrategiesRequest {
                symbol: "  ".to_string(),
                account_value: dec!(100_000),
                preference: Default::default(),
                risk: Default::default(),
                vertical_targets: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(OperationError::MissingField { field: "symbol" })
        ));
    }

    #[tokio::test]
    async fn generate_strategies_end_to_end() {
        let response = engine()
            .generate_strategies(GenerateStrategiesRequest {
                symbol: "SPY".to_string(),
                account_value: dec!(1_000_000),
                preference: Default::default(),
                risk: RiskOverrides {
                    min_reward_ratio: Some(1.0),
                    min_prob_profit: Some(0.3),
                    ..Default::default()
                },
                vertical_targets: None,
            })
            .await
            .unwrap();

        assert!(!response.strategies.is_empty());
        assert!(response.exposure.max_pain.is_some());
        // Scores sorted descending.
        for pair in response.strategies.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn unknown_symbol_is_market_data_error() {
        let result = engine()
            .generate_strategies(GenerateStrategiesRequest {
                symbol: "XYZ".to_string(),
                account_value: dec!(100_000),
                preference: Default::default(),
                risk: Default::default(),
                vertical_targets: None,
            })
            .await;
        assert!(matches!(result, Err(OperationError::MarketData(_))));
    }

    #[tokio::test]
    async fn exit_without_short_strikes_is_rejected() {
        let request = EvaluateExitRequest {
            symbol: "SPY".to_string(),
            context: ExitContext {
                current_price: dec!(575),
                short_strikes: vec![],
                unrealized_profit_pct: None,
                expiration: expiry(),
                today: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            },
            history: PriceHistory::new(8),
        };
        let result = engine().evaluate_exit(&request);
        assert!(matches!(
            result,
            Err(OperationError::MissingField {
                field: "short_strikes"
            })
        ));
    }

    #[tokio::test]
    async fn entry_context_built_from_market_data() {
        let market_data = Arc::new(MockMarketData::new());
        market_data.set_chain(test_chain());
        market_data.push_price("SPY", dec!(575.23));
        // 30 flat-ish daily bars around spot for ATR.
        let bars: Vec<crate::models::OhlcBar> = (0..30)
            .map(|i| crate::models::OhlcBar {
                date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
                    + chrono::Duration::days(i),
                open: dec!(574),
                high: dec!(578),
                low: dec!(571),
                close: dec!(575),
                volume: 1_000_000,
            })
            .collect();
        market_data.set_bars("SPY", bars);

        let clock: Arc<ManualClock> = Arc::new(ManualClock::at_ymd(2025, 6, 2));
        let breakers = BreakerEngine::new(
            Arc::new(InMemoryBreakerStore::default()),
            clock.clone(),
            BreakerConfig::default(),
        );
        let engine = AnalyticsEngine::new(
            market_data,
            Arc::new(InMemoryPositionStore::default()),
            breakers,
            clock,
            EngineConfig::default(),
        );

        let context = engine
            .build_entry_context("SPY", &[dec!(600), dec!(540)], expiry())
            .await
            .unwrap();
        assert!(context.setup_valid);
        assert_eq!(context.touch_probabilities.len(), 2);
        for (_, p) in &context.touch_probabilities {
            assert!((0.0..=1.0).contains(p));
        }
        // Nearest strike (600) is ~24.77 away; ATR ~7 -> > 1.5 units.
        assert!(context.distance_atr > 1.5);
        assert!(context.implied_volatility > 0.0);
    }

    #[tokio::test]
    async fn entry_context_requires_strikes() {
        let result = engine().build_entry_context("SPY", &[], expiry()).await;
        assert!(matches!(
            result,
            Err(OperationError::MissingField { field: "strikes" })
        ));
    }

    #[tokio::test]
    async fn entry_evaluation_passes_through() {
        let request = EvaluateEntryRequest {
            symbol: "SPY".to_string(),
            context: EntryContext {
                setup_valid: true,
                validation_reason: None,
                touch_probabilities: vec![(dec!(580), 0.4)],
                distance_atr: 2.0,
                implied_volatility: 0.25,
                risk_class: RiskClassification::High,
            },
        };
        let evaluation = engine().evaluate_entry(&request).unwrap();
        assert_eq!(evaluation.rule, "full_size");
    }

    #[tokio::test]
    async fn position_lifecycle_round_trips() {
        let engine = engine();
        let position = crate::models::TrackedPosition::open(
            "SPY",
            "Bull Vertical Spread",
            dec!(5.00),
            2,
            expiry(),
            dec!(580),
            chrono::Utc::now(),
        );
        let id = position.id.clone();
        engine.record_position(position).await.unwrap();

        let closed = engine.close_position(&id, dec!(6.00)).await.unwrap();
        assert_eq!(closed.realized_pnl(), Some(dec!(200.00)));

        let doc = engine.positions().await.unwrap();
        assert_eq!(doc.positions.len(), 1);
        assert!(doc.open_positions().is_empty());
    }

    #[tokio::test]
    async fn closing_unknown_position_fails() {
        let result = engine().close_position("nope", dec!(1.00)).await;
        assert!(matches!(
            result,
            Err(OperationError::UnknownPosition { .. })
        ));
    }
}
