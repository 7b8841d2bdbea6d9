//! End-to-end pipeline test: snapshot -> analytics -> strategies ->
//! sizing -> projection -> portfolio -> decisions.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use analytics_engine::config::EngineConfig;
use analytics_engine::decision::{
    EntryContext, EntryDecision, ExitContext, PriceHistory, RiskClassification, ShortStrike,
};
use analytics_engine::market_data::MockMarketData;
use analytics_engine::models::{
    ChainSnapshot, ContractGreeks, ExpirationSlice, MaxProfit, NetPremium, OptionContract,
    OptionType, Quote, SpreadDirection, StrategyKind,
};
use analytics_engine::operations::{
    AnalyticsEngine, EvaluateEntryRequest, EvaluateExitRequest, GenerateStrategiesRequest,
    PortfolioGreeksRequest, ProjectPnlRequest, RiskOverrides, SizePositionRequest,
    StressTestRequest,
};
use analytics_engine::portfolio::{BreakerConfig, BreakerEngine, BreakerInput};
use analytics_engine::stores::{InMemoryBreakerStore, InMemoryPositionStore, ManualClock};
use analytics_engine::strategies::verticals_from_targets;

fn near_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
}

fn far_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 18).unwrap()
}

fn contract(
    strike: Decimal,
    expiration: NaiveDate,
    option_type: OptionType,
    last: Decimal,
    delta: f64,
) -> OptionContract {
    OptionContract {
        underlying: "SPY".to_string(),
        strike,
        expiration,
        option_type,
        quote: Quote {
            bid: last - dec!(0.03),
            ask: last + dec!(0.03),
            last,
            volume: 900,
            open_interest: 5_000,
        },
        greeks: ContractGreeks {
            delta,
            gamma: 0.015,
            theta: -0.06,
            vega: 0.14,
            rho: 0.03,
        },
        implied_volatility: 0.21,
    }
}

fn spy_chain() -> ChainSnapshot {
    let near = ExpirationSlice {
        calls: vec![
            contract(dec!(570), near_expiry(), OptionType::Call, dec!(8.50), 0.55),
            contract(dec!(580), near_expiry(), OptionType::Call, dec!(3.50), 0.35),
            contract(dec!(600), near_expiry(), OptionType::Call, dec!(3.30), 0.32),
            contract(dec!(620), near_expiry(), OptionType::Call, dec!(0.40), 0.07),
        ],
        puts: vec![
            contract(dec!(580), near_expiry(), OptionType::Put, dec!(8.00), -0.55),
            contract(dec!(560), near_expiry(), OptionType::Put, dec!(3.20), -0.38),
            contract(dec!(540), near_expiry(), OptionType::Put, dec!(3.00), -0.30),
            contract(dec!(520), near_expiry(), OptionType::Put, dec!(0.80), -0.09),
        ],
    };
    let far = ExpirationSlice {
        calls: vec![contract(
            dec!(575),
            far_expiry(),
            OptionType::Call,
            dec!(11.00),
            0.52,
        )],
        puts: vec![contract(
            dec!(575),
            far_expiry(),
            OptionType::Put,
            dec!(10.20),
            -0.48,
        )],
    };
    let mut near_with_calendar = near;
    near_with_calendar.calls.push(contract(
        dec!(575),
        near_expiry(),
        OptionType::Call,
        dec!(6.00),
        0.50,
    ));
    ChainSnapshot {
        underlying: "SPY".to_string(),
        underlying_price: dec!(575.23),
        expirations: [(near_expiry(), near_with_calendar), (far_expiry(), far)]
            .into_iter()
            .collect(),
    }
}

fn engine() -> AnalyticsEngine<MockMarketData, InMemoryPositionStore, InMemoryBreakerStore> {
    let market_data = Arc::new(MockMarketData::new());
    market_data.set_chain(spy_chain());
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

#[test]
fn bull_call_spread_reference_economics() {
    // Long 570 call @ 8.50, short 580 call @ 3.50 on a 575.23 underlying.
    let spreads = verticals_from_targets(
        &spy_chain(),
        near_expiry(),
        SpreadDirection::Bullish,
        &[(dec!(570), dec!(580))],
    );
    assert_eq!(spreads.len(), 1);
    let s = &spreads[0];
    assert_eq!(s.net_premium, NetPremium::Debit(dec!(5.00)));
    assert_eq!(s.max_profit, MaxProfit::Limited(dec!(5.00)));
    assert_eq!(s.max_risk, dec!(5.00));
    assert_eq!(s.risk_reward(), Some(dec!(1.00)));
    assert_eq!(s.breakevens, vec![dec!(575.00)]);
}

#[test]
fn breakeven_examples_from_premium() {
    // Call strike 70, net premium 2.27 -> breakeven 72.27.
    let expiry = near_expiry();
    let call_chain = ChainSnapshot {
        underlying: "XYZ".to_string(),
        underlying_price: dec!(70),
        expirations: [(
            expiry,
            ExpirationSlice {
                calls: vec![
                    contract(dec!(70), expiry, OptionType::Call, dec!(2.77), 0.50),
                    contract(dec!(80), expiry, OptionType::Call, dec!(0.50), 0.10),
                ],
                puts: vec![
                    contract(dec!(70), expiry, OptionType::Put, dec!(2.77), -0.50),
                    contract(dec!(60), expiry, OptionType::Put, dec!(0.50), -0.10),
                ],
            },
        )]
        .into_iter()
        .collect(),
    };

    let calls = verticals_from_targets(
        &call_chain,
        expiry,
        SpreadDirection::Bullish,
        &[(dec!(70), dec!(80))],
    );
    assert_eq!(calls[0].breakevens, vec![dec!(72.27)]);

    let puts = verticals_from_targets(
        &call_chain,
        expiry,
        SpreadDirection::Bearish,
        &[(dec!(70), dec!(60))],
    );
    assert_eq!(puts[0].breakevens, vec![dec!(67.73)]);
}

#[tokio::test]
async fn full_pipeline_generates_sizes_and_projects() {
    let engine = engine();

    // 1. Generate and rank.
    let generated = engine
        .generate_strategies(GenerateStrategiesRequest {
            symbol: "SPY".to_string(),
            account_value: dec!(250_000),
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
    assert!(!generated.strategies.is_empty());
    assert!(generated.exposure.max_pain.is_some());
    // All surviving strategies honor the probability floor and [0,1].
    for ranked in &generated.strategies {
        let p = ranked.strategy.probability_profit;
        assert!((0.3..=1.0).contains(&p));
        assert!(ranked.strategy.premium_reconciles());
    }
    // Both spread kinds and at least one calendar candidate exist.
    let kinds: Vec<StrategyKind> = generated
        .strategies
        .iter()
        .map(|r| r.strategy.kind)
        .collect();
    assert!(
        kinds
            .iter()
            .any(|k| matches!(k, StrategyKind::VerticalSpread(_)))
    );

    // 2. Size the best strategy.
    let best = generated.strategies[0].strategy.clone();
    let sized = engine
        .size_position(SizePositionRequest {
            symbol: "SPY".to_string(),
            strategy: best.clone(),
            account_value: dec!(250_000),
            risk: RiskOverrides {
                min_reward_ratio: Some(1.0),
                min_prob_profit: Some(0.3),
                ..Default::default()
            },
        })
        .await
        .unwrap();
    assert!(sized.sizing.rejection.is_none());
    assert!(sized.sizing.recommended_contracts >= 1);
    assert!((0.0..=1.0).contains(&sized.sizing.kelly_fraction));

    // 3. Project P&L.
    let projected = engine
        .project_pnl(ProjectPnlRequest {
            symbol: "SPY".to_string(),
            strategy: best,
            contracts: sized.sizing.recommended_contracts,
        })
        .await
        .unwrap();
    assert_eq!(projected.grid.points.len(), 21);
    assert!(projected.grid.max_gain >= projected.grid.max_loss);
    assert!(projected.monte_carlo.var99 <= projected.monte_carlo.var95);
}

#[tokio::test]
async fn portfolio_greeks_and_stress_operations() {
    let engine = engine();
    let greeks_response = engine.portfolio_greeks(&PortfolioGreeksRequest {
        positions: vec![analytics_engine::portfolio::OpenPosition {
            symbol: "SPY".to_string(),
            legs: vec![analytics_engine::portfolio::PositionLeg {
                action: analytics_engine::models::LegAction::Buy,
                contracts: 2,
                greeks: ContractGreeks {
                    delta: 0.5,
                    gamma: 0.02,
                    theta: -0.05,
                    vega: 0.15,
                    rho: 0.02,
                },
            }],
        }],
    });
    // 0.5 * 2 * 100
    assert!((greeks_response.greeks.delta - 100.0).abs() < 1e-9);

    let stress = engine
        .run_stress_test(StressTestRequest {
            symbol: "SPY".to_string(),
            positions: vec![],
        })
        .await
        .unwrap();
    assert_eq!(stress.report.results.len(), 6);
}

#[tokio::test]
async fn entry_and_exit_rules_through_the_surface() {
    let engine = engine();

    let entry = engine
        .evaluate_entry(&EvaluateEntryRequest {
            symbol: "SPY".to_string(),
            context: EntryContext {
                setup_valid: true,
                validation_reason: None,
                touch_probabilities: vec![(dec!(580), 0.80)],
                distance_atr: 2.0,
                implied_volatility: 0.25,
                risk_class: RiskClassification::High,
            },
        })
        .unwrap();
    assert!(matches!(entry.decision, EntryDecision::Reject { .. }));
    assert_eq!(entry.rule, "touch_probability");

    let mut history = PriceHistory::new(32);
    history.push(dec!(574), chrono::Utc::now());
    let exit = engine
        .evaluate_exit(&EvaluateExitRequest {
            symbol: "SPY".to_string(),
            context: ExitContext {
                current_price: dec!(574),
                short_strikes: vec![ShortStrike {
                    strike: dec!(580),
                    option_type: OptionType::Call,
                }],
                unrealized_profit_pct: Some(0.1),
                expiration: near_expiry(),
                today: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            },
            history,
        })
        .unwrap();
    // 574 is within 2% of 580: immediate exit.
    assert_eq!(
        exit.action,
        analytics_engine::decision::ExitAction::ExitImmediately
    );
}

#[tokio::test]
async fn circuit_breakers_persist_through_the_engine() {
    let engine = engine();
    let input = BreakerInput {
        daily_pnl: dec!(-9_000),
        account_value: dec!(100_000),
        portfolio_risk: dec!(5_000),
        vol_index: 20.0,
        position_losses: vec![],
    };
    let status = engine.evaluate_circuit_breakers(&input).await.unwrap();
    assert!(status.halt_all);

    // Recovered P&L later the same day: still halted.
    let recovered = BreakerInput {
        daily_pnl: dec!(500),
        ..input
    };
    let status = engine.evaluate_circuit_breakers(&recovered).await.unwrap();
    assert!(status.halt_all);
}

#[test]
fn gex_sign_convention_reference_fixture() {
    // Single call, gamma 0.05, OI 10,000, spot 575 -> negative GEX.
    let expiry = near_expiry();
    let mut call = contract(dec!(575), expiry, OptionType::Call, dec!(5.00), 0.50);
    call.greeks.gamma = 0.05;
    call.quote.open_interest = 10_000;
    let chain = ChainSnapshot {
        underlying: "SPY".to_string(),
        underlying_price: dec!(575),
        expirations: [(
            expiry,
            ExpirationSlice {
                calls: vec![call.clone()],
                puts: vec![],
            },
        )]
        .into_iter()
        .collect(),
    };
    let exposure = analytics_engine::exposure::dealer_exposure(&chain);
    assert!(exposure.total_gex < 0.0);
    assert_eq!(exposure.regime.to_string(), "Negative Gamma");

    let mut put = call;
    put.option_type = OptionType::Put;
    let chain = ChainSnapshot {
        underlying: "SPY".to_string(),
        underlying_price: dec!(575),
        expirations: [(
            expiry,
            ExpirationSlice {
                calls: vec![],
                puts: vec![put],
            },
        )]
        .into_iter()
        .collect(),
    };
    let exposure = analytics_engine::exposure::dealer_exposure(&chain);
    assert!(exposure.total_gex > 0.0);
    assert_eq!(exposure.regime.to_string(), "Positive Gamma");
}

#[test]
fn zero_volatility_monte_carlo_matches_theta_decay() {
    use analytics_engine::portfolio::PortfolioGreeks;
    use analytics_engine::projection::{MonteCarloConfig, simulate};

    let greeks = PortfolioGreeks {
        delta: 80.0,
        gamma: 3.0,
        theta: -12.0,
        vega: 200.0,
        rho: 0.0,
    };
    let config = MonteCarloConfig {
        simulations: 500,
        horizon_days: 7,
        daily_drift: 0.0,
        daily_volatility: 0.0,
        daily_iv_volatility: 0.0,
        seed: Some(7),
    };
    let result = simulate(&greeks, 575.23, &config);
    // No randomness: every path is pure theta decay of -12 * 7.
    assert!((result.var95 + 84.0).abs() < 1e-9);
    assert!((result.mean + 84.0).abs() < 1e-9);
}
