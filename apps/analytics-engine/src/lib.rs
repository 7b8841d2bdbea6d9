// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Analytics Engine - Rust Core Library
//!
//! Quantitative options-strategy analytics over immutable chain snapshots:
//!
//! - **Exposure**: dealer GEX/VEX, max pain, put/call ratios, OI walls
//! - **Surface**: smile/skew classification, term structure, IV rank
//! - **Flow**: unusual-volume detection and conviction scoring
//! - **Strategies**: combinatorial vertical/condor/calendar construction
//!   with signal-biased candidate ordering, ranking and filtering
//! - **Sizing**: quarter-Kelly position sizing with transaction-cost
//!   adjusted expected value
//! - **Projection**: deterministic price grids and Monte-Carlo VaR/CVaR
//! - **Portfolio**: net Greek aggregation, stress scenarios and persisted
//!   circuit breakers
//! - **Decision**: priority-ordered entry/exit rules over a bounded price
//!   history, with a cancellable monitoring loop
//!
//! External collaborators (market data, durable stores, the clock) enter
//! through constructor-injected ports so tests run against deterministic
//! fakes. Data-driven failures are rejection values; errors are reserved
//! for missing required market inputs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Shared data model: contracts, chains, strategies, risk parameters.
pub mod models;

/// Closed-form option math and probability policies.
pub mod pricing;

/// Dealer-exposure analytics.
pub mod exposure;

/// Volatility-surface analytics.
pub mod surface;

/// Unusual-flow detection.
pub mod flow;

/// Strategy generation and ranking.
pub mod strategies;

/// Position sizing and the transaction-cost model.
pub mod sizing;

/// P&L projection.
pub mod projection;

/// Portfolio risk aggregation, stress and circuit breakers.
pub mod portfolio;

/// Entry/exit decision rules and the monitoring loop.
pub mod decision;

/// Market-data port and mock.
pub mod market_data;

/// Durable stores and the injectable clock.
pub mod stores;

/// Typed operation surface.
pub mod operations;

/// Engine configuration.
pub mod config;

/// Tracing setup.
pub mod telemetry;

// Convenience re-exports for the most common entry points.
pub use config::{EngineConfig, load_config};
pub use models::{ChainSnapshot, OptionContract, RiskConfig, Strategy};
pub use operations::{AnalyticsEngine, OperationError};
