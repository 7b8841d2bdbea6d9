//! Portfolio-level risk: net Greeks, scenario stress and circuit breakers.

mod breakers;
mod greeks;
mod scenario;
mod stress;

pub use breakers::{
    BreakerAction, BreakerConfig, BreakerDocument, BreakerEngine, BreakerInput, BreakerRule,
    BreakerStatus, PositionLoss, TrippedBreaker, default_breaker_rules,
};
pub use greeks::{
    DirectionalBias, GreekBias, OpenPosition, PortfolioGreeks, PositionLeg, ThetaBias,
    VolatilityBias, aggregate_portfolio,
};
pub use scenario::{Scenario, ScenarioResult, scenario_pnl};
pub use stress::{StressReport, StressScenario, default_stress_suite, run_stress};
