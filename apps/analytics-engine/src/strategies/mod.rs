//! Combinatorial strategy construction and ranking.
//!
//! The generator consumes a raw chain snapshot plus signal sets from the
//! exposure and flow analyzers (institutional and unusual strikes) that bias
//! candidate ordering.

mod calendar;
mod condor;
mod ranking;
mod vertical;

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exposure::ExposureReport;
use crate::flow::FlowReport;
use crate::models::{ChainSnapshot, SpreadDirection, Strategy};

pub use calendar::{CalendarProfitPolicy, generate_calendars};
pub use condor::{CondorConfig, generate_condors};
pub use ranking::{
    RankedStrategy, RankingPreference, ScoreBreakdown, StrategyFilter, rank_strategies,
};
pub use vertical::{VerticalScanConfig, generate_verticals, verticals_from_targets};

/// Strikes the generator should favor, sourced from exposure walls
/// (institutional positioning) and unusual flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeBias {
    /// Strikes at open-interest walls.
    pub institutional: BTreeSet<Decimal>,
    /// Strikes carrying unusual flow.
    pub unusual: BTreeSet<Decimal>,
}

impl StrikeBias {
    /// Build the bias set from analyzer outputs.
    #[must_use]
    pub fn from_signals(exposure: &ExposureReport, flow: &FlowReport) -> Self {
        let institutional = exposure
            .walls
            .top_calls
            .iter()
            .chain(exposure.walls.top_puts.iter())
            .map(|w| w.strike)
            .collect();
        let unusual = flow.unusual_strikes.iter().copied().collect();
        Self {
            institutional,
            unusual,
        }
    }

    /// Number of a strategy's legs that sit on a biased strike.
    #[must_use]
    pub fn hits(&self, strategy: &Strategy) -> usize {
        strategy
            .legs
            .iter()
            .filter(|leg| {
                self.institutional.contains(&leg.strike) || self.unusual.contains(&leg.strike)
            })
            .count()
    }

    /// Sort strategies so biased candidates come first, preserving the
    /// generator's secondary ordering.
    pub fn prioritize(&self, strategies: &mut [Strategy]) {
        if self.institutional.is_empty() && self.unusual.is_empty() {
            return;
        }
        strategies.sort_by_key(|s| std::cmp::Reverse(self.hits(s)));
    }
}

/// Generator configuration covering all strategy kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Vertical auto-scan bounds.
    pub vertical: VerticalScanConfig,
    /// Iron-condor construction bounds.
    pub condor: CondorConfig,
    /// Calendar max-profit policy.
    pub calendar: CalendarProfitPolicy,
}

/// Generate candidates of every kind from one snapshot, biased by the
/// supplied strike sets.
///
/// Verticals are generated per expiration; a slice that yields nothing is
/// simply skipped.
#[must_use]
pub fn generate_all(
    chain: &ChainSnapshot,
    config: &GeneratorConfig,
    bias: &StrikeBias,
) -> Vec<Strategy> {
    let mut out = Vec::new();

    for &expiration in chain.expirations.keys() {
        for direction in [SpreadDirection::Bullish, SpreadDirection::Bearish] {
            out.extend(generate_verticals(
                chain,
                expiration,
                direction,
                &config.vertical,
            ));
        }
        out.extend(generate_condors(chain, expiration, &config.condor));
    }
    out.extend(generate_calendars(chain, &config.calendar));

    bias.prioritize(&mut out);
    debug!(
        symbol = %chain.underlying,
        candidates = out.len(),
        "strategy generation complete"
    );
    out
}
