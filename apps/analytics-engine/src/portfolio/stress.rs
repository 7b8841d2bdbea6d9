//! Named stress scenarios run against the aggregated book.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::greeks::PortfolioGreeks;
use super::scenario::{Scenario, ScenarioResult, scenario_pnl};

/// A named stress scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Scenario label (e.g. "crash").
    pub name: String,
    /// Scenario inputs.
    pub scenario: Scenario,
}

/// Stress-test results, worst case first in `worst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    /// Result per scenario, in suite order.
    pub results: Vec<(String, ScenarioResult)>,
    /// Name and total of the worst-performing scenario.
    pub worst: Option<(String, f64)>,
}

/// The default stress suite.
#[must_use]
pub fn default_stress_suite() -> Vec<StressScenario> {
    let scenario = |price, iv, days| Scenario {
        price_move_pct: price,
        iv_change_pts: iv,
        days_forward: days,
    };
    vec![
        StressScenario {
            name: "crash".to_string(),
            scenario: scenario(-0.10, 10.0, 0.0),
        },
        StressScenario {
            name: "correction".to_string(),
            scenario: scenario(-0.05, 5.0, 0.0),
        },
        StressScenario {
            name: "rally".to_string(),
            scenario: scenario(0.05, -2.0, 0.0),
        },
        StressScenario {
            name: "melt_up".to_string(),
            scenario: scenario(0.10, -5.0, 0.0),
        },
        StressScenario {
            name: "vol_spike".to_string(),
            scenario: scenario(0.0, 8.0, 0.0),
        },
        StressScenario {
            name: "week_of_decay".to_string(),
            scenario: scenario(0.0, 0.0, 5.0),
        },
    ]
}

/// Run a stress suite against net portfolio Greeks.
#[must_use]
pub fn run_stress(
    greeks: &PortfolioGreeks,
    underlying_price: f64,
    suite: &[StressScenario],
) -> StressReport {
    let results: Vec<(String, ScenarioResult)> = suite
        .iter()
        .map(|s| (s.name.clone(), scenario_pnl(greeks, underlying_price, &s.scenario)))
        .collect();

    let worst = results
        .iter()
        .min_by(|a, b| {
            a.1.total
                .partial_cmp(&b.1.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(name, result)| (name.clone(), result.total));

    if let Some((name, total)) = &worst {
        debug!(scenario = %name, total, "worst stress scenario");
    }

    StressReport { results, worst }
}
