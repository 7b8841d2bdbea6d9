//! Rule-based entry/exit decisions driven by a live price history.

mod entry;
mod exit;
mod history;
mod monitor;

pub use entry::{
    EntryConfig, EntryContext, EntryDecision, EntryEvaluation, EntryRule, RiskClassification,
    default_entry_rules, evaluate_entry,
};
pub use exit::{
    ExitAction, ExitConfig, ExitContext, ExitDecision, ExitRule, ShortStrike, default_exit_rules,
    evaluate_exit,
};
pub use history::{PriceHistory, PricePoint, Trend};
pub use monitor::{DecisionMonitor, MonitorConfig};
