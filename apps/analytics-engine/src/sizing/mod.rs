//! Position sizing with cost-adjusted expected value and Kelly scaling.

mod costs;
mod kelly;
mod sizer;

pub use costs::{CostBreakdown, CostConfig, transaction_costs};
pub use kelly::{KellyPolicy, QUARTER_KELLY, raw_kelly};
pub use sizer::{PositionSizer, PositionSizing};
