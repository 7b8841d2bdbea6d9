//! P&L projection: deterministic price grids and Monte-Carlo simulation.

mod grid;
mod monte_carlo;

pub use grid::{GridConfig, GridPoint, GridProjection, pnl_at, project_grid};
pub use monte_carlo::{MonteCarloConfig, MonteCarloResult, simulate};
