//! Unusual options-flow detection and conviction scoring.

mod detector;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::models::OptionType;

pub use detector::{FlowReport, detect, detect_with_averages};

/// Flow detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Minimum session volume before a contract is considered at all.
    pub min_volume: i64,
    /// Volume must exceed average volume by this multiple.
    pub volume_multiplier: f64,
    /// Premium spent (volume x price x 100) that flags on its own.
    pub min_premium: f64,
    /// Volume / open-interest ratio that flags on its own.
    pub oi_ratio_threshold: f64,
    /// Volume floor for sweep detection.
    pub sweep_volume: i64,
    /// Volume / open-interest floor for sweep detection.
    pub sweep_oi_ratio: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_volume: 500,
            volume_multiplier: 3.0,
            min_premium: 50_000.0,
            oi_ratio_threshold: 2.0,
            sweep_volume: 1_000,
            sweep_oi_ratio: 5.0,
        }
    }
}

/// Direction implied by unusual flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Call-side flow.
    Bullish,
    /// Put-side flow.
    Bearish,
}

/// One contract flagged as unusual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualActivity {
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub option_type: OptionType,
    /// Session volume.
    pub volume: i64,
    /// Open interest.
    pub open_interest: i64,
    /// Volume over average volume.
    pub volume_ratio: f64,
    /// Premium spent in dollars.
    pub premium_spent: f64,
    /// Whether the contract traded sweep-style.
    pub is_sweep: bool,
    /// Conviction score, 0-100.
    pub conviction: u8,
    /// Implied direction.
    pub direction: FlowDirection,
}
