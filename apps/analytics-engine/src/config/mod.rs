//! Engine configuration: YAML loading, defaults and validation.
//!
//! Every section is optional in the file; missing sections take their
//! defaults so a minimal config is a valid config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decision::{EntryConfig, ExitConfig, MonitorConfig};
use crate::exposure::ExposureConfig;
use crate::flow::FlowConfig;
use crate::models::{ClampWarning, RiskConfig};
use crate::portfolio::BreakerConfig;
use crate::pricing::TouchProbability;
use crate::projection::{GridConfig, MonteCarloConfig};
use crate::sizing::{CostConfig, KellyPolicy};
use crate::strategies::GeneratorConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Validation failed.
    #[error("config validation failed: {0}")]
    ValidationError(String),
}

/// Raw account risk settings as supplied by the operator.
///
/// Clamped into [`RiskConfig`] bounds at use time, never rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskSettings {
    /// Maximum fraction of account value risked per position.
    pub max_risk_pct: f64,
    /// Minimum acceptable reward/risk ratio.
    pub min_reward_ratio: f64,
    /// Minimum acceptable probability of profit.
    pub min_prob_profit: f64,
    /// Maximum fraction of account value in one position.
    pub max_concentration: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        let defaults = RiskConfig::default();
        Self {
            max_risk_pct: defaults.max_risk_pct,
            min_reward_ratio: defaults.min_reward_ratio,
            min_prob_profit: defaults.min_prob_profit,
            max_concentration: defaults.max_concentration,
        }
    }
}

impl RiskSettings {
    /// Clamp into a validated [`RiskConfig`], reporting any adjustments.
    #[must_use]
    pub fn validated(&self) -> (RiskConfig, Vec<ClampWarning>) {
        RiskConfig::clamped(
            self.max_risk_pct,
            self.min_reward_ratio,
            self.min_prob_profit,
            self.max_concentration,
        )
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Account risk settings.
    pub risk: RiskSettings,
    /// Exposure analyzer settings.
    pub exposure: ExposureConfig,
    /// Flow detector thresholds.
    pub flow: FlowConfig,
    /// Strategy generator bounds.
    pub generator: GeneratorConfig,
    /// Transaction-cost model.
    pub costs: CostConfig,
    /// Kelly scaling policy.
    pub kelly: KellyPolicy,
    /// Deterministic grid projection settings.
    pub grid: GridConfig,
    /// Monte-Carlo settings.
    pub monte_carlo: MonteCarloConfig,
    /// Circuit-breaker thresholds.
    pub breakers: BreakerConfig,
    /// Entry rule thresholds.
    pub entry: EntryConfig,
    /// Exit rule thresholds.
    pub exit: ExitConfig,
    /// Monitoring loop settings.
    pub monitor: MonitorConfig,
    /// Probability-of-touch policy.
    pub touch: TouchProbability,
}

impl EngineConfig {
    /// Validate cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] naming the offending
    /// field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.steps < 2 {
            return Err(ConfigError::ValidationError(
                "grid.steps must be at least 2".to_string(),
            ));
        }
        if self.monte_carlo.simulations == 0 {
            return Err(ConfigError::ValidationError(
                "monte_carlo.simulations must be positive".to_string(),
            ));
        }
        if self.monte_carlo.horizon_days == 0 {
            return Err(ConfigError::ValidationError(
                "monte_carlo.horizon_days must be positive".to_string(),
            ));
        }
        if self.generator.vertical.min_width_pct >= self.generator.vertical.max_width_pct {
            return Err(ConfigError::ValidationError(
                "generator.vertical width bounds are inverted".to_string(),
            ));
        }
        if self.flow.volume_multiplier <= 0.0 {
            return Err(ConfigError::ValidationError(
                "flow.volume_multiplier must be positive".to_string(),
            ));
        }
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "monitor.interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a YAML file, falling back to defaults when no
/// path is given.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or validation fails.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
                path: path.to_string(),
                source,
            })?;
            serde_yaml_bw::from_str(&raw)?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_pass_validation() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.grid.steps, 21);
        assert!((config.kelly.multiplier - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "grid:\n  steps: 41\n  range_pct: 0.15\nrisk:\n  max_risk_pct: 0.05\n  min_reward_ratio: 2.0\n  min_prob_profit: 0.6\n  max_concentration: 0.3\n"
        )
        .unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.grid.steps, 41);
        assert!((config.risk.max_risk_pct - 0.05).abs() < f64::EPSILON);
        // Untouched section keeps its default.
        assert_eq!(config.monte_carlo.simulations, 10_000);
    }

    #[test]
    fn invalid_grid_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grid:\n  steps: 1\n  range_pct: 0.1\n").unwrap();
        let result = load_config(file.path().to_str());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let result = load_config(Some("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grid: [not a map").unwrap();
        let result = load_config(file.path().to_str());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn out_of_range_risk_settings_clamp_with_warnings() {
        let settings = RiskSettings {
            max_risk_pct: 0.5,
            min_reward_ratio: 2.0,
            min_prob_profit: 0.6,
            max_concentration: 0.3,
        };
        let (config, warnings) = settings.validated();
        assert!((config.max_risk_pct - 0.10).abs() < f64::EPSILON);
        assert_eq!(warnings.len(), 1);
    }
}
