//! Sweep configuration: TOML/serde surface, validation and the immutable plan.
//!
//! `SweepConfig` is what users write. `SweepConfig::plan()` validates every
//! parameter once and produces a `SweepPlan`, the only thing the sweep reads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweeplab_core::components::signal::{
    SignalRule, SignalRuleError, DEFAULT_ENTER_BELOW, DEFAULT_EXIT_ABOVE,
};
use sweeplab_core::engine::{
    CostModel, SimulationConfig, SimulationError, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CASH,
    DEFAULT_LEVY_RATE,
};
use sweeplab_core::indicators::{MAX_WINDOW, MIN_WINDOW};

pub const DEFAULT_WINDOW_START: usize = 2;
pub const DEFAULT_WINDOW_END: usize = 30;
pub const DEFAULT_WINDOW_STEP: usize = 1;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
pub const DEFAULT_TOP_N: usize = 10;

/// Configuration rejected before any work is dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "window range {start}..={end} invalid: need {min} <= window_start < window_end <= {max}",
        min = MIN_WINDOW,
        max = MAX_WINDOW
    )]
    WindowRange { start: usize, end: usize },
    #[error("window_step must be at least 1")]
    ZeroStep,
    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] SignalRuleError),
    #[error("invalid simulation settings: {0}")]
    Simulation(#[from] SimulationError),
    #[error("risk_free_rate must be within [0, 1], got {0}")]
    RiskFreeRate(f64),
    #[error("top_n must be at least 1")]
    ZeroTopN,
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

impl ConfigError {
    /// Name of the offending parameter, when the error is about one.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            ConfigError::WindowRange { .. } => Some("window_start/window_end"),
            ConfigError::ZeroStep => Some("window_step"),
            ConfigError::Thresholds(SignalRuleError::OutOfRange { name, .. }) => Some(*name),
            ConfigError::Thresholds(SignalRuleError::Crossed { .. }) => {
                Some("enter_below/exit_above")
            }
            ConfigError::Simulation(SimulationError::NonPositiveCash(_)) => Some("initial_cash"),
            ConfigError::Simulation(SimulationError::CostRateOutOfRange { name, .. }) => {
                Some(*name)
            }
            ConfigError::RiskFreeRate(_) => Some("risk_free_rate"),
            ConfigError::ZeroTopN => Some("top_n"),
            _ => None,
        }
    }
}

/// User-facing sweep configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
///
/// ```toml
/// window_start = 5
/// window_end = 40
/// window_step = 5
/// commission_rate = 0.0005
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub window_start: usize,
    pub window_end: usize,
    pub window_step: usize,
    pub enter_below: f64,
    pub exit_above: f64,
    pub commission_rate: f64,
    pub levy_rate: f64,
    pub risk_free_rate: f64,
    pub initial_cash: f64,
    /// Worker threads; 0 uses one per logical core.
    pub workers: usize,
    pub top_n: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            window_step: DEFAULT_WINDOW_STEP,
            enter_below: DEFAULT_ENTER_BELOW,
            exit_above: DEFAULT_EXIT_ABOVE,
            commission_rate: DEFAULT_COMMISSION_RATE,
            levy_rate: DEFAULT_LEVY_RATE,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            initial_cash: DEFAULT_INITIAL_CASH,
            workers: 0,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SweepConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate every parameter and freeze the result.
    pub fn plan(&self) -> Result<SweepPlan, ConfigError> {
        if self.window_start < MIN_WINDOW
            || self.window_end > MAX_WINDOW
            || self.window_start >= self.window_end
        {
            return Err(ConfigError::WindowRange {
                start: self.window_start,
                end: self.window_end,
            });
        }
        if self.window_step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        let rule = SignalRule::new(self.enter_below, self.exit_above)?;
        let costs = CostModel::new(self.commission_rate, self.levy_rate)?;
        let simulation = SimulationConfig::new(self.initial_cash, costs)?;
        if !self.risk_free_rate.is_finite() || !(0.0..=1.0).contains(&self.risk_free_rate) {
            return Err(ConfigError::RiskFreeRate(self.risk_free_rate));
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }

        let windows: Vec<usize> = (self.window_start..=self.window_end)
            .step_by(self.window_step)
            .collect();
        let parameters = SweepParameters {
            window_start: self.window_start,
            window_end: self.window_end,
            window_step: self.window_step,
            enter_below: self.enter_below,
            exit_above: self.exit_above,
            commission_rate: self.commission_rate,
            levy_rate: self.levy_rate,
            risk_free_rate: self.risk_free_rate,
            initial_cash: self.initial_cash,
            top_n: self.top_n,
        };
        let fingerprint = parameters.fingerprint()?;

        Ok(SweepPlan {
            windows,
            rule,
            simulation,
            risk_free_rate: self.risk_free_rate,
            workers: self.workers,
            top_n: self.top_n,
            parameters,
            fingerprint,
        })
    }
}

/// The result-affecting subset of a configuration.
///
/// Excludes the worker count: reports must not depend on pool size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParameters {
    pub window_start: usize,
    pub window_end: usize,
    pub window_step: usize,
    pub enter_below: f64,
    pub exit_above: f64,
    pub commission_rate: f64,
    pub levy_rate: f64,
    pub risk_free_rate: f64,
    pub initial_cash: f64,
    pub top_n: usize,
}

impl SweepParameters {
    /// BLAKE3 over the canonical JSON encoding.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// A validated sweep, built once and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    windows: Vec<usize>,
    rule: SignalRule,
    simulation: SimulationConfig,
    risk_free_rate: f64,
    workers: usize,
    top_n: usize,
    parameters: SweepParameters,
    fingerprint: String,
}

impl SweepPlan {
    /// Window lengths in ascending order.
    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn rule(&self) -> &SignalRule {
        &self.rule
    }

    pub fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn parameters(&self) -> &SweepParameters {
        &self.parameters
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
