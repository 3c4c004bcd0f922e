//! Per-window pipeline: wires together indicator, signal rule, simulation and metrics.
//!
//! `run_window()` is a pure function of the shared series, one window length and
//! the validated plan. It performs no I/O and owns every intermediate it builds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweeplab_core::components::indicator::IndicatorSeries;
use sweeplab_core::domain::{PriceSeries, Trade};
use sweeplab_core::engine::{run_simulation, SimulationError};
use sweeplab_core::indicators::{IndicatorError, Rsi};

use crate::config::SweepPlan;
use crate::metrics::PerformanceMetrics;

/// Errors from a single window's pipeline.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Outcome of one successfully evaluated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationResult {
    pub window: usize,
    pub metrics: PerformanceMetrics,
    /// Daily equity, one point per bar.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
}

impl ConfigurationResult {
    pub fn ratio(&self) -> Option<f64> {
        self.metrics.ratio
    }

    pub fn total_return(&self) -> f64 {
        self.metrics.total_return
    }

    pub fn trade_count(&self) -> usize {
        self.metrics.trade_count
    }
}

/// Run indicator → signals → simulation → metrics for one window length.
pub fn run_window(
    series: &PriceSeries,
    window: usize,
    plan: &SweepPlan,
) -> Result<ConfigurationResult, WindowError> {
    let rsi = Rsi::new(window)?;
    let indicator = IndicatorSeries::compute(&rsi, series.bars());
    let signals = plan.rule().signals(&indicator);
    let simulation = run_simulation(series, &signals, plan.simulation())?;

    let equity_curve = simulation.equity_values();
    let metrics =
        PerformanceMetrics::compute(&equity_curve, &simulation.trades, plan.risk_free_rate());

    Ok(ConfigurationResult {
        window,
        metrics,
        equity_curve,
        trades: simulation.trades,
    })
}
