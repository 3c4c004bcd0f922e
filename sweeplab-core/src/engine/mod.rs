//! Simulation engine: single-position FLAT/HOLDING state machine.
//!
//! The engine consumes a validated price series and a precomputed signal
//! stream of the same length, and produces a trade ledger plus one daily
//! mark per bar. All inputs are validated before the loop starts, so the
//! loop itself cannot fail.

pub mod cost_model;
pub mod loop_runner;
pub mod state;

use thiserror::Error;

pub use cost_model::{CostModel, DEFAULT_COMMISSION_RATE, DEFAULT_LEVY_RATE, MAX_COST_RATE};
pub use loop_runner::run_simulation;
pub use state::{
    DailyMark, PositionFlag, PositionState, SimulationConfig, SimulationResult,
    DEFAULT_INITIAL_CASH,
};

/// Errors raised before a simulation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("initial cash must be positive and finite, got {0}")]
    NonPositiveCash(f64),
    #[error("{name} must be within [0, {max}], got {rate}", max = MAX_COST_RATE)]
    CostRateOutOfRange { name: &'static str, rate: f64 },
    #[error("signal stream has {signals} entries but series has {bars} bars")]
    LengthMismatch { bars: usize, signals: usize },
}
