//! SweepLab Core: domain types, validation, indicator, signal rule and simulation.
//!
//! This crate contains the per-configuration pipeline:
//! - Domain types (bars, validated price series, trades)
//! - Series validator with calendar-gap warnings
//! - Wilder RSI indicator behind the `Indicator` trait
//! - Threshold signal rule that sees one day's value at a time
//! - FLAT/HOLDING simulation with commission and sell-side levy
//! - Seeded synthetic series for demos and benchmarks

pub mod components;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod synthetic;

pub use components::{Indicator, IndicatorSeries, Signal, SignalRule, SignalRuleError};
pub use data::{validate_bars, ValidationError, ValidationWarning};
pub use domain::{Bar, ExitReason, PriceSeries, Trade};
pub use engine::{
    run_simulation, CostModel, DailyMark, SimulationConfig, SimulationError, SimulationResult,
};
pub use indicators::{IndicatorError, Rsi};
