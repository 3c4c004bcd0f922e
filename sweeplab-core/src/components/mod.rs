//! Pipeline component traits.
//!
//! A configuration is two stages ahead of the simulation loop:
//! - Indicator: bar history → one oscillator value per bar
//! - Signal rule: one day's value → ENTER / EXIT / HOLD

pub mod indicator;
pub mod signal;

pub use indicator::{Indicator, IndicatorSeries};
pub use signal::{Signal, SignalRule, SignalRuleError, DEFAULT_ENTER_BELOW, DEFAULT_EXIT_ABOVE};
