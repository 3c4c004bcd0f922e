//! Indicator trait and the per-window indicator series.
//!
//! Indicators are pure functions: bar history in, aligned value series out.
//! They are computed once per configuration, before the simulation loop.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce one value per bar. Bars
/// without enough history yield `None`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Indicator values for one window, aligned by index with the price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    name: String,
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Run `indicator` over `bars`.
    pub fn compute(indicator: &dyn Indicator, bars: &[Bar]) -> Self {
        Self {
            name: indicator.name().to_string(),
            values: indicator.compute(bars),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value at a bar index; `None` when undefined or out of range.
    pub fn get(&self, bar_index: usize) -> Option<f64> {
        self.values.get(bar_index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of bars with a defined value.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
