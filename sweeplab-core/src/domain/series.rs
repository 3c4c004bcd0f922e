//! PriceSeries: the validated, immutable bar container.

use serde::{Deserialize, Serialize};

use super::bar::Bar;
use crate::data::validate::{validate_bars, ValidationError, ValidationWarning};

/// A validated daily series for one symbol.
///
/// The only way to build one is through [`PriceSeries::new`], which runs the
/// full validator. Deserialization goes through the same path, and the stored
/// warnings are recomputed rather than trusted. Everything downstream
/// (indicators, simulation) can therefore assume a non-empty series with
/// ordered dates, positive finite prices and consistent OHLC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
    warnings: Vec<ValidationWarning>,
}

/// Wire shape of a series before validation.
#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl TryFrom<RawSeries> for PriceSeries {
    type Error = ValidationError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.bars)
    }
}

impl PriceSeries {
    /// Validate `bars` and take ownership of them.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, ValidationError> {
        let warnings = validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
            warnings,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Calendar-gap warnings found during validation.
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }
}
