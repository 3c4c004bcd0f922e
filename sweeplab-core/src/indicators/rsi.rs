//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Seed: simple mean of the first `window` changes. Lookback: window.
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → undefined.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::IndicatorError;

pub const MIN_WINDOW: usize = 1;
pub const MAX_WINDOW: usize = 500;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        if !(MIN_WINDOW..=MAX_WINDOW).contains(&window) {
            return Err(IndicatorError::WindowOutOfRange {
                window,
                min: MIN_WINDOW,
                max: MAX_WINDOW,
            });
        }
        Ok(Self {
            window,
            name: format!("rsi_{window}"),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let w = self.window;
        let mut result = vec![None; n];

        if n <= w {
            return result;
        }

        let change = |i: usize| bars[i].close - bars[i - 1].close;

        // Seed over changes 1..=w
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for i in 1..=w {
            let ch = change(i);
            avg_gain += ch.max(0.0);
            avg_loss += (-ch).max(0.0);
        }
        avg_gain /= w as f64;
        avg_loss /= w as f64;
        result[w] = compute_rsi(avg_gain, avg_loss);

        let period = w as f64;
        for (i, slot) in result.iter_mut().enumerate().skip(w + 1) {
            let ch = change(i);
            avg_gain += (ch.max(0.0) - avg_gain) / period;
            avg_loss += ((-ch).max(0.0) - avg_loss) / period;
            *slot = compute_rsi(avg_gain, avg_loss);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        None // no movement
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else if avg_gain == 0.0 {
        Some(0.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}
